//! Notification interface towards the display/menu layer.

/// Caption of the single button on a message screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Aborts the running operation.
    Stop,
    /// Dismisses a finished report.
    Exit,
    /// Closes an informational screen.
    Close,
}

impl Button {
    pub fn caption(self) -> &'static str {
        match self {
            Button::Stop => "Stop",
            Button::Exit => "Exit",
            Button::Close => "Close",
        }
    }
}

/// A header, a body and one button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: String,
    pub text: String,
    pub button: Button,
}

impl Message {
    pub fn new(header: impl Into<String>, text: impl Into<String>, button: Button) -> Self {
        Self {
            header: header.into(),
            text: text.into(),
            button,
        }
    }
}

/// Screen shown on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    Message(Message),
    /// Screen owned by the menu layer, identified by name (e.g. "main menu").
    Screen(String),
}

impl Widget {
    pub fn screen(name: impl Into<String>) -> Self {
        Widget::Screen(name.into())
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Widget::Message(m) => Some(m),
            Widget::Screen(_) => None,
        }
    }
}

impl From<Message> for Widget {
    fn from(m: Message) -> Self {
        Widget::Message(m)
    }
}

/// Rising-edge detector for a polled button level.
///
/// `pressed` reports true only on the poll where the level goes from
/// released to pressed; holding the button does not repeat.
#[derive(Debug, Default, Clone, Copy)]
pub struct ButtonEdge {
    prev: bool,
}

impl ButtonEdge {
    pub fn pressed(&mut self, level: bool) -> bool {
        let edge = level && !self.prev;
        self.prev = level;
        edge
    }
}

/// Sink for everything the motion core wants to show, plus the confirm button it polls.
pub trait UiSink {
    /// Replace the displayed screen.
    fn set_widget(&mut self, widget: Widget);

    /// Replace the body text of the displayed message and mark it for redraw.
    /// No-op when the current screen is not a message.
    fn update_text(&mut self, text: String);

    /// True once per press of the confirm/ok button; reading consumes the event.
    fn take_confirm(&mut self) -> bool;
}

impl<T: UiSink + ?Sized> UiSink for Box<T> {
    fn set_widget(&mut self, widget: Widget) {
        (**self).set_widget(widget);
    }

    fn update_text(&mut self, text: String) {
        (**self).update_text(text);
    }

    fn take_confirm(&mut self) -> bool {
        (**self).take_confirm()
    }
}
