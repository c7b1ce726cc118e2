#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Text-console stand-in for the plotter's menu display.
//!
//! Screens are rendered as plain text to any writer. The confirm/ok button is
//! a shared flag that another thread (a Ctrl-C handler, a test) can press.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use plotter_traits::{Button, ButtonEdge, Message, UiSink, Widget};

pub struct ConsoleUi<W: Write> {
    out: W,
    current: Option<Widget>,
    button: Arc<AtomicBool>,
    edge: ButtonEdge,
    auto_dismiss: bool,
    dismiss_pending: bool,
    last_status: Option<String>,
}

impl<W: Write> core::fmt::Debug for ConsoleUi<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConsoleUi")
            .field("current", &self.current)
            .field("auto_dismiss", &self.auto_dismiss)
            .finish_non_exhaustive()
    }
}

impl<W: Write> ConsoleUi<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            current: None,
            button: Arc::new(AtomicBool::new(false)),
            edge: ButtonEdge::default(),
            auto_dismiss: false,
            dismiss_pending: false,
            last_status: None,
        }
    }

    /// Confirm every "Exit" screen on the first poll after it is shown.
    pub fn with_auto_dismiss(mut self, on: bool) -> Self {
        self.auto_dismiss = on;
        self
    }

    /// Shared confirm button; store `true` to press it once.
    pub fn button(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.button)
    }

    pub fn current(&self) -> Option<&Widget> {
        self.current.as_ref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print the position overlay line when it changed since the last call.
    pub fn show_status(&mut self, line: &str) {
        if self.last_status.as_deref() == Some(line) {
            return;
        }
        self.emit(|out| writeln!(out, "{line}"));
        self.last_status = Some(line.to_owned());
    }

    fn emit(&mut self, f: impl FnOnce(&mut W) -> std::io::Result<()>) {
        if let Err(e) = f(&mut self.out).and_then(|()| self.out.flush()) {
            tracing::warn!(error = %e, "console write failed");
        }
    }

    fn render(&mut self) {
        let Some(widget) = self.current.clone() else {
            return;
        };
        match widget {
            Widget::Message(Message {
                header,
                text,
                button,
            }) => self.emit(|out| {
                writeln!(out, "== {header} ==")?;
                for line in text.lines() {
                    writeln!(out, "  {line}")?;
                }
                writeln!(out, "  [ {} ]", button.caption())
            }),
            Widget::Screen(name) => self.emit(|out| writeln!(out, "-- {name} --")),
        }
    }
}

impl<W: Write> UiSink for ConsoleUi<W> {
    fn set_widget(&mut self, widget: Widget) {
        tracing::debug!(?widget, "show");
        self.dismiss_pending = self.auto_dismiss
            && widget
                .as_message()
                .is_some_and(|m| m.button == Button::Exit);
        self.current = Some(widget);
        self.render();
    }

    fn update_text(&mut self, text: String) {
        let Some(Widget::Message(m)) = self.current.as_mut() else {
            return;
        };
        if m.text == text {
            return;
        }
        m.text = text;
        self.render();
    }

    fn take_confirm(&mut self) -> bool {
        if self.dismiss_pending {
            self.dismiss_pending = false;
            return true;
        }
        let level = self.button.swap(false, Ordering::AcqRel);
        self.edge.pressed(level)
    }
}
