//! Test and helper mocks for plotter_core

use plotter_traits::{HwResult, Motor, MotorState, Polarity, StopAction, UiSink, Widget};

/// A motor that records every command and reports whatever position and
/// state the test sets.
///
/// Commands append to one string the way the device layer's `command`
/// attribute file accumulates writes, e.g. `"resetrun-directstoprun-direct"`.
#[derive(Debug, Clone)]
pub struct MockMotor {
    commands: String,
    position: i32,
    state: MotorState,
    connected: bool,
    failure: Option<String>,
    pub polarity: Option<Polarity>,
    pub duty_cycle: Option<i32>,
    pub speed: Option<i32>,
    pub position_target: Option<i32>,
    pub stop_action: Option<StopAction>,
}

impl Default for MockMotor {
    fn default() -> Self {
        Self {
            commands: String::new(),
            position: 0,
            state: MotorState::default(),
            connected: true,
            failure: None,
            polarity: None,
            duty_cycle: None,
            speed: None,
            position_target: None,
            stop_action: None,
        }
    }
}

impl MockMotor {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &str {
        &self.commands
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    /// Space-separated state flags, e.g. `"running stalled"`.
    pub fn set_state(&mut self, flags: &str) {
        self.state = MotorState::parse(flags);
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Make every later call fail with `message`.
    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    fn check(&self) -> HwResult<()> {
        if let Some(msg) = &self.failure {
            return Err(Box::new(std::io::Error::other(msg.clone())));
        }
        if !self.connected {
            return Err(Box::new(std::io::Error::other("motor not connected")));
        }
        Ok(())
    }

    fn command(&mut self, cmd: &str) -> HwResult<()> {
        self.check()?;
        self.commands.push_str(cmd);
        Ok(())
    }
}

impl Motor for MockMotor {
    fn reset(&mut self) -> HwResult<()> {
        self.command("reset")?;
        self.position = 0;
        self.state = MotorState::default();
        Ok(())
    }

    fn set_polarity(&mut self, polarity: Polarity) -> HwResult<()> {
        self.check()?;
        self.polarity = Some(polarity);
        Ok(())
    }

    fn set_duty_cycle(&mut self, percent: i32) -> HwResult<()> {
        self.check()?;
        self.duty_cycle = Some(percent);
        Ok(())
    }

    fn run_direct(&mut self) -> HwResult<()> {
        self.command("run-direct")
    }

    fn stop(&mut self) -> HwResult<()> {
        self.command("stop")
    }

    fn set_speed(&mut self, ticks_per_sec: i32) -> HwResult<()> {
        self.check()?;
        self.speed = Some(ticks_per_sec);
        Ok(())
    }

    fn set_position_target(&mut self, position: i32) -> HwResult<()> {
        self.check()?;
        self.position_target = Some(position);
        Ok(())
    }

    fn set_stop_action(&mut self, action: StopAction) -> HwResult<()> {
        self.check()?;
        self.stop_action = Some(action);
        Ok(())
    }

    fn run_to_absolute_position(&mut self) -> HwResult<()> {
        self.command("run-to-abs-pos")
    }

    fn position(&self) -> HwResult<i32> {
        self.check()?;
        Ok(self.position)
    }

    fn state(&self) -> HwResult<MotorState> {
        self.check()?;
        Ok(self.state.clone())
    }

    fn connected(&self) -> bool {
        self.connected
    }
}

/// A display that keeps every screen and text update it was sent.
#[derive(Debug, Default)]
pub struct RecordingUi {
    pub widgets: Vec<Widget>,
    pub texts: Vec<String>,
    confirms: usize,
}

impl RecordingUi {
    /// Queue one press of the confirm button.
    pub fn press_confirm(&mut self) {
        self.confirms += 1;
    }

    /// The screen currently shown, with text updates applied.
    pub fn current(&self) -> Option<&Widget> {
        self.widgets.last()
    }
}

impl UiSink for RecordingUi {
    fn set_widget(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    fn update_text(&mut self, text: String) {
        if let Some(Widget::Message(m)) = self.widgets.last_mut() {
            m.text.clone_from(&text);
        }
        self.texts.push(text);
    }

    fn take_confirm(&mut self) -> bool {
        if self.confirms == 0 {
            return false;
        }
        self.confirms -= 1;
        true
    }
}
