//! Countdown timer component for Bubble Tea applications.
//!
//! The countdown shows the time left as `MM:SS` (or `H:MM:SS` once an hour or
//! more remains) in large block digits, with a time-of-day input and
//! Set Time / Start / Pause / Reset controls underneath. The remaining time
//! comes either from a number of seconds or from a target end-timestamp; in
//! the latter case it is recomputed from the clock on every render.
//!
//! When the count reaches zero the widget emits an [`EndedMsg`].
//!
//! # Basic Usage
//!
//! ```rust
//! use countdown_widget::countdown::{new, with_seconds};
//!
//! let mut timer = new(&[with_seconds(330)]);
//! let _ = timer.on_mount();
//! assert_eq!(timer.display(), "05:30");
//!
//! let _tick = timer.start();
//! assert!(timer.running());
//! ```
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use countdown_widget::countdown::{new, with_seconds, EndedMsg, Model};
//! use countdown_widget::Component;
//!
//! struct App {
//!     timer: Model,
//!     done: bool,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut timer = new(&[with_seconds(90)]);
//!         timer.focus();
//!         let cmd = timer.on_mount();
//!         (Self { timer, done: false }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(ended) = msg.downcast_ref::<EndedMsg>() {
//!             if ended.id == self.timer.id() {
//!                 self.done = true;
//!             }
//!         }
//!         self.timer.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.timer.view()
//!     }
//! }
//! ```
//!
//! # Lifecycle
//!
//! The widget follows the life of an embedded element: it is created with
//! [`new`], rendered for the first time by [`Model::on_mount`], reconfigured
//! through [`Model::on_config_change`] (the `seconds` and `to-time`
//! attributes), and stopped by [`Model::on_unmount`] when the host drops it
//! from its view.

use crate::clock::{format_clock, parse_clock, parse_target, remaining_until};
use crate::digits;
use crate::error::{default_reporter, Error, ErrorReporter};
use crate::key::{self, new_binding, with_help, with_keys_str, KeyMap as KeyMapTrait};
use crate::schedule::{default_scheduler, default_time_source, Scheduler, TimeSource};
use crate::timeinput;
use crate::Component;
use bubbletea_rs::{batch, tick as bubbletea_tick, Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use chrono::{DateTime, Utc};
use lipgloss_extras::lipgloss;
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Name of the initial-duration attribute.
pub const SECONDS_ATTR: &str = "seconds";
/// Name of the target end-timestamp attribute.
pub const TO_TIME_ATTR: &str = "to-time";

/// Declarative configuration observed by the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    /// Initial duration in seconds. Also the value restored by reset.
    Seconds,
    /// Target end-timestamp. Blank disables target mode.
    ToTime,
}

impl Attribute {
    /// Looks up an attribute by its name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            SECONDS_ATTR => Some(Attribute::Seconds),
            TO_TIME_ATTR => Some(Attribute::ToTime),
            _ => None,
        }
    }

    /// The attribute's name.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Seconds => SECONDS_ATTR,
            Attribute::ToTime => TO_TIME_ATTR,
        }
    }
}

/// The four user-facing controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Set the duration from the time input.
    SetTime,
    /// Start counting down.
    Start,
    /// Stop counting, keeping the remaining time.
    Pause,
    /// Stop counting and restore the configured duration.
    Reset,
}

impl Control {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Control::SetTime => "Set Time",
            Control::Start => "Start",
            Control::Pause => "Pause",
            Control::Reset => "Reset",
        }
    }
}

/// One periodic tick. Only the tick carrying the live handle is accepted.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// The countdown this tick belongs to.
    pub id: i64,
    /// The handle minted by the start that scheduled it.
    pub handle: u64,
}

/// Emitted when the remaining time reaches zero.
#[derive(Debug, Clone)]
pub struct EndedMsg {
    /// The countdown that ended.
    pub id: i64,
}

/// Asks a countdown to run one of its controls. An `id` of zero addresses
/// every countdown.
#[derive(Debug, Clone)]
pub struct ControlMsg {
    /// Target countdown, or zero for all.
    pub id: i64,
    /// The control to run.
    pub control: Control,
}

/// Keyboard shortcuts for the controls.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Set the duration from the time input.
    pub set_time: key::Binding,
    /// Start.
    pub start: key::Binding,
    /// Pause.
    pub pause: key::Binding,
    /// Start or pause.
    pub toggle: key::Binding,
    /// Reset.
    pub reset: key::Binding,
    /// Press the focused button, or set the time from the input.
    pub press: key::Binding,
    /// Move focus to the next control.
    pub next_focus: key::Binding,
    /// Move focus to the previous control.
    pub prev_focus: key::Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            set_time: new_binding(vec![with_keys_str(&["t"]), with_help("t", "set time")]),
            start: new_binding(vec![with_keys_str(&["s"]), with_help("s", "start")]),
            pause: new_binding(vec![with_keys_str(&["p"]), with_help("p", "pause")]),
            toggle: new_binding(vec![with_keys_str(&["space"]), with_help("space", "start/pause")]),
            reset: new_binding(vec![with_keys_str(&["r"]), with_help("r", "reset")]),
            press: new_binding(vec![with_keys_str(&["enter"]), with_help("enter", "press")]),
            next_focus: new_binding(vec![with_keys_str(&["tab"]), with_help("tab", "next")]),
            prev_focus: new_binding(vec![
                with_keys_str(&["shift+tab", "backtab"]),
                with_help("shift+tab", "previous"),
            ]),
        }
    }
}

impl KeyMapTrait for KeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.toggle, &self.reset, &self.set_time]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![&self.start, &self.pause, &self.toggle, &self.reset],
            vec![&self.set_time, &self.press, &self.next_focus, &self.prev_focus],
        ]
    }
}

/// Styles for the parts of the widget.
#[derive(Debug, Clone)]
pub struct Styles {
    /// The remaining time.
    pub display: Style,
    /// Unfocused buttons.
    pub button: Style,
    /// The focused button.
    pub active_button: Style,
    /// Inline error line.
    pub error: Style,
}

impl Default for Styles {
    fn default() -> Self {
        let button = Style::new()
            .foreground(Color::from("#FFFFFF"))
            .background(Color::from("#333333"))
            .padding(0, 1, 0, 1);
        Self {
            display: Style::new().bold(true).padding(1, 0, 1, 0),
            active_button: button.clone().background(Color::from("#555555")).bold(true),
            button,
            error: Style::new().foreground(Color::from("#FF5F87")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Button(Control),
}

const FOCUS_ORDER: [Focus; 5] = [
    Focus::Input,
    Focus::Button(Control::SetTime),
    Focus::Button(Control::Start),
    Focus::Button(Control::Pause),
    Focus::Button(Control::Reset),
];

/// Configuration option for [`new`].
///
/// ```rust
/// use countdown_widget::countdown::{new, with_big_digits, with_seconds};
///
/// let timer = new(&[with_seconds(90), with_big_digits(false)]);
/// assert_eq!(timer.display(), "01:30");
/// ```
#[derive(Clone)]
pub enum CountdownOption {
    /// Initial duration in seconds.
    WithSeconds(u64),
    /// Target end-timestamp.
    WithTarget(String),
    /// Tick period.
    WithInterval(Duration),
    /// Styles.
    WithStyles(Box<Styles>),
    /// Key bindings.
    WithKeyMap(Box<KeyMap>),
    /// Block-digit display on or off.
    WithBigDigits(bool),
    /// Fire the completion signal on every render at zero.
    WithRepeatingCompletion(bool),
    /// Where rejected input is reported.
    WithErrorReporter(Arc<dyn ErrorReporter>),
    /// How ticks are scheduled.
    WithScheduler(Arc<dyn Scheduler>),
    /// Where "now" comes from.
    WithTimeSource(Arc<dyn TimeSource>),
}

impl CountdownOption {
    fn apply(&self, m: &mut Model, target: &mut Option<String>) {
        match self {
            CountdownOption::WithSeconds(s) => {
                m.initial_seconds = *s;
                m.remaining = *s;
            }
            CountdownOption::WithTarget(t) => *target = Some(t.clone()),
            CountdownOption::WithInterval(i) => m.interval = *i,
            CountdownOption::WithStyles(s) => m.styles = s.as_ref().clone(),
            CountdownOption::WithKeyMap(k) => m.key_map = k.as_ref().clone(),
            CountdownOption::WithBigDigits(b) => m.big_digits = *b,
            CountdownOption::WithRepeatingCompletion(r) => m.repeat_completion = *r,
            CountdownOption::WithErrorReporter(r) => m.reporter = Arc::clone(r),
            CountdownOption::WithScheduler(s) => m.scheduler = Arc::clone(s),
            CountdownOption::WithTimeSource(t) => m.time = Arc::clone(t),
        }
    }
}

/// Initial duration in seconds.
pub fn with_seconds(seconds: u64) -> CountdownOption {
    CountdownOption::WithSeconds(seconds)
}

/// Target end-timestamp; see [`crate::clock::parse_target`] for formats.
pub fn with_target(target: impl Into<String>) -> CountdownOption {
    CountdownOption::WithTarget(target.into())
}

/// Tick period, one second by default.
pub fn with_interval(interval: Duration) -> CountdownOption {
    CountdownOption::WithInterval(interval)
}

/// Custom styles.
pub fn with_styles(styles: Styles) -> CountdownOption {
    CountdownOption::WithStyles(Box::new(styles))
}

/// Custom key bindings.
pub fn with_key_map(key_map: KeyMap) -> CountdownOption {
    CountdownOption::WithKeyMap(Box::new(key_map))
}

/// Render the remaining time in block digits (the default) or plain text.
pub fn with_big_digits(enabled: bool) -> CountdownOption {
    CountdownOption::WithBigDigits(enabled)
}

/// Emit [`EndedMsg`] on every render that sees zero instead of once per
/// arrival at zero.
pub fn with_repeating_completion(enabled: bool) -> CountdownOption {
    CountdownOption::WithRepeatingCompletion(enabled)
}

/// Report rejected input somewhere other than the tracing log.
pub fn with_error_reporter(reporter: impl ErrorReporter + 'static) -> CountdownOption {
    CountdownOption::WithErrorReporter(Arc::new(reporter))
}

/// Schedule ticks with something other than the bubbletea runtime.
pub fn with_scheduler(scheduler: impl Scheduler + 'static) -> CountdownOption {
    CountdownOption::WithScheduler(Arc::new(scheduler))
}

/// Read the current time from something other than the system clock.
pub fn with_time_source(time: impl TimeSource + 'static) -> CountdownOption {
    CountdownOption::WithTimeSource(Arc::new(time))
}

/// The countdown model.
#[derive(Clone)]
pub struct Model {
    /// Tick period.
    pub interval: Duration,
    /// Styles.
    pub styles: Styles,
    /// Key bindings.
    pub key_map: KeyMap,
    /// Render in block digits.
    pub big_digits: bool,
    /// Emit [`EndedMsg`] on every render at zero.
    pub repeat_completion: bool,
    /// The time-of-day input.
    pub input: timeinput::Model,

    id: i64,
    remaining: u64,
    target: Option<DateTime<Utc>>,
    initial_seconds: u64,
    running: bool,
    tick_handle: Option<u64>,
    last_handle: u64,
    display: String,
    at_zero: bool,
    completions: u64,
    error: Option<Error>,
    focus: bool,
    focused_control: Focus,
    reporter: Arc<dyn ErrorReporter>,
    scheduler: Arc<dyn Scheduler>,
    time: Arc<dyn TimeSource>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("remaining", &self.remaining)
            .field("target", &self.target)
            .field("initial_seconds", &self.initial_seconds)
            .field("running", &self.running)
            .field("tick_handle", &self.tick_handle)
            .field("display", &self.display)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Creates a countdown configured by `opts`.
///
/// Without options the countdown starts at zero seconds, stopped.
pub fn new(opts: &[CountdownOption]) -> Model {
    let mut m = Model {
        interval: Duration::from_secs(1),
        styles: Styles::default(),
        key_map: KeyMap::default(),
        big_digits: true,
        repeat_completion: false,
        input: timeinput::new(),
        id: next_id(),
        remaining: 0,
        target: None,
        initial_seconds: 0,
        running: false,
        tick_handle: None,
        last_handle: 0,
        display: String::new(),
        at_zero: false,
        completions: 0,
        error: None,
        focus: false,
        focused_control: Focus::Button(Control::Start),
        reporter: default_reporter(),
        scheduler: default_scheduler(),
        time: default_time_source(),
    };

    let mut target = None;
    for opt in opts {
        opt.apply(&mut m, &mut target);
    }
    if let Some(raw) = target {
        m.target = m.resolve_target(&raw);
    }
    if let Some(t) = m.target {
        m.remaining = remaining_until(t, m.time.now());
    }
    m.display = format_clock(m.remaining);
    m
}

impl Default for Model {
    fn default() -> Self {
        new(&[])
    }
}

fn emit<M: Clone + Send + Sync + 'static>(msg: M) -> Cmd {
    bubbletea_tick(Duration::from_nanos(1), move |_| Box::new(msg.clone()) as Msg)
}

// Leading optional sign and digits, as a lenient integer attribute reader.
fn leading_seconds(value: &str) -> Option<u64> {
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(rest[..digits].parse::<u64>().unwrap_or(u64::MAX))
}

fn join(a: Option<Cmd>, b: Option<Cmd>) -> Option<Cmd> {
    match (a, b) {
        (Some(a), Some(b)) => Some(batch(vec![a, b])),
        (a, b) => a.or(b),
    }
}

impl Model {
    /// Unique id of this countdown.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Seconds left as of the last render.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// The configured target end-timestamp, if any.
    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.target
    }

    /// The duration restored by [`Model::reset`].
    pub fn initial_seconds(&self) -> u64 {
        self.initial_seconds
    }

    /// Whether the periodic tick is active.
    pub fn running(&self) -> bool {
        self.running
    }

    /// Whether the last render saw zero.
    pub fn ended(&self) -> bool {
        self.remaining == 0
    }

    /// Handle of the live tick, if running.
    pub fn tick_handle(&self) -> Option<u64> {
        self.tick_handle
    }

    /// The formatted remaining time from the last render.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Number of completion signals emitted so far.
    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// The last rejected input, shown until the next successful change.
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// The tick the countdown is waiting for, if running.
    pub fn tick_msg(&self) -> Option<TickMsg> {
        self.tick_handle.map(|handle| TickMsg {
            id: self.id,
            handle,
        })
    }

    /// Returns a command that runs `control` on this countdown.
    pub fn send(&self, control: Control) -> Cmd {
        emit(ControlMsg {
            id: self.id,
            control,
        })
    }

    /// First render after the widget is placed in its host view.
    pub fn on_mount(&mut self) -> Option<Cmd> {
        debug!(id = self.id, remaining = self.remaining, "countdown mounted");
        self.update_display()
    }

    /// Same as [`Model::on_mount`].
    pub fn init(&mut self) -> Option<Cmd> {
        self.on_mount()
    }

    /// Cancels the periodic tick. Call when the host drops the widget.
    pub fn on_unmount(&mut self) {
        debug!(id = self.id, "countdown unmounted");
        self.cancel();
    }

    /// Applies an external configuration change and re-renders, whether or
    /// not the countdown is running.
    ///
    /// A `seconds` value is read from its leading integer, so `"42.7"` is 42
    /// and `"12abc"` is 12; negative values clamp to zero and values without
    /// a leading integer count as zero. A blank or absent `to-time` disables target mode; an unparseable one
    /// pins the target to now, so the display reads zero.
    pub fn on_config_change(&mut self, attr: Attribute, value: Option<&str>) -> Option<Cmd> {
        debug!(id = self.id, attr = attr.name(), ?value, "countdown reconfigured");
        match attr {
            Attribute::Seconds => {
                let seconds = value.map_or(0, |v| {
                    leading_seconds(v).unwrap_or_else(|| {
                        let err = Error::InvalidSeconds {
                            value: v.to_string(),
                        };
                        debug!(error = %err, "seconds attribute coerced");
                        0
                    })
                });
                self.initial_seconds = seconds;
                self.remaining = seconds;
            }
            Attribute::ToTime => {
                self.target = value.and_then(|v| self.resolve_target(v));
            }
        }
        self.update_display()
    }

    /// Like [`Model::on_config_change`] with the attribute given by name.
    /// Unknown names are ignored.
    pub fn set_attribute(&mut self, name: &str, value: Option<&str>) -> Option<Cmd> {
        let attr = Attribute::from_name(name)?;
        self.on_config_change(attr, value)
    }

    fn resolve_target(&self, raw: &str) -> Option<DateTime<Utc>> {
        if raw.trim().is_empty() {
            return None;
        }
        parse_target(raw).or_else(|| {
            debug!(target_value = raw, "unparseable target, counting to now");
            Some(self.time.now())
        })
    }

    /// Recomputes and formats the remaining time.
    ///
    /// With a target set the remaining time is taken from the clock. Returns
    /// the [`EndedMsg`] command when this render completes the countdown.
    pub fn update_display(&mut self) -> Option<Cmd> {
        if let Some(target) = self.target {
            self.remaining = remaining_until(target, self.time.now());
        }
        self.display = format_clock(self.remaining);

        let at_zero = self.remaining == 0;
        let fire = at_zero && (self.repeat_completion || !self.at_zero);
        self.at_zero = at_zero;
        if !fire {
            return None;
        }

        self.completions += 1;
        debug!(id = self.id, "countdown ended");
        Some(emit(EndedMsg { id: self.id }))
    }

    /// Sets the remaining time from an `HH:MM:SS` string and clears any
    /// target.
    ///
    /// Malformed input leaves the countdown untouched; the error is passed to
    /// the reporter, kept for inline display and returned.
    pub fn set_duration(&mut self, input: &str) -> Result<Option<Cmd>, Error> {
        let clock = match parse_clock(input) {
            Ok(clock) => clock,
            Err(err) => {
                self.reporter.report(&err);
                self.error = Some(err.clone());
                return Err(err);
            }
        };

        self.remaining = clock.total_seconds();
        self.target = None;
        self.error = None;
        debug!(id = self.id, remaining = self.remaining, "duration set");
        Ok(self.update_display())
    }

    /// Sets the remaining time from the time input.
    pub fn set_time(&mut self) -> Result<Option<Cmd>, Error> {
        let value = self.input.value();
        self.set_duration(&value)
    }

    /// Starts the periodic tick. Does nothing and returns `None` while
    /// already running.
    pub fn start(&mut self) -> Option<Cmd> {
        if self.running {
            return None;
        }
        self.last_handle += 1;
        self.tick_handle = Some(self.last_handle);
        self.running = true;
        debug!(id = self.id, handle = self.last_handle, "countdown started");
        Some(self.schedule(self.last_handle))
    }

    /// Stops the periodic tick, keeping the remaining time. Does nothing
    /// while stopped.
    pub fn pause(&mut self) {
        if !self.running {
            return;
        }
        self.cancel();
        debug!(id = self.id, remaining = self.remaining, "countdown paused");
    }

    /// Starts when stopped, pauses when running.
    pub fn toggle(&mut self) -> Option<Cmd> {
        if self.running {
            self.pause();
            None
        } else {
            self.start()
        }
    }

    /// Stops the countdown and restores the configured `seconds` value.
    ///
    /// A configured target keeps governing the display.
    pub fn reset(&mut self) -> Option<Cmd> {
        self.cancel();
        self.remaining = self.initial_seconds;
        self.error = None;
        debug!(id = self.id, remaining = self.remaining, "countdown reset");
        self.update_display()
    }

    /// Runs one of the controls.
    pub fn run(&mut self, control: Control) -> Option<Cmd> {
        match control {
            Control::SetTime => self.set_time().ok().flatten(),
            Control::Start => self.start(),
            Control::Pause => {
                self.pause();
                None
            }
            Control::Reset => self.reset(),
        }
    }

    fn cancel(&mut self) {
        self.tick_handle = None;
        self.running = false;
    }

    fn schedule(&self, handle: u64) -> Cmd {
        self.scheduler.schedule(
            self.interval,
            TickMsg {
                id: self.id,
                handle,
            },
        )
    }

    fn move_focus(&mut self, step: isize) {
        let len = FOCUS_ORDER.len() as isize;
        let at = FOCUS_ORDER
            .iter()
            .position(|f| *f == self.focused_control)
            .unwrap_or(0) as isize;
        self.focused_control = FOCUS_ORDER[(at + step).rem_euclid(len) as usize];

        if self.focused_control == Focus::Input {
            self.input.focus();
        } else {
            self.input.blur();
        }
    }

    fn handle_key(&mut self, key_msg: &KeyMsg, msg: &Msg) -> Option<Cmd> {
        if self.key_map.next_focus.matches(key_msg) {
            self.move_focus(1);
            return None;
        }
        if self.key_map.prev_focus.matches(key_msg) {
            self.move_focus(-1);
            return None;
        }

        if self.focused_control == Focus::Input {
            if self.key_map.press.matches(key_msg) {
                return self.run(Control::SetTime);
            }
            self.input.update(msg);
            return None;
        }

        let km = &self.key_map;
        let control = if km.press.matches(key_msg) {
            match self.focused_control {
                Focus::Button(control) => control,
                Focus::Input => return None,
            }
        } else if km.set_time.matches(key_msg) {
            Control::SetTime
        } else if km.start.matches(key_msg) {
            Control::Start
        } else if km.pause.matches(key_msg) {
            Control::Pause
        } else if km.reset.matches(key_msg) {
            Control::Reset
        } else if km.toggle.matches(key_msg) {
            return self.toggle();
        } else {
            return None;
        };
        self.run(control)
    }

    /// Processes ticks, control messages and, while focused, key presses.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(tick) = msg.downcast_ref::<TickMsg>() {
            if tick.id != self.id || !self.running || self.tick_handle != Some(tick.handle) {
                return None;
            }

            let mut ended = None;
            if self.remaining > 0 {
                self.remaining -= 1;
                ended = self.update_display();
            }
            return join(Some(self.schedule(tick.handle)), ended);
        }

        if let Some(control_msg) = msg.downcast_ref::<ControlMsg>() {
            if control_msg.id != 0 && control_msg.id != self.id {
                return None;
            }
            return self.run(control_msg.control);
        }

        if let Some(key_msg) = msg.downcast_ref::<KeyMsg>() {
            if !self.focus {
                return None;
            }
            return self.handle_key(key_msg, &msg);
        }

        None
    }

    fn button(&self, control: Control) -> String {
        let style = if self.focus && self.focused_control == Focus::Button(control) {
            &self.styles.active_button
        } else {
            &self.styles.button
        };
        style.render(control.label())
    }

    /// Renders the input row, the remaining time and the button row.
    pub fn view(&self) -> String {
        let input_view = self.input.view();
        let set_button = self.button(Control::SetTime);
        let input_row = lipgloss::join_horizontal(
            lipgloss::CENTER,
            &[input_view.as_str(), "  ", set_button.as_str()],
        );

        let time = if self.big_digits {
            digits::render(&self.display)
        } else {
            self.display.clone()
        };
        let time = self.styles.display.render(&time);

        let buttons: Vec<String> = [Control::Start, Control::Pause, Control::Reset]
            .iter()
            .map(|c| self.button(*c))
            .collect();
        let button_row = lipgloss::join_horizontal(
            lipgloss::CENTER,
            &[buttons[0].as_str(), " ", buttons[1].as_str(), " ", buttons[2].as_str()],
        );

        let mut rows = vec![input_row, time, button_row];
        if let Some(err) = &self.error {
            rows.push(self.styles.error.render(&err.to_string()));
        }
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        lipgloss::join_vertical(lipgloss::CENTER, &rows)
    }
}

impl Component for Model {
    fn focus(&mut self) -> Option<Cmd> {
        self.focus = true;
        if self.focused_control == Focus::Input {
            self.input.focus();
        }
        None
    }

    fn blur(&mut self) {
        self.focus = false;
        self.input.blur();
    }

    fn focused(&self) -> bool {
        self.focus
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        let mut model = new(&[]);
        model.focus();
        let cmd = model.on_mount();
        (model, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{ImmediateScheduler, ManualTime};
    use chrono::TimeZone;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::Mutex;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap()
    }

    fn timer(opts: &[CountdownOption]) -> Model {
        let mut all = vec![
            with_scheduler(ImmediateScheduler),
            with_time_source(ManualTime::new(epoch())),
            with_big_digits(false),
        ];
        all.extend_from_slice(opts);
        new(&all)
    }

    fn tick(m: &mut Model) -> Option<Cmd> {
        let msg = m.tick_msg().expect("countdown should be running");
        m.update(Box::new(msg))
    }

    fn press(m: &mut Model, code: KeyCode) -> Option<Cmd> {
        m.update(Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }))
    }

    #[test]
    fn test_new_defaults() {
        let m = new(&[]);
        assert_eq!(m.display(), "00:00");
        assert_eq!(m.remaining(), 0);
        assert_eq!(m.interval, Duration::from_secs(1));
        assert!(!m.running());
        assert!(m.tick_handle().is_none());
        assert!(m.target().is_none());
        assert!(m.id() > 0);
    }

    #[test]
    fn test_unique_ids() {
        assert_ne!(new(&[]).id(), new(&[]).id());
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(timer(&[with_seconds(330)]).display(), "05:30");
        assert_eq!(timer(&[with_seconds(3723)]).display(), "1:02:03");
        assert_eq!(timer(&[with_seconds(59)]).display(), "00:59");
    }

    #[test]
    fn test_mount_at_zero_signals_completion_once() {
        let mut m = timer(&[]);
        assert!(m.on_mount().is_some());
        assert_eq!(m.completions(), 1);

        assert!(m.update_display().is_none());
        assert_eq!(m.completions(), 1);
    }

    #[test]
    fn test_repeating_completion() {
        let mut m = timer(&[with_repeating_completion(true)]);
        assert!(m.on_mount().is_some());
        assert!(m.update_display().is_some());
        assert_eq!(m.completions(), 2);
    }

    #[test]
    fn test_completion_rearms_after_leaving_zero() {
        let mut m = timer(&[with_seconds(1)]);
        assert!(m.on_mount().is_none());
        m.start();
        tick(&mut m);
        assert_eq!(m.completions(), 1);

        m.set_duration("00:00:01").unwrap();
        tick(&mut m);
        assert_eq!(m.completions(), 2);
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut m = timer(&[with_seconds(10)]);
        assert!(m.start().is_some());
        let handle = m.tick_handle();
        assert!(handle.is_some());

        assert!(m.start().is_none());
        assert_eq!(m.tick_handle(), handle);
        assert!(m.running());
        assert_eq!(m.remaining(), 10);
    }

    #[test]
    fn test_pause_when_stopped_is_noop() {
        let mut m = timer(&[with_seconds(10)]);
        m.pause();
        assert!(!m.running());
        assert_eq!(m.remaining(), 10);
        assert_eq!(m.display(), "00:10");
    }

    #[test]
    fn test_five_ticks_reach_zero() {
        let mut m = timer(&[with_seconds(5)]);
        m.on_mount();
        m.start();
        for _ in 0..5 {
            assert!(tick(&mut m).is_some());
        }
        assert_eq!(m.display(), "00:00");
        assert!(m.ended());
        assert!(m.completions() >= 1);

        // Still running at zero, never below it.
        tick(&mut m);
        tick(&mut m);
        assert!(m.running());
        assert_eq!(m.remaining(), 0);
        assert_eq!(m.completions(), 1);
    }

    #[test]
    fn test_start_at_zero_stays_at_zero() {
        let mut m = timer(&[]);
        m.on_mount();
        m.start();
        tick(&mut m);
        assert_eq!(m.remaining(), 0);
        assert!(m.completions() >= 1);
    }

    #[test]
    fn test_stale_ticks_are_ignored() {
        let mut m = timer(&[with_seconds(10)]);
        m.start();
        let stale = m.tick_msg().unwrap();

        m.pause();
        assert!(m.update(Box::new(stale.clone())).is_none());
        assert_eq!(m.remaining(), 10);

        m.start();
        assert_ne!(m.tick_handle(), Some(stale.handle));
        assert!(m.update(Box::new(stale)).is_none());
        assert_eq!(m.remaining(), 10);

        tick(&mut m);
        assert_eq!(m.remaining(), 9);
    }

    #[test]
    fn test_foreign_tick_is_ignored() {
        let mut m = timer(&[with_seconds(10)]);
        m.start();
        let mut msg = m.tick_msg().unwrap();
        msg.id += 999;
        assert!(m.update(Box::new(msg)).is_none());
        assert_eq!(m.remaining(), 10);
    }

    #[test]
    fn test_set_duration() {
        let mut m = timer(&[with_target("2030-06-01T13:00:00Z")]);
        m.set_duration("01:02:03").unwrap();
        assert_eq!(m.remaining(), 3723);
        assert_eq!(m.display(), "1:02:03");
        assert!(m.target().is_none());
    }

    #[test]
    fn test_set_duration_rejects_malformed_input() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut m = timer(&[
            with_seconds(42),
            with_error_reporter(move |err: &Error| sink.lock().unwrap().push(err.clone())),
        ]);

        let err = m
            .set_duration("ab:00:00")
            .err()
            .expect("malformed input is rejected");
        assert_eq!(
            err,
            Error::InvalidClock {
                input: "ab:00:00".to_string()
            }
        );
        assert_eq!(m.remaining(), 42);
        assert_eq!(m.display(), "00:42");
        assert_eq!(seen.lock().unwrap().as_slice(), &[err.clone()]);
        assert_eq!(m.error(), Some(&err));
        assert!(lipgloss::strip_ansi(&m.view()).contains("Use HH:MM:SS"));

        m.set_duration("00:00:07").unwrap();
        assert!(m.error().is_none());
    }

    #[test]
    fn test_reset_restores_configured_seconds() {
        let mut m = timer(&[with_seconds(30)]);
        m.start();
        tick(&mut m);
        tick(&mut m);
        m.set_duration("02:00:00").unwrap();

        m.reset();
        assert_eq!(m.remaining(), 30);
        assert_eq!(m.display(), "00:30");
        assert!(!m.running());
        assert!(m.tick_handle().is_none());
    }

    #[test]
    fn test_reset_reads_latest_seconds_attribute() {
        let mut m = timer(&[with_seconds(30)]);
        m.on_config_change(Attribute::Seconds, Some("90"));
        m.set_duration("00:00:05").unwrap();
        m.reset();
        assert_eq!(m.remaining(), 90);
    }

    #[test]
    fn test_target_countdown() {
        let time = ManualTime::new(epoch());
        let mut m = timer(&[
            with_time_source(time.clone()),
            with_target("2030-06-01T12:00:10Z"),
        ]);
        m.on_mount();
        assert_eq!(m.display(), "00:10");

        m.start();
        time.advance(Duration::from_secs(3));
        tick(&mut m);
        assert_eq!(m.display(), "00:07");

        time.advance(Duration::from_secs(60));
        tick(&mut m);
        assert_eq!(m.display(), "00:00");
        assert!(m.completions() >= 1);
    }

    #[test]
    fn test_config_change_seconds() {
        let mut m = timer(&[]);
        m.start();
        m.on_config_change(Attribute::Seconds, Some("42"));
        assert_eq!(m.display(), "00:42");
        assert!(m.running());

        m.on_config_change(Attribute::Seconds, Some("ten"));
        assert_eq!(m.remaining(), 0);
        m.on_config_change(Attribute::Seconds, None);
        assert_eq!(m.initial_seconds(), 0);
    }

    #[test]
    fn test_config_change_seconds_reads_leading_integer() {
        let mut m = timer(&[]);
        for (value, expected) in [
            ("42.7", 42),
            ("12abc", 12),
            ("  +7", 7),
            ("-5", 0),
            ("abc12", 0),
            ("-", 0),
        ] {
            m.on_config_change(Attribute::Seconds, Some(value));
            assert_eq!(m.remaining(), expected, "seconds={value:?}");
            assert_eq!(m.initial_seconds(), expected, "seconds={value:?}");
        }

        m.on_config_change(Attribute::Seconds, Some("99999999999999999999999"));
        assert_eq!(m.remaining(), u64::MAX);
    }

    #[test]
    fn test_config_change_target() {
        let mut m = timer(&[with_seconds(20)]);
        m.set_attribute("to-time", Some("2030-06-01T12:01:00Z"));
        assert_eq!(m.display(), "01:00");

        m.set_attribute("to-time", Some(""));
        assert!(m.target().is_none());
        assert_eq!(m.display(), "01:00");

        m.set_attribute("to-time", Some("whenever"));
        assert_eq!(m.display(), "00:00");

        assert!(m.set_attribute("colour", Some("red")).is_none());
    }

    #[test]
    fn test_unmount_cancels_tick() {
        let mut m = timer(&[with_seconds(10)]);
        m.start();
        let pending = m.tick_msg().unwrap();
        m.on_unmount();
        assert!(!m.running());
        assert!(m.tick_handle().is_none());
        assert!(m.update(Box::new(pending)).is_none());
        assert_eq!(m.remaining(), 10);
    }

    #[test]
    fn test_keys_ignored_when_blurred() {
        let mut m = timer(&[with_seconds(10)]);
        assert!(press(&mut m, KeyCode::Char('s')).is_none());
        assert!(!m.running());
    }

    #[test]
    fn test_shortcut_keys() {
        let mut m = timer(&[with_seconds(10)]);
        m.focus();

        assert!(press(&mut m, KeyCode::Char('s')).is_some());
        assert!(m.running());
        press(&mut m, KeyCode::Char('p'));
        assert!(!m.running());
        press(&mut m, KeyCode::Char(' '));
        assert!(m.running());
        tick(&mut m);
        press(&mut m, KeyCode::Char('r'));
        assert!(!m.running());
        assert_eq!(m.remaining(), 10);
    }

    #[test]
    fn test_focus_cycle_and_enter() {
        let mut m = timer(&[with_seconds(10)]);
        m.focus();

        // Start is focused first.
        press(&mut m, KeyCode::Enter);
        assert!(m.running());

        press(&mut m, KeyCode::Tab);
        press(&mut m, KeyCode::Enter);
        assert!(!m.running());

        press(&mut m, KeyCode::Tab);
        press(&mut m, KeyCode::Tab);
        assert!(m.input.focused());

        press(&mut m, KeyCode::BackTab);
        assert!(!m.input.focused());
    }

    #[test]
    fn test_shift_backtab_moves_focus_backwards() {
        let mut m = timer(&[with_seconds(10)]);
        m.focus();

        // Terminals report shift+tab as BackTab with the shift modifier held.
        for _ in 0..2 {
            m.update(Box::new(KeyMsg {
                key: KeyCode::BackTab,
                modifiers: KeyModifiers::SHIFT,
            }));
        }
        assert!(m.input.focused());

        m.update(Box::new(KeyMsg {
            key: KeyCode::BackTab,
            modifiers: KeyModifiers::SHIFT,
        }));
        assert!(!m.input.focused());
    }

    #[test]
    fn test_set_time_from_input() {
        let mut m = timer(&[with_seconds(10)]);
        m.focus();
        press(&mut m, KeyCode::BackTab);
        press(&mut m, KeyCode::BackTab);
        assert!(m.input.focused());

        m.update(Box::new(KeyMsg {
            key: KeyCode::Char('u'),
            modifiers: KeyModifiers::CONTROL,
        }));
        for c in "00:01:30".chars() {
            press(&mut m, KeyCode::Char(c));
        }
        // Letters go to the input, not the shortcuts.
        assert!(!m.running());

        press(&mut m, KeyCode::Enter);
        assert_eq!(m.remaining(), 90);
        assert_eq!(m.display(), "01:30");
    }

    #[test]
    fn test_control_msg_routing() {
        let mut m = timer(&[with_seconds(10)]);
        let other = ControlMsg {
            id: m.id() + 1000,
            control: Control::Start,
        };
        assert!(m.update(Box::new(other)).is_none());
        assert!(!m.running());

        let broadcast = ControlMsg {
            id: 0,
            control: Control::Start,
        };
        assert!(m.update(Box::new(broadcast)).is_some());
        assert!(m.running());
    }

    #[test]
    fn test_view_layout() {
        let mut m = timer(&[with_seconds(3723)]);
        m.on_mount();
        let view = lipgloss::strip_ansi(&m.view());
        for label in ["Set Time", "Start", "Pause", "Reset", "00:00:00", "1:02:03"] {
            assert!(view.contains(label), "view should contain {label:?}:\n{view}");
        }

        m.big_digits = true;
        let view = lipgloss::strip_ansi(&m.view());
        assert!(view.contains('█'));
        assert!(!view.contains("1:02:03"));
    }

    #[test]
    fn test_help_bindings() {
        let km = KeyMap::default();
        let short: Vec<&str> = km.short_help().iter().map(|b| b.help().key.as_str()).collect();
        assert_eq!(short, vec!["space", "r", "t"]);
        assert_eq!(km.full_help().len(), 2);
    }

    #[tokio::test]
    async fn test_ended_command_yields_msg() {
        let mut m = timer(&[]);
        let cmd = m.on_mount().expect("ended command");
        let msg = cmd.await.expect("a message");
        let ended = msg.downcast_ref::<EndedMsg>().expect("an EndedMsg");
        assert_eq!(ended.id, m.id());
    }

    #[tokio::test]
    async fn test_scheduled_tick_drives_countdown() {
        let mut m = timer(&[with_seconds(3)]);
        let mut cmd = m.start();
        while m.remaining() > 1 {
            let msg = cmd.take().expect("next tick").await.expect("tick msg");
            assert!(msg.downcast_ref::<TickMsg>().is_some());
            cmd = m.update(msg);
        }
        assert_eq!(m.display(), "00:01");
    }

    #[tokio::test]
    async fn test_runtime_tick_honours_interval() {
        let mut m = new(&[
            with_seconds(3),
            with_interval(Duration::from_millis(1)),
            with_time_source(ManualTime::new(epoch())),
            with_big_digits(false),
        ]);
        let mut cmd = m.start();
        for _ in 0..2 {
            let next = cmd.take().expect("next tick");
            // A one second default period would blow this deadline.
            let msg = tokio::time::timeout(Duration::from_millis(500), next)
                .await
                .expect("tick arrives within the configured interval")
                .expect("tick msg");
            let tick = msg.downcast_ref::<TickMsg>().expect("a TickMsg");
            assert_eq!(tick.id, m.id());
            cmd = m.update(msg);
        }
        assert_eq!(m.remaining(), 1);
        assert!(m.running());
    }
}
