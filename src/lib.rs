#![warn(missing_docs)]

//! # countdown-widget
//!
//! A countdown timer component for terminal applications built with
//! [bubbletea-rs](https://github.com/joshka/bubbletea-rs).
//!
//! The widget shows the remaining time in large block digits, lets the user
//! type a new duration into a time-of-day input, and offers Set Time, Start,
//! Pause and Reset controls. The time comes either from a number of seconds
//! or from a target end-timestamp. When the count reaches zero the widget
//! emits an [`EndedMsg`].
//!
//! Like the other bubbletea components it follows the Elm Architecture with
//! `update()` and `view()`, and adds explicit lifecycle entry points for hosts
//! that mount and unmount it: [`Countdown::on_mount`],
//! [`Countdown::on_config_change`] and [`Countdown::on_unmount`].
//!
//! ## Quick Start
//!
//! ```rust
//! use countdown_widget::prelude::*;
//!
//! let mut timer = countdown_new(&[with_seconds(3723)]);
//! let _ = timer.on_mount();
//! assert_eq!(timer.display(), "1:02:03");
//!
//! timer.set_duration("00:05:30").unwrap();
//! assert_eq!(timer.display(), "05:30");
//!
//! assert!(timer.set_duration("ab:00:00").is_err());
//! assert_eq!(timer.display(), "05:30");
//! ```
//!
//! ## Time and scheduling
//!
//! Ticks and "now" come from the [`schedule::Scheduler`] and
//! [`schedule::TimeSource`] traits. The defaults use the bubbletea runtime and
//! the system clock; tests and simulations can swap in
//! [`schedule::ImmediateScheduler`] and [`schedule::ManualTime`].
//!
//! ## Errors
//!
//! Malformed input is never fatal. It is returned as an [`Error`], passed to
//! the configured [`ErrorReporter`] (a `tracing` warning by default) and shown
//! inline below the controls.

pub mod clock;
pub mod countdown;
pub mod digits;
pub mod error;
pub mod key;
pub mod schedule;
pub mod timeinput;

use bubbletea_rs::Cmd;

/// Core trait for components that take keyboard focus.
///
/// A focused component receives key presses and shows its active state; a
/// blurred one ignores keys. Ticks keep flowing either way, so a blurred
/// countdown still counts down.
///
/// ```rust
/// use countdown_widget::prelude::*;
///
/// let mut timer = countdown_new(&[]);
/// assert!(!timer.focused());
///
/// timer.focus();
/// assert!(timer.focused());
///
/// timer.blur();
/// assert!(!timer.focused());
/// ```
pub trait Component {
    /// Sets the component to focused state. May return a command to run.
    fn focus(&mut self) -> Option<Cmd>;

    /// Sets the component to blurred state.
    fn blur(&mut self);

    /// Returns the current focus state.
    fn focused(&self) -> bool;
}

pub use clock::{format_clock, parse_clock, parse_target, Clock};
pub use countdown::{
    new as countdown_new, Attribute, Control, ControlMsg, CountdownOption, EndedMsg,
    KeyMap as CountdownKeyMap, Model as Countdown, Styles as CountdownStyles,
    TickMsg as CountdownTickMsg,
};
pub use error::{Error, ErrorReporter, TracingReporter};
pub use key::{new_binding, with_disabled, with_help, with_keys, with_keys_str, Binding, KeyMap};
pub use schedule::{ImmediateScheduler, ManualTime, Scheduler, TeaScheduler, TimeSource, UtcNow};
pub use timeinput::Model as TimeInput;

/// Prelude module for convenient imports.
///
/// ```rust
/// use countdown_widget::prelude::*;
///
/// let timer = countdown_new(&[with_seconds(90), with_big_digits(false)]);
/// assert_eq!(timer.display(), "01:30");
/// ```
pub mod prelude {
    pub use crate::clock::{format_clock, parse_clock};
    pub use crate::countdown::{
        new as countdown_new, with_big_digits, with_error_reporter, with_interval, with_key_map,
        with_repeating_completion, with_scheduler, with_seconds, with_styles, with_target,
        with_time_source, Attribute, Control, ControlMsg, CountdownOption, EndedMsg,
        KeyMap as CountdownKeyMap, Model as Countdown, Styles as CountdownStyles,
        TickMsg as CountdownTickMsg,
    };
    pub use crate::error::{Error, ErrorReporter};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::schedule::{ImmediateScheduler, ManualTime, Scheduler, TimeSource};
    pub use crate::timeinput::Model as TimeInput;
    pub use crate::Component;
}
