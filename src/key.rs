//! Key bindings for the countdown controls.
//!
//! A [`Binding`] groups the key presses that trigger one action together with
//! the help text shown for it. Bindings are built from option functions:
//!
//! ```rust
//! use countdown_widget::key::{new_binding, with_help, with_keys_str};
//!
//! let start = new_binding(vec![with_keys_str(&["s", "f5"]), with_help("s", "start")]);
//! assert_eq!(start.help().key, "s");
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus the modifiers held with it.
pub type KeyPress = (KeyCode, KeyModifiers);

/// Help text attached to a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"s"` or `"ctrl+r"`.
    pub key: String,
    /// What the key does.
    pub desc: String,
}

/// A set of key presses bound to one action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

/// Option applied by [`new_binding`].
pub enum BindingOpt {
    /// Replace the key presses.
    Keys(Vec<KeyPress>),
    /// Replace the help text.
    Help(Help),
    /// Start disabled.
    Disabled,
}

/// Creates a binding from a list of options.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        match opt {
            BindingOpt::Keys(keys) => binding.keys = keys,
            BindingOpt::Help(help) => binding.help = help,
            BindingOpt::Disabled => binding.disabled = true,
        }
    }
    binding
}

/// Binds the given key names. Unknown names are skipped.
pub fn with_keys_str(keys: &[&str]) -> BindingOpt {
    BindingOpt::Keys(keys.iter().filter_map(|k| parse_key(k)).collect())
}

/// Binds the given key presses.
pub fn with_keys(keys: Vec<KeyPress>) -> BindingOpt {
    BindingOpt::Keys(keys)
}

/// Sets the help text.
pub fn with_help(key: &str, desc: &str) -> BindingOpt {
    BindingOpt::Help(Help {
        key: key.to_string(),
        desc: desc.to_string(),
    })
}

/// Creates the binding disabled.
pub fn with_disabled() -> BindingOpt {
    BindingOpt::Disabled
}

impl Binding {
    /// Reports whether the key message triggers this binding.
    ///
    /// Disabled bindings never match. For character keys and back-tab the
    /// shift modifier is ignored because the key code already implies it.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if self.disabled {
            return false;
        }
        self.keys.iter().any(|(code, mods)| {
            if *code != msg.key {
                return false;
            }
            match code {
                KeyCode::Char(_) | KeyCode::BackTab => {
                    msg.modifiers.difference(KeyModifiers::SHIFT) == mods.difference(KeyModifiers::SHIFT)
                }
                _ => msg.modifiers == *mods,
            }
        })
    }

    /// Whether the binding is active.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// The help text for this binding.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// The bound key presses.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }
}

/// Reports whether `msg` triggers any of the given bindings.
pub fn matches(msg: &KeyMsg, bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.matches(msg))
}

/// Components that expose their bindings for help rendering.
pub trait KeyMap {
    /// Bindings for the compact one-line help.
    fn short_help(&self) -> Vec<&Binding>;
    /// Bindings grouped into columns for the expanded help.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

// "ctrl+r", "alt+left", "enter", "s", " "
fn parse_key(s: &str) -> Option<KeyPress> {
    if s == " " {
        return Some((KeyCode::Char(' '), KeyModifiers::NONE));
    }

    let mut mods = KeyModifiers::NONE;
    let mut parts: Vec<&str> = s.split('+').collect();
    let name = parts.pop()?;
    for m in parts {
        match m {
            "ctrl" => mods |= KeyModifiers::CONTROL,
            "alt" => mods |= KeyModifiers::ALT,
            "shift" => mods |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }

    let code = match name {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        _ if name.starts_with('f') && name.len() > 1 => KeyCode::F(name[1..].parse().ok()?),
        _ => {
            let mut chars = name.chars();
            let c = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(c)
        }
    };
    Some((code, mods))
}
