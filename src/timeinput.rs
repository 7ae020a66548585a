//! Time-of-day input for setting the countdown duration.
//!
//! A single-line text field that starts out as `00:00:00`. It accepts any
//! character so that malformed values reach the parser and can be reported,
//! rather than being silently swallowed while typing.

use crate::key::{new_binding, with_keys_str, Binding};
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;

/// Value the input starts with and returns to on [`Model::reset`].
pub const DEFAULT_VALUE: &str = "00:00:00";

/// Key bindings for editing inside the input.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Move the cursor one character right.
    pub character_forward: Binding,
    /// Move the cursor one character left.
    pub character_backward: Binding,
    /// Delete the character before the cursor.
    pub delete_character_backward: Binding,
    /// Delete the character under the cursor.
    pub delete_character_forward: Binding,
    /// Jump to the start of the value.
    pub line_start: Binding,
    /// Jump to the end of the value.
    pub line_end: Binding,
    /// Clear the whole value.
    pub clear: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            character_forward: new_binding(vec![with_keys_str(&["right", "ctrl+f"])]),
            character_backward: new_binding(vec![with_keys_str(&["left", "ctrl+b"])]),
            delete_character_backward: new_binding(vec![with_keys_str(&["backspace", "ctrl+h"])]),
            delete_character_forward: new_binding(vec![with_keys_str(&["delete", "ctrl+d"])]),
            line_start: new_binding(vec![with_keys_str(&["home", "ctrl+a"])]),
            line_end: new_binding(vec![with_keys_str(&["end", "ctrl+e"])]),
            clear: new_binding(vec![with_keys_str(&["ctrl+u"])]),
        }
    }
}

enum Edit {
    Forward,
    Backward,
    DeleteBackward,
    DeleteForward,
    Start,
    End,
    Clear,
    Insert(char),
}

/// The time input model.
#[derive(Debug, Clone)]
pub struct Model {
    /// Text shown before the value.
    pub prompt: String,
    /// Shown while the value is empty.
    pub placeholder: String,
    /// Style of the prompt.
    pub prompt_style: Style,
    /// Style of the value.
    pub text_style: Style,
    /// Style of the placeholder.
    pub placeholder_style: Style,
    /// Style of the character under the cursor.
    pub cursor_style: Style,
    /// Editing keys.
    pub key_map: KeyMap,

    value: Vec<char>,
    pos: usize,
    char_limit: usize,
    focus: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            prompt: "⏱ ".to_string(),
            placeholder: "HH:MM:SS".to_string(),
            prompt_style: Style::new(),
            text_style: Style::new(),
            placeholder_style: Style::new().foreground(Color::from("240")),
            cursor_style: Style::new().reverse(true),
            key_map: KeyMap::default(),
            value: DEFAULT_VALUE.chars().collect(),
            pos: DEFAULT_VALUE.len(),
            char_limit: DEFAULT_VALUE.len(),
            focus: false,
        }
    }
}

/// Creates a time input holding [`DEFAULT_VALUE`].
pub fn new() -> Model {
    Model::default()
}

impl Model {
    /// The current text.
    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    /// Replaces the text, truncating it to the character limit and moving
    /// the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.chars().take(self.char_limit).collect();
        self.pos = self.value.len();
    }

    /// Restores [`DEFAULT_VALUE`].
    pub fn reset(&mut self) {
        self.set_value(DEFAULT_VALUE);
    }

    /// Cursor position in characters.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor, clamped to the value.
    pub fn set_cursor(&mut self, pos: usize) {
        self.pos = pos.min(self.value.len());
    }

    /// Maximum number of characters; zero means unlimited.
    pub fn set_char_limit(&mut self, limit: usize) {
        self.char_limit = if limit == 0 { usize::MAX } else { limit };
        self.value.truncate(self.char_limit);
        self.set_cursor(self.pos);
    }

    fn insert(&mut self, c: char) {
        if self.value.len() >= self.char_limit {
            return;
        }
        self.value.insert(self.pos, c);
        self.pos += 1;
    }

    /// Handles editing keys while focused. Returns `true` when the key was
    /// consumed by the input.
    pub fn update(&mut self, msg: &Msg) -> bool {
        if !self.focus {
            return false;
        }
        let Some(key_msg) = msg.downcast_ref::<KeyMsg>() else {
            return false;
        };

        let km = &self.key_map;
        let edit = if km.character_forward.matches(key_msg) {
            Edit::Forward
        } else if km.character_backward.matches(key_msg) {
            Edit::Backward
        } else if km.delete_character_backward.matches(key_msg) {
            Edit::DeleteBackward
        } else if km.delete_character_forward.matches(key_msg) {
            Edit::DeleteForward
        } else if km.line_start.matches(key_msg) {
            Edit::Start
        } else if km.line_end.matches(key_msg) {
            Edit::End
        } else if km.clear.matches(key_msg) {
            Edit::Clear
        } else if let KeyCode::Char(c) = key_msg.key {
            if key_msg
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                return false;
            }
            Edit::Insert(c)
        } else {
            return false;
        };

        match edit {
            Edit::Forward => self.set_cursor(self.pos + 1),
            Edit::Backward => self.pos = self.pos.saturating_sub(1),
            Edit::DeleteBackward => {
                if self.pos > 0 {
                    self.value.remove(self.pos - 1);
                    self.pos -= 1;
                }
            }
            Edit::DeleteForward => {
                if self.pos < self.value.len() {
                    self.value.remove(self.pos);
                }
            }
            Edit::Start => self.pos = 0,
            Edit::End => self.pos = self.value.len(),
            Edit::Clear => {
                self.value.clear();
                self.pos = 0;
            }
            Edit::Insert(c) => self.insert(c),
        }
        true
    }

    /// Renders the prompt, the value and, while focused, the cursor.
    pub fn view(&self) -> String {
        let prompt = self.prompt_style.render(&self.prompt);

        if self.value.is_empty() {
            let placeholder = self.placeholder_style.render(&self.placeholder);
            if self.focus {
                return format!("{}{}{}", prompt, self.cursor_style.render(" "), placeholder);
            }
            return format!("{}{}", prompt, placeholder);
        }

        if !self.focus {
            return format!("{}{}", prompt, self.text_style.render(&self.value()));
        }

        let before: String = self.value[..self.pos].iter().collect();
        let (under, after): (String, String) = match self.value.get(self.pos) {
            Some(c) => (c.to_string(), self.value[self.pos + 1..].iter().collect()),
            None => (" ".to_string(), String::new()),
        };
        format!(
            "{}{}{}{}",
            prompt,
            self.text_style.render(&before),
            self.cursor_style.render(&under),
            self.text_style.render(&after)
        )
    }
}

impl Component for Model {
    fn focus(&mut self) -> Option<Cmd> {
        self.focus = true;
        self.pos = self.value.len();
        None
    }

    fn blur(&mut self) {
        self.focus = false;
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
