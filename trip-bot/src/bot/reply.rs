//! Rendering directives handed to the transport layer.

use serde::Serialize;

use super::Command;

/// A button with the token it sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub label: String,
    pub command: String,
}

impl Button {
    pub fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            command: command.encode(),
        }
    }
}

/// Rows of buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// How the transport should show a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyMode {
    /// Post a new message.
    Send,
    /// Replace the message the button was pressed on, falling back to a new
    /// message where editing is not possible.
    Edit,
    /// Short inline acknowledgement (a toast); no message is posted.
    Answer,
}

/// What to show the user next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
    pub mode: ReplyMode,
}

impl Reply {
    pub fn send(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
            mode: ReplyMode::Send,
        }
    }

    pub fn edit(text: impl Into<String>) -> Self {
        Self {
            mode: ReplyMode::Edit,
            ..Self::send(text)
        }
    }

    /// An inline answer that leaves the conversation where it was.
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            mode: ReplyMode::Answer,
            ..Self::send(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn with_mode(mut self, mode: ReplyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Every token on the keyboard, row by row.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.keyboard
            .iter()
            .flatten()
            .map(|b| b.command.as_str())
    }
}
