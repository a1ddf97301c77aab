// Capabilities the task list depends on but does not implement itself:
// asking the user a yes/no question, and signalling a completion toggle.
use std::io::{self, Write};

use tracing::debug;

use crate::app::models::Task;

// The questions asked before a destructive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    DeleteTask { title: String },
    DeleteAll,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::DeleteTask { .. } => "Delete task",
            Prompt::DeleteAll => "Delete everything",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Prompt::DeleteTask { title } => format!("Delete \"{title}\"?"),
            Prompt::DeleteAll => "Remove ALL tasks? This cannot be undone.".to_string(),
        }
    }
}

pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

// A decision that was already taken, e.g. read from a dialog key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer(pub bool);

impl Confirm for Answer {
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        debug!(prompt = %prompt.message(), answer = self.0, "confirmation answered");
        self.0
    }
}

pub trait Feedback {
    fn task_toggled(&mut self, task: &Task);
}

#[cfg(test)]
pub struct NoFeedback;

#[cfg(test)]
impl Feedback for NoFeedback {
    fn task_toggled(&mut self, _task: &Task) {}
}

// Rings the terminal bell
pub struct TerminalBell;

impl Feedback for TerminalBell {
    fn task_toggled(&mut self, task: &Task) {
        let mut stdout = io::stdout();
        if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            debug!(id = task.id, error = %e, "bell failed");
        }
    }
}
