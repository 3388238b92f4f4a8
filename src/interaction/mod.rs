//! User-interaction collaborator.

pub mod terminal;

use crate::error::InteractionError;

pub use terminal::TerminalInteraction;

/// Answer to a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Yes,
    No,
    /// Replacement text, only offered when the prompt allows it.
    Custom(String),
}

/// Everything the workflow needs from a human.
pub trait Interaction {
    /// Ask a yes/no question. With `allow_custom`, the user may instead type
    /// replacement text.
    fn confirm(&mut self, prompt: &str, allow_custom: bool) -> Result<Reply, InteractionError>;

    fn present_list(&mut self, title: &str, items: &[String]);

    fn present_error(&mut self, message: &str);
}
