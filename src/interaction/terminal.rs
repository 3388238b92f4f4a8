//! Interactive terminal prompts via dialoguer.

use dialoguer::{Confirm, Input, Select};

use super::{Interaction, Reply};
use crate::error::InteractionError;

const CHOICES: &[&str] = &["Yes", "No", "Write my own"];

#[derive(Debug, Default)]
pub struct TerminalInteraction;

impl TerminalInteraction {
    pub fn new() -> Self {
        Self
    }
}

fn terminal_error(e: dialoguer::Error) -> InteractionError {
    InteractionError::Terminal(e.to_string())
}

impl Interaction for TerminalInteraction {
    fn confirm(&mut self, prompt: &str, allow_custom: bool) -> Result<Reply, InteractionError> {
        println!();
        if !allow_custom {
            let answer = Confirm::new()
                .with_prompt(prompt)
                .default(true)
                .interact_opt()
                .map_err(terminal_error)?
                .ok_or(InteractionError::Cancelled)?;
            return Ok(if answer { Reply::Yes } else { Reply::No });
        }

        let choice = Select::new()
            .with_prompt(prompt)
            .items(CHOICES)
            .default(0)
            .interact_opt()
            .map_err(terminal_error)?
            .ok_or(InteractionError::Cancelled)?;

        match choice {
            0 => Ok(Reply::Yes),
            1 => Ok(Reply::No),
            _ => {
                let text: String = Input::new()
                    .with_prompt("Commit message")
                    .interact_text()
                    .map_err(terminal_error)?;
                Ok(Reply::Custom(text))
            }
        }
    }

    fn present_list(&mut self, title: &str, items: &[String]) {
        println!();
        println!("{}:", title);
        for item in items {
            println!("  {}", item);
        }
    }

    fn present_error(&mut self, message: &str) {
        eprintln!("  [FAIL] {}", message);
    }
}
