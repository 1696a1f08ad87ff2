//! Interactive prompt seam.
//!
//! The session talks to the terminal only through [`Prompter`], so tests can
//! script the user's answers.

use std::io;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::CommitError;

/// User interaction used by the refinement session.
///
/// Every method returns [`CommitError::Cancelled`] when the user interrupts.
pub trait Prompter {
    /// Pick one of `items`, returning its index.
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize, CommitError>;

    /// Free text, pre-filled with `initial`.
    fn input(&mut self, prompt: &str, initial: &str) -> Result<String, CommitError>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CommitError>;

    /// Show a line of information.
    fn note(&mut self, message: &str);
}

/// Terminal prompts rendered with dialoguer.
#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for DialoguerPrompter {
    fn select(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize, CommitError> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .max_length(15)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or(CommitError::Cancelled)
    }

    fn input(&mut self, prompt: &str, initial: &str) -> Result<String, CommitError> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, CommitError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)?
            .ok_or(CommitError::Cancelled)
    }

    fn note(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Ctrl-C inside a prompt surfaces as an interrupted read.
fn prompt_error(err: dialoguer::Error) -> CommitError {
    let dialoguer::Error::IO(io_err) = err;
    if io_err.kind() == io::ErrorKind::Interrupted {
        CommitError::Cancelled
    } else {
        CommitError::Prompt(io_err)
    }
}
