//! Interactive prompts.

use std::io;

use console::Term;
use dialoguer::Confirm;

use crate::error::{BasecampError, Result};
use crate::packages::Confirmer;

/// Asks yes/no questions on the terminal.
///
/// The default answer is "no". If the prompt cannot be shown (closed
/// stdin, terminal gone) the answer is "no" as well. Ctrl-C ends the run.
pub struct TerminalConfirmer {
    term: Term,
}

impl TerminalConfirmer {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Default for TerminalConfirmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact_on(&self.term);
        if answer.is_err() {
            let _ = self.term.show_cursor();
        }
        interpret_answer(answer)
    }
}

/// Map a dialoguer result to an answer.
fn interpret_answer(answer: std::result::Result<bool, dialoguer::Error>) -> Result<bool> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(e) => {
            let e: io::Error = e.into();
            if e.kind() == io::ErrorKind::Interrupted {
                return Err(BasecampError::Interrupted);
            }
            tracing::debug!("Prompt failed, treating as no: {}", e);
            Ok(false)
        }
    }
}
