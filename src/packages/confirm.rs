//! Yes/no decisions about upgrades.
//!
//! The reconciler never reads stdin itself. It asks a [`Confirmer`], which
//! may be a terminal prompt (see `ui::prompts::TerminalConfirmer`), a fixed
//! answer from policy or headless mode, or a recorder in tests.

use crate::error::Result;

/// Answers a yes/no question.
pub trait Confirmer {
    /// `Ok(true)` means "yes". An error ends the run.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedConfirmer(pub bool);

impl Confirmer for FixedConfirmer {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        tracing::debug!("Auto-answering {:?} with {}", question, self.0);
        Ok(self.0)
    }
}

/// Gives a fixed answer and remembers every question asked.
#[derive(Debug, Clone, Default)]
pub struct RecordingConfirmer {
    answer: bool,
    questions: Vec<String>,
}

impl RecordingConfirmer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            questions: Vec::new(),
        }
    }

    /// Questions asked so far.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// Whether any question was asked.
    pub fn was_asked(&self) -> bool {
        !self.questions.is_empty()
    }
}

impl Confirmer for RecordingConfirmer {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        Ok(self.answer)
    }
}
