/// Yes/no decision point for destructive or structural changes
/// (overwrite, delete, serial → parallel conversion, flatten).
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Answers yes to everything (`--yes`, `MOFORGE_ASSUME_YES=1`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!(question = %question, "auto-confirmed");
        true
    }
}

/// Fixed answer; records the questions it was asked.
#[derive(Debug, Clone, Default)]
pub struct FixedAnswer {
    pub answer: bool,
    pub asked: Vec<String>,
}

impl FixedAnswer {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Vec::new(),
        }
    }
}

impl Confirm for FixedAnswer {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answer
    }
}
