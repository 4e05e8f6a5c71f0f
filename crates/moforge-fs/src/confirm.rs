use std::io::{self, BufRead, Write};

use moforge_core::project::Confirm;

/// Interactive `[y/N]` prompt on stderr; anything but y/yes is "no",
/// including EOF and read errors.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        eprint!("{} [y/N] ", question);
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => parse_answer(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation; treating as no");
                false
            }
        }
    }
}

fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
