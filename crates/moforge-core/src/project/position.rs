use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Task position: `3` addresses serial group 3, `3a` the parallel member `a`
/// of group 3. Ordered by group, then serial before lettered members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub group: u32,
    pub letter: Option<String>,
}

impl Position {
    pub fn serial(group: u32) -> Self {
        Self {
            group,
            letter: None,
        }
    }

    pub fn parallel(group: u32, letter: impl Into<String>) -> Self {
        Self {
            group,
            letter: Some(letter.into()),
        }
    }

    pub fn is_parallel(&self) -> bool {
        self.letter.is_some()
    }

    /// Folder name for a task at this position: `3_name` / `3a_name`.
    pub fn folder_name(&self, task: &str) -> String {
        format!("{}_{}", self, task)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.letter {
            Some(l) => write!(f, "{}{}", self.group, l),
            None => write!(f, "{}", self.group),
        }
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, letters) = s.split_at(split);
        if digits.is_empty() || !letters.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(Error::InvalidPosition(s.to_string()));
        }
        let group: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidPosition(s.to_string()))?;
        if group == 0 {
            return Err(Error::InvalidPosition(s.to_string()));
        }
        Ok(Self {
            group,
            letter: (!letters.is_empty()).then(|| letters.to_string()),
        })
    }
}

/// Letters valid as parallel member keys.
pub fn is_valid_letter(letter: &str) -> bool {
    !letter.is_empty() && letter.chars().all(|c| c.is_ascii_lowercase())
}
