//! Resolution session state - the single sticky answer shared by every
//! conflict and removal prompt of one run.
//!
//! Only `All` makes an answer stick; plain `Yes`/`No` apply to the
//! current artifact only. `Quit` short-circuits the remainder of the run
//! with no further writes. Prompting is behind a trait so tests can feed
//! canned answer sequences instead of a terminal.

use anyhow::{Context, Result};
use dialoguer::Input;

/// Answer recorded from the most recent prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Answer {
    #[default]
    Unset,
    Yes,
    No,
    All,
    Quit,
}

/// Per-run prompt state.
#[derive(Debug, Default)]
pub struct Session {
    answer: Answer,
}

impl Session {
    pub fn new(force: bool) -> Self {
        Self {
            answer: if force { Answer::All } else { Answer::Unset },
        }
    }

    /// Whether every remaining conflict/removal resolves silently.
    pub fn all(&self) -> bool {
        self.answer == Answer::All
    }

    pub fn answer(&self) -> Answer {
        self.answer
    }

    pub fn record(&mut self, answer: Answer) {
        self.answer = answer;
    }
}

/// Source of interactive answers.
pub trait Prompter {
    /// Ask a question and return the raw reply line.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Reads replies from the terminal.
pub struct TermPrompter;

impl Prompter for TermPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .context("Failed to read prompt answer")
    }
}

/// Canned answer sequence for tests. Panics when asked more questions
/// than it has answers for, which is itself a useful assertion.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| (*a).to_string()).collect(),
        }
    }

    pub fn exhausted(&self) -> bool {
        self.answers.is_empty()
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        Ok(self
            .answers
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {prompt}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_seeds_all() {
        assert!(Session::new(true).all());
        assert!(!Session::new(false).all());
    }

    #[test]
    fn only_all_sticks() {
        let mut session = Session::new(false);
        session.record(Answer::Yes);
        assert!(!session.all());
        session.record(Answer::No);
        assert!(!session.all());
        session.record(Answer::All);
        assert!(session.all());
    }

    #[test]
    fn scripted_prompter_replays_in_order() {
        let mut prompter = ScriptedPrompter::new(&["y", "n"]);
        assert_eq!(prompter.ask("q1").unwrap(), "y");
        assert_eq!(prompter.ask("q2").unwrap(), "n");
        assert!(prompter.exhausted());
    }
}
