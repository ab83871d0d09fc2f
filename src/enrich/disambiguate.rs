//! Operator disambiguation for records the vendor database does not know.
//!
//! The resolver only sees the `Disambiguator` trait. The terminal prompt lives
//! in `cli::prompt`; headless runs use `BatchPolicy`, and tests use `Scripted`.

use std::collections::VecDeque;

use crate::catalog::DefaultMaterial;
use crate::error::AppError;

/// What the resolver asks about one unknown brand/material pair.
#[derive(Debug, Clone)]
pub struct Question<'a> {
    pub brand: &'a str,
    pub material: &'a str,
    /// Material defaults in display order, numbered from 1.
    pub candidates: &'a [DefaultMaterial],
    /// Vendors currently in the database, for the operator's reference.
    pub known_vendors: &'a [String],
    /// False once the vendor data has been reloaded for this record.
    pub allow_reload: bool,
}

/// The answer to a `Question`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Reload the vendor data and look the record up again.
    Reload,
    /// Abort the remaining batch.
    Stop,
    /// Use candidate number `n` (1-based, as displayed).
    Choose(usize),
    /// Apply the material-type default without an explicit choice.
    Fallback,
}

pub trait Disambiguator {
    fn ask(&mut self, question: &Question<'_>) -> Result<Decision, AppError>;
}

/// Parse one line of operator input: `r`, `s`, or a candidate number.
///
/// Returns `None` for anything else, including `r` when reload is not allowed.
pub fn parse_decision(input: &str, candidates: usize, allow_reload: bool) -> Option<Decision> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("r") {
        return allow_reload.then_some(Decision::Reload);
    }
    if input.eq_ignore_ascii_case("s") {
        return Some(Decision::Stop);
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=candidates).contains(&n) => Some(Decision::Choose(n)),
        _ => None,
    }
}

/// Non-interactive policy: always apply the material default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchPolicy;

impl Disambiguator for BatchPolicy {
    fn ask(&mut self, _question: &Question<'_>) -> Result<Decision, AppError> {
        Ok(Decision::Fallback)
    }
}

/// Answers from a fixed script, then `Fallback` once the script runs out.
///
/// Records how many questions were asked and whether reload was offered each time.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    answers: VecDeque<Decision>,
    offered_reload: Vec<bool>,
}

impl Scripted {
    pub fn new(answers: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            offered_reload: Vec::new(),
        }
    }

    pub fn asked(&self) -> usize {
        self.offered_reload.len()
    }

    pub fn offered_reload(&self) -> &[bool] {
        &self.offered_reload
    }
}

impl Disambiguator for Scripted {
    fn ask(&mut self, question: &Question<'_>) -> Result<Decision, AppError> {
        self.offered_reload.push(question.allow_reload);
        Ok(self.answers.pop_front().unwrap_or(Decision::Fallback))
    }
}
