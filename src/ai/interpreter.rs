//! Response Interpreter
//!
//! Turns raw generated text into what the caller asked for.
//!
//! - **Text mode** (enhance, insert-answer): the reply trimmed, nothing else.
//!   The prompts ask the model to keep the writer's meaning, voice, tense and
//!   perspective; that contract lives in the prompt and is not checked here.
//! - **List mode** (questions): JSON array first, then question-mark lines,
//!   then the configured fallback questions. Never fails on a malformed reply.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::constants::interpreter::MAX_QUESTIONS;

/// Leading bullets, numbering and punctuation on an extracted line
static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[-*+•#\d.)(\]\[}{\s]+"#).expect("Failed to compile list marker regex")
});

// =============================================================================
// QuestionList
// =============================================================================

/// Ordered reflection questions, never more than three
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionList(Vec<String>);

impl QuestionList {
    /// Keep generation order, silently dropping anything past the limit
    pub fn new(questions: impl IntoIterator<Item = String>) -> Self {
        Self(questions.into_iter().take(MAX_QUESTIONS).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a QuestionList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// Interpreter
// =============================================================================

/// Which extraction tier produced a question list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionSource {
    JsonArray,
    QuestionLines,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct ResponseInterpreter {
    fallback_questions: Vec<String>,
}

impl ResponseInterpreter {
    pub fn new(fallback_questions: Vec<String>) -> Self {
        Self { fallback_questions }
    }

    /// Text mode: trimmed reply, returned even when empty
    pub fn text(&self, raw: &str) -> String {
        raw.trim().to_string()
    }

    /// List mode: never fails, degrades to the fallback questions
    pub fn questions(&self, raw: &str) -> QuestionList {
        self.questions_with_source(raw).0
    }

    pub fn questions_with_source(&self, raw: &str) -> (QuestionList, QuestionSource) {
        if let Some(parsed) = parse_question_array(raw) {
            debug!(count = parsed.len(), "Parsed questions from JSON array");
            return (QuestionList::new(parsed), QuestionSource::JsonArray);
        }

        let lines = extract_question_lines(raw);
        if !lines.is_empty() {
            debug!(count = lines.len(), "Extracted questions from reply lines");
            return (QuestionList::new(lines), QuestionSource::QuestionLines);
        }

        debug!("No questions found in reply, using fallback questions");
        (
            QuestionList::new(self.fallback_questions.iter().cloned()),
            QuestionSource::Fallback,
        )
    }
}

/// Remove every markdown code fence marker
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

/// Tier 1: the whole (unfenced) reply is a JSON array of strings
fn parse_question_array(raw: &str) -> Option<Vec<String>> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str::<Vec<String>>(cleaned.trim()).ok()
}

/// Tier 2: lines containing a question mark, list markers stripped
fn extract_question_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .filter(|line| line.contains('?'))
        .map(clean_question_line)
        .filter(|line| !line.is_empty())
        .take(MAX_QUESTIONS)
        .collect()
}

fn clean_question_line(line: &str) -> String {
    let line = LIST_MARKER_REGEX.replace(line.trim(), "");
    line.trim()
        .trim_end_matches(',')
        .trim_matches('"')
        .trim()
        .to_string()
}
