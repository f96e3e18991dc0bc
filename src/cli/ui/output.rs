use console::style;

use crate::ai::QuestionList;

/// Status lines go to stderr; generated text and questions go to stdout
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", style("ℹ").blue(), message);
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// Generated entry text, printed as-is
    pub fn text(&self, body: &str) {
        println!("{}", body);
    }

    pub fn questions(&self, questions: &QuestionList) {
        for (i, question) in questions.iter().enumerate() {
            println!("{} {}", style(format!("{}.", i + 1)).cyan(), question);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
