//! Scripted transport for unit tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{GenerationRequest, GenerationTransport};
use crate::types::{ReverieError, Result};

/// Replays scripted outcomes in order and records every request it sees.
/// Once the script runs out, every call returns `default_reply`.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<String>>>,
    default_reply: String,
    requests: Mutex<Vec<GenerationRequest>>,
    attempts: AtomicUsize,
}

impl MockTransport {
    pub fn replying(text: &str) -> Self {
        Self::scripted(Vec::new(), text)
    }

    pub fn scripted(script: Vec<Result<String>>, default_reply: &str) -> Self {
        Self {
            script: Mutex::new(script.into()),
            default_reply: default_reply.to_string(),
            requests: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.prompt.clone())
    }
}

#[async_trait]
impl GenerationTransport for MockTransport {
    async fn send(&self, request: &GenerationRequest) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(outcome) => outcome,
            None => Ok(self.default_reply.clone()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

/// Shorthand for a scripted timeout
pub fn timeout_err() -> Result<String> {
    Err(ReverieError::timeout(std::time::Duration::from_secs(30)))
}
