//! Scripted [`LlmClient`] for tests: replies are dequeued in order and every
//! request is recorded.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::{non_empty, CallKind, CompletionRequest, LlmClient, LlmError};

#[derive(Debug, Default)]
pub struct ScriptedLlm {
    replies: RefCell<VecDeque<Result<String, LlmError>>>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply. Blank text behaves like a real backend's empty reply.
    pub fn respond(self, text: impl Into<String>) -> Self {
        self.replies.borrow_mut().push_back(Ok(text.into()));
        self
    }

    pub fn fail(self, error: LlmError) -> Self {
        self.replies.borrow_mut().push_back(Err(error));
        self
    }

    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies.borrow_mut().push_back(Ok(text.into()));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }

    pub fn calls_of(&self, kind: CallKind) -> usize {
        self.requests.borrow().iter().filter(|r| r.kind == kind).count()
    }

    pub fn remaining(&self) -> usize {
        self.replies.borrow().len()
    }
}

impl LlmClient for ScriptedLlm {
    fn model(&self) -> &str {
        "scripted"
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Ok(text)) => non_empty(&text),
            Some(Err(e)) => Err(e),
            None => Err(LlmError::Client(format!(
                "scripted client has no reply left for a {} call",
                request.kind
            ))),
        }
    }
}
