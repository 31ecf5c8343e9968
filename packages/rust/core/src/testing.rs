//! Test double for [`TextGenerator`].

use std::collections::VecDeque;
use std::sync::Mutex;

use articlepress_shared::{ArticlePressError, Result};

use crate::llm::{ChatRequest, TextGenerator};

/// Replies with pre-scripted results in order and records every request.
pub(crate) struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedGenerator {
    pub(crate) fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ArticlePressError::Llm("no scripted reply left".into())))
    }
}
