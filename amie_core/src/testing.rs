//! A deterministic oracle for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{ChatMessage, LLMProvider, LLMResponse};

/// Replays queued replies in order and records every request it receives.
///
/// A queued `Err` simulates a call that failed after retries. Once the queue
/// is empty every further call fails.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Ok(reply.into()));
        }
    }

    /// Queue a failed call.
    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(Err(reason.into()));
        }
    }

    /// Number of `chat` calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests.lock().map_or(0, |r| r.len())
    }

    /// Every request received, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat(&self, messages: &[ChatMessage], _model: &str) -> anyhow::Result<LLMResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(messages.to_vec());
        }
        let next = self
            .replies
            .lock()
            .map_err(|_| anyhow::anyhow!("scripted provider poisoned"))?
            .pop_front();
        match next {
            Some(Ok(content)) => Ok(LLMResponse {
                content,
                usage: None,
            }),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Err(anyhow::anyhow!("scripted provider has no reply left")),
        }
    }

    fn get_default_model(&self) -> &'static str {
        "scripted"
    }
}
