//! Scripted model that replays canned completions in order.

use super::ChatModel;
use crate::error::{MathGptError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    stops: Mutex<Vec<Vec<String>>>,
}

impl ScriptedModel {
    pub(crate) fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub(crate) fn with_results<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt the model has been asked to complete.
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn stops(&self) -> Vec<Vec<String>> {
        self.stops.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.stops.lock().unwrap().push(stop.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(MathGptError::Model("script exhausted".to_string())))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
