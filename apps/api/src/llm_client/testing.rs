//! Scripted `LanguageModel` for unit tests. Replies are chosen by the first
//! rule whose marker appears in the prompt.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{LanguageModel, LlmError, ModelRequest, ModelResponse, Source};

#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(u16),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Reply::Text(value.to_string())
    }
}

struct Rule {
    marker: String,
    delay: Duration,
    // The last reply repeats once the queue is down to one.
    replies: Mutex<VecDeque<Reply>>,
    sources: Vec<Source>,
}

#[derive(Default)]
pub struct ScriptedModel {
    rules: Vec<Rule>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, marker: &str, reply: Reply) -> Self {
        self.on_sequence(marker, vec![reply])
    }

    pub fn on_sequence(mut self, marker: &str, replies: Vec<Reply>) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            delay: Duration::ZERO,
            replies: Mutex::new(replies.into()),
            sources: Vec::new(),
        });
        self
    }

    pub fn on_delayed(mut self, marker: &str, delay: Duration, reply: Reply) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            delay,
            replies: Mutex::new(vec![reply].into()),
            sources: Vec::new(),
        });
        self
    }

    pub fn on_with_sources(mut self, marker: &str, reply: Reply, sources: Vec<Source>) -> Self {
        self.rules.push(Rule {
            marker: marker.to_string(),
            delay: Duration::ZERO,
            replies: Mutex::new(vec![reply].into()),
            sources,
        });
        self
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count_matching(&self, marker: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.prompt.contains(marker))
            .count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        let Some(rule) = self
            .rules
            .iter()
            .find(|rule| request.prompt.contains(&rule.marker))
        else {
            return Err(LlmError::Api {
                status: 500,
                message: "no scripted reply".to_string(),
            });
        };

        if !rule.delay.is_zero() {
            tokio::time::sleep(rule.delay).await;
        }

        let reply = {
            let mut queue = rule.replies.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        };

        match reply {
            Some(Reply::Text(text)) => Ok(ModelResponse {
                text,
                sources: rule.sources.clone(),
            }),
            Some(Reply::Fail(status)) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}
