use crate::models::{ChatRequest, ChatResponse};
use crate::ChatModel;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every request it receives.
///
/// Requests whose model name has a dedicated queue (see [`ScriptedChatModel::with_model_queue`])
/// are answered from that queue; all others from the default queue. Running out of responses
/// is an error, so a runaway loop surfaces instead of hanging.
#[derive(Default)]
pub struct ScriptedChatModel {
    responses: Mutex<VecDeque<ChatResponse>>,
    model_queues: Mutex<Vec<(String, VecDeque<ChatResponse>)>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedChatModel {
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Self::default()
        }
    }

    pub fn with_model_queue(self, model: &str, responses: Vec<ChatResponse>) -> Self {
        self.model_queues
            .lock()
            .expect("model queue lock poisoned")
            .push((model.to_string(), responses.into()));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    pub fn requests_for(&self, model: &str) -> Vec<ChatRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.model == model)
            .collect()
    }

    fn next_response(&self, model: &str) -> Option<ChatResponse> {
        let mut queues = self.model_queues.lock().expect("model queue lock poisoned");
        if let Some((_, queue)) = queues.iter_mut().find(|(name, _)| name == model) {
            return queue.pop_front();
        }
        drop(queues);
        self.responses
            .lock()
            .expect("response queue poisoned")
            .pop_front()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let model = request.model.clone();
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request);
        self.next_response(&model)
            .ok_or_else(|| anyhow::anyhow!("No scripted response left for model '{}'", model))
    }
}
