use llm::ChatMessage;

/// Message history for a single run. Messages are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A system instruction followed by the user's prompt.
    pub fn from_prompts(system_prompt: &str, user_prompt: &str) -> Self {
        let mut conversation = Self::new();
        conversation.push(ChatMessage::system(system_prompt.to_string()));
        conversation.push(ChatMessage::user(user_prompt.to_string()));
        conversation
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
