use std::{collections::HashMap, fmt::Display};

use chrono::{DateTime, Local};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::llm::completion;

/// Per-task transcripts, keyed by task.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AgentShortMemory(pub DashMap<String, AgentConversation>);

impl AgentShortMemory {
    pub fn new() -> Self {
        Self(DashMap::new())
    }

    pub fn add(
        &self,
        task: impl Into<String>,
        conversation_owner: impl Into<String>,
        role: Role,
        message: impl Into<String>,
    ) {
        let mut conversation = self
            .0
            .entry(task.into())
            .or_insert_with(|| AgentConversation::new(conversation_owner.into()));
        conversation.add(role, message.into());
    }

    pub fn get(&self, task: &str) -> Option<AgentConversation> {
        self.0.get(task).map(|conversation| conversation.clone())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentConversation {
    agent_name: String,
    pub history: Vec<Message>,
}

impl AgentConversation {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            history: Vec::new(),
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    /// Add a message to the conversation history.
    pub fn add(&mut self, role: Role, message: impl Into<String>) {
        self.history.push(Message {
            role,
            content: Content::Text(message.into()),
            timestamp: Local::now(),
        });
    }

    pub fn last(&self) -> Option<&Message> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Search for a message in the conversation history.
    pub fn search(&self, keyword: &str) -> Vec<&Message> {
        self.history
            .iter()
            .filter(|message| message.content.to_string().contains(keyword))
            .collect()
    }

    /// Count the number of messages by role
    pub fn count_messages_by_role(&self) -> HashMap<String, usize> {
        let mut count = HashMap::new();
        for message in &self.history {
            *count.entry(message.role.to_string()).or_insert(0) += 1;
        }
        count
    }

    /// The history as seen by `speaker`: its own messages become assistant
    /// messages, everybody else's become user messages.
    pub fn history_for(&self, speaker: &str) -> Vec<completion::Message> {
        self.history
            .iter()
            .map(|message| {
                let content = message.content.to_string();
                if message.role.name() == speaker {
                    completion::Message::assistant(content)
                } else {
                    completion::Message::user(content)
                }
            })
            .collect()
    }
}

impl Display for AgentConversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for message in &self.history {
            writeln!(f, "{}: {}", message.role, message.content)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Content,
    pub timestamp: DateTime<Local>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User(String),
    Assistant(String),
}

impl Role {
    pub fn name(&self) -> &str {
        match self {
            Role::User(name) | Role::Assistant(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    Text(String),
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User(name) => write!(f, "{}(User)", name),
            Role::Assistant(name) => write!(f, "{}(Assistant)", name),
        }
    }
}

impl Display for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Text(text) => f.pad(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> AgentConversation {
        let mut conversation = AgentConversation::new("assistant");
        conversation.add(Role::User("user_proxy".to_owned()), "Tips for Iceland?");
        conversation.add(
            Role::Assistant("assistant".to_owned()),
            "Book early, fly midweek.",
        );
        conversation.add(Role::User("user_proxy".to_owned()), "Thanks!");
        conversation
    }

    #[test]
    fn test_display() {
        let rendered = conversation().to_string();
        assert_eq!(
            rendered,
            "user_proxy(User): Tips for Iceland?\n\
             assistant(Assistant): Book early, fly midweek.\n\
             user_proxy(User): Thanks!\n"
        );
    }

    #[test]
    fn test_search_and_count() {
        let conversation = conversation();
        assert_eq!(conversation.search("midweek").len(), 1);
        assert!(conversation.search("Reykjavik").is_empty());

        let count = conversation.count_messages_by_role();
        assert_eq!(count["user_proxy(User)"], 2);
        assert_eq!(count["assistant(Assistant)"], 1);
    }

    #[test]
    fn test_history_for_maps_perspective() {
        let conversation = conversation();

        let assistant_view = conversation.history_for("assistant");
        assert_eq!(assistant_view[0].role, completion::Role::User);
        assert_eq!(assistant_view[1].role, completion::Role::Assistant);

        let proxy_view = conversation.history_for("user_proxy");
        assert_eq!(proxy_view[0].role, completion::Role::Assistant);
        assert_eq!(proxy_view[1].role, completion::Role::User);
        assert_eq!(proxy_view[2].content, "Thanks!");
    }

    #[test]
    fn test_short_memory_groups_by_task() {
        let memory = AgentShortMemory::new();
        memory.add("task-1", "Planner", Role::User("User".to_owned()), "plan it");
        memory.add(
            "task-1",
            "Planner",
            Role::Assistant("Planner".to_owned()),
            "planned",
        );
        memory.add("task-2", "Writer", Role::User("User".to_owned()), "write it");

        assert_eq!(memory.len(), 2);
        let first = memory.get("task-1").unwrap();
        assert_eq!(first.agent_name(), "Planner");
        assert_eq!(first.len(), 2);
        assert!(memory.get("task-3").is_none());
    }
}
