use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    llm::{
        CompletionError, Model,
        completion::Message,
        request::{CompletionRequest, GenerationConfig},
    },
    task::Task,
};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent's role must be set.")]
    EmptyRole,
    #[error("Completion error: {0}")]
    CompletionError(#[from] CompletionError),
}

/// A configured persona that tasks are delegated to.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    id: Uuid,
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    verbose: bool,
}

impl Agent {
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn backstory(&self) -> &str {
        &self.backstory
    }

    pub fn allow_delegation(&self) -> bool {
        self.allow_delegation
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Persona preamble sent as the system prompt of every task this agent runs.
    pub fn system_prompt(&self, coworkers: &[&Agent]) -> String {
        let mut prompt = format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role,
            self.backstory.trim(),
            self.goal
        );

        if self.allow_delegation && !coworkers.is_empty() {
            let roles = coworkers
                .iter()
                .map(|coworker| coworker.role())
                .collect::<Vec<_>>()
                .join(", ");
            prompt.push_str(&format!(
                "\nYou can delegate work to or ask questions of these coworkers: {roles}"
            ));
        }

        prompt
    }

    pub fn task_prompt(&self, task: &Task) -> String {
        format!(
            "Current Task: {}\n\n\
             This is the expected criteria for your final answer: {}\n\
             You MUST return the actual complete content as the final answer, not a summary.",
            task.description().trim(),
            task.expected_output().trim()
        )
    }

    /// Run one task through the model. A single attempt, no retries.
    pub async fn execute_task(
        &self,
        model: &dyn Model,
        task: &Task,
        coworkers: &[&Agent],
        generation: &GenerationConfig,
    ) -> Result<String, AgentError> {
        let request = CompletionRequest {
            prompt: Message::user(self.task_prompt(task)),
            system_prompt: Some(self.system_prompt(coworkers)),
            chat_history: vec![],
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
        };

        let response = model.completion(request).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                "| agent | Agent: {} | Task: {} | Usage: {}",
                self.role,
                task.id(),
                usage
            );
        }
        Ok(response.into_text()?)
    }
}

#[derive(Default)]
pub struct AgentBuilder {
    role: String,
    goal: String,
    backstory: String,
    allow_delegation: bool,
    verbose: bool,
}

impl AgentBuilder {
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = goal.into();
        self
    }

    pub fn backstory(mut self, backstory: impl Into<String>) -> Self {
        self.backstory = backstory.into();
        self
    }

    pub fn allow_delegation(mut self, allow_delegation: bool) -> Self {
        self.allow_delegation = allow_delegation;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<Agent, AgentError> {
        if self.role.trim().is_empty() {
            return Err(AgentError::EmptyRole);
        }

        Ok(Agent {
            id: Uuid::new_v4(),
            role: self.role,
            goal: self.goal,
            backstory: self.backstory,
            allow_delegation: self.allow_delegation,
            verbose: self.verbose,
        })
    }
}
