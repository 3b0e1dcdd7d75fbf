use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::agent::Agent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task must be bound to an agent.")]
    MissingAgent,
    #[error("Task's description must be set.")]
    EmptyDescription,
}

/// A unit of work bound to exactly one agent.
#[derive(Debug, Clone)]
pub struct Task {
    id: Uuid,
    description: String,
    expected_output: String,
    agent: Arc<Agent>,
}

impl Task {
    pub fn builder() -> TaskBuilder {
        TaskBuilder::default()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expected_output(&self) -> &str {
        &self.expected_output
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }
}

#[derive(Default)]
pub struct TaskBuilder {
    description: String,
    expected_output: String,
    agent: Option<Arc<Agent>>,
}

impl TaskBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn expected_output(mut self, expected_output: impl Into<String>) -> Self {
        self.expected_output = expected_output.into();
        self
    }

    pub fn agent(mut self, agent: Arc<Agent>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn build(self) -> Result<Task, TaskError> {
        let agent = self.agent.ok_or(TaskError::MissingAgent)?;
        if self.description.trim().is_empty() {
            return Err(TaskError::EmptyDescription);
        }

        Ok(Task {
            id: Uuid::new_v4(),
            description: self.description,
            expected_output: self.expected_output,
            agent,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Executing,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

/// What a task produced: the model's text, or the failure marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "output", rename_all = "snake_case")]
pub enum TaskResult {
    Succeeded(String),
    Failed(String),
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Succeeded(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn raw(&self) -> Option<&str> {
        match self {
            TaskResult::Succeeded(raw) => Some(raw),
            TaskResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TaskResult::Succeeded(_) => None,
            TaskResult::Failed(error) => Some(error),
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            TaskResult::Succeeded(_) => TaskStatus::Succeeded,
            TaskResult::Failed(_) => TaskStatus::Failed,
        }
    }
}

impl Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskResult::Succeeded(raw) => f.write_str(raw),
            TaskResult::Failed(error) => write!(f, "[ERROR] {error}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: Uuid,
    pub agent_role: String,
    pub description: String,
    pub result: TaskResult,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

impl TaskOutput {
    pub fn status(&self) -> TaskStatus {
        self.result.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Arc<Agent> {
        Arc::new(Agent::builder().role("Flight Specialist").build().unwrap())
    }

    #[test]
    fn test_build_requires_agent() {
        let result = Task::builder()
            .description("Research flights")
            .expected_output("Flight options")
            .build();
        assert_eq!(result.unwrap_err(), TaskError::MissingAgent);
    }

    #[test]
    fn test_build_requires_description() {
        let result = Task::builder().description(" \n").agent(agent()).build();
        assert_eq!(result.unwrap_err(), TaskError::EmptyDescription);
    }

    #[test]
    fn test_task_shares_its_agent() {
        let agent = agent();
        let task = Task::builder()
            .description("Research flights")
            .agent(Arc::clone(&agent))
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(task.agent(), &agent));
        assert_eq!(task.agent().role(), "Flight Specialist");
    }

    #[test]
    fn test_task_result_accessors() {
        let ok = TaskResult::Succeeded("X".to_owned());
        let failed = TaskResult::Failed("rate limited".to_owned());

        assert!(ok.is_success());
        assert_eq!(ok.raw(), Some("X"));
        assert_eq!(ok.status(), TaskStatus::Succeeded);
        assert!(failed.is_failure());
        assert_eq!(failed.error(), Some("rate limited"));
        assert_eq!(failed.to_string(), "[ERROR] rate limited");
        assert!(failed.status().is_terminal());
        assert!(!TaskStatus::Executing.is_terminal());
    }

    #[test]
    fn test_task_result_serializes_tagged() {
        let json = serde_json::to_value(TaskResult::Failed("timeout".to_owned())).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "failed", "output": "timeout" })
        );
    }
}
