//! The sequential agent pipeline.
//!
//! A [`Crew`] owns an ordered list of tasks, each bound to one of its agents,
//! and runs them strictly one after another against a [`Model`]. A provider
//! failure for one task is recorded as that task's result and the crew moves
//! on; nothing short of a construction error stops a run.
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    agent::{Agent, AgentError},
    config::Settings,
    conversation::{AgentShortMemory, Role},
    llm::{Model, request::GenerationConfig},
    persistence::{self, PersistenceError},
    task::{Task, TaskError, TaskOutput, TaskResult, TaskStatus},
};

#[derive(Debug, Error)]
pub enum CrewError {
    #[error("Task '{task}' is bound to agent '{role}' which is not part of the crew")]
    UnknownAgent { task: String, role: String },
    #[error("Agent's role should be unique, duplicate role: {0}")]
    DuplicateAgent(String),
    #[error("Unsupported process: {0}")]
    UnsupportedProcess(String),
    #[error("Task error: {0}")]
    TaskError(#[from] TaskError),
    #[error("Agent error: {0}")]
    AgentError(#[from] AgentError),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    #[default]
    Sequential,
}

impl FromStr for Process {
    type Err = CrewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Process::Sequential),
            _ => Err(CrewError::UnsupportedProcess(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewStatus {
    NotStarted,
    Running,
    Completed,
}

/// Snapshot of a run, published to [`Crew::subscribe`] receivers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewProgress {
    pub status: CrewStatus,
    /// One entry per task, in task order.
    pub tasks: Vec<TaskStatus>,
}

pub struct CrewBuilder {
    name: String,
    description: String,
    process: Process,
    agents: Vec<Arc<Agent>>,
    tasks: Vec<Task>,
    generation: GenerationConfig,
    verbose: bool,
    metadata_output_dir: Option<PathBuf>,
    model: Arc<dyn Model>,
}

impl CrewBuilder {
    pub fn new_with_model(model: impl Model + 'static) -> Self {
        Self::new_with_shared_model(Arc::new(model))
    }

    pub fn new_with_shared_model(model: Arc<dyn Model>) -> Self {
        Self {
            name: "Crew".to_owned(),
            description: String::new(),
            process: Process::default(),
            agents: Vec::new(),
            tasks: Vec::new(),
            generation: GenerationConfig::default(),
            verbose: false,
            metadata_output_dir: None,
            model,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn process(mut self, process: Process) -> Self {
        self.process = process;
        self
    }

    pub fn add_agent(mut self, agent: Arc<Agent>) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(self, agents: Vec<Arc<Agent>>) -> Self {
        agents
            .into_iter()
            .fold(self, |builder, agent| builder.add_agent(agent))
    }

    pub fn add_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn tasks(self, tasks: Vec<Task>) -> Self {
        tasks
            .into_iter()
            .fold(self, |builder, task| builder.add_task(task))
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.generation.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.generation.max_tokens = Some(max_tokens);
        self
    }

    /// Log progress at `info` instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn metadata_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.metadata_output_dir = Some(dir.into());
        self
    }

    /// Apply the run-wide settings: sampling parameters, verbosity and export dir.
    pub fn settings(mut self, settings: &Settings) -> Self {
        self.generation = GenerationConfig::from(&settings.llm);
        self.verbose = settings.verbose;
        self.metadata_output_dir = settings.metadata_dir.clone();
        self
    }

    pub fn build(self) -> Result<Crew, CrewError> {
        let mut agents = self.agents;

        let mut roles = HashSet::new();
        for agent in &agents {
            if !roles.insert(agent.role().to_owned()) {
                return Err(CrewError::DuplicateAgent(agent.role().to_owned()));
            }
        }

        if agents.is_empty() {
            // No explicit roster: the crew is made of the tasks' agents.
            for task in &self.tasks {
                if !agents.iter().any(|agent| agent.id() == task.agent().id()) {
                    if !roles.insert(task.agent().role().to_owned()) {
                        return Err(CrewError::DuplicateAgent(task.agent().role().to_owned()));
                    }
                    agents.push(Arc::clone(task.agent()));
                }
            }
        } else {
            for task in &self.tasks {
                if !agents.iter().any(|agent| agent.id() == task.agent().id()) {
                    return Err(CrewError::UnknownAgent {
                        task: task.description().to_owned(),
                        role: task.agent().role().to_owned(),
                    });
                }
            }
        }

        let (progress, _) = watch::channel(CrewProgress {
            status: CrewStatus::NotStarted,
            tasks: vec![TaskStatus::Pending; self.tasks.len()],
        });

        Ok(Crew {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            process: self.process,
            agents,
            tasks: self.tasks,
            generation: self.generation,
            verbose: self.verbose,
            metadata_output_dir: self.metadata_output_dir,
            model: self.model,
            progress,
        })
    }
}

pub struct Crew {
    id: Uuid,
    name: String,
    description: String,
    process: Process,
    agents: Vec<Arc<Agent>>,
    tasks: Vec<Task>,
    generation: GenerationConfig,
    verbose: bool,
    metadata_output_dir: Option<PathBuf>,
    model: Arc<dyn Model>,
    progress: watch::Sender<CrewProgress>,
}

impl Crew {
    pub fn builder(model: impl Model + 'static) -> CrewBuilder {
        CrewBuilder::new_with_model(model)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn process(&self) -> Process {
        self.process
    }

    pub fn agents(&self) -> &[Arc<Agent>] {
        &self.agents
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn status(&self) -> CrewStatus {
        self.progress.borrow().status
    }

    pub fn subscribe(&self) -> watch::Receiver<CrewProgress> {
        self.progress.subscribe()
    }

    /// Run every task in order and collect one output per task.
    pub async fn kickoff(&self) -> CrewOutput {
        let started_at = Local::now();
        let run_id = Uuid::new_v4();
        self.progress.send_replace(CrewProgress {
            status: CrewStatus::Running,
            tasks: vec![TaskStatus::Pending; self.tasks.len()],
        });
        self.log(format!(
            "| sequential crew | Crew: {} | Run: {} | Tasks: {}",
            self.name,
            run_id,
            self.tasks.len()
        ));

        let conversation = AgentShortMemory::new();
        let mut tasks_output = Vec::with_capacity(self.tasks.len());
        for (index, task) in self.tasks.iter().enumerate() {
            self.set_task_status(index, TaskStatus::Executing);
            let output = self.execute_task(task, &conversation).await;
            self.set_task_status(index, output.status());
            tasks_output.push(output);
        }

        self.progress
            .send_modify(|progress| progress.status = CrewStatus::Completed);

        let output = CrewOutput {
            run_id,
            crew_name: self.name.clone(),
            description: self.description.clone(),
            tasks_output,
            conversation,
            started_at,
            finished_at: Local::now(),
        };

        if let Some(dir) = &self.metadata_output_dir {
            match save_output(dir, &output).await {
                Ok(path) => self.log(format!(
                    "| sequential crew | Crew: {} | Metadata: {}",
                    self.name,
                    path.display()
                )),
                Err(e) => tracing::error!(
                    "| sequential crew | Crew: {} | Failed to save metadata: {}",
                    self.name,
                    e
                ),
            }
        }

        output
    }

    async fn execute_task(&self, task: &Task, conversation: &AgentShortMemory) -> TaskOutput {
        let agent = task.agent();
        let coworkers = self
            .agents
            .iter()
            .filter(|coworker| coworker.id() != agent.id())
            .map(|coworker| &**coworker)
            .collect::<Vec<&Agent>>();
        let key = task.id().to_string();

        conversation.add(
            &key,
            agent.role(),
            Role::User("User".to_owned()),
            agent.task_prompt(task),
        );
        if self.verbose || agent.verbose() {
            tracing::info!(
                "| sequential crew | Agent: {} | Task: {}",
                agent.role(),
                task.description()
            );
        } else {
            tracing::debug!(
                "| sequential crew | Agent: {} | Task: {}",
                agent.role(),
                task.description()
            );
        }

        let start_time = Local::now();
        let result = match agent
            .execute_task(self.model.as_ref(), task, &coworkers, &self.generation)
            .await
        {
            Ok(output) => {
                conversation.add(
                    &key,
                    agent.role(),
                    Role::Assistant(agent.role().to_owned()),
                    &output,
                );
                TaskResult::Succeeded(output)
            }
            Err(e) => {
                tracing::error!(
                    "| sequential crew | Agent: {} | Task: {} | Error: {}",
                    agent.role(),
                    task.description(),
                    e
                );
                TaskResult::Failed(e.to_string())
            }
        };

        TaskOutput {
            task_id: task.id(),
            agent_role: agent.role().to_owned(),
            description: task.description().to_owned(),
            result,
            start_time,
            end_time: Local::now(),
        }
    }

    fn set_task_status(&self, index: usize, status: TaskStatus) {
        self.progress
            .send_modify(|progress| progress.tasks[index] = status);
    }

    fn log(&self, message: String) {
        if self.verbose {
            tracing::info!("{message}");
        } else {
            tracing::debug!("{message}");
        }
    }
}

/// Everything one kickoff produced.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOutput {
    pub run_id: Uuid,
    pub crew_name: String,
    pub description: String,
    /// One entry per task, in task order.
    pub tasks_output: Vec<TaskOutput>,
    /// Per-task transcripts, keyed by task id.
    pub conversation: AgentShortMemory,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl CrewOutput {
    pub fn results(&self) -> Vec<&TaskResult> {
        self.tasks_output.iter().map(|output| &output.result).collect()
    }

    pub fn succeeded(&self) -> usize {
        self.tasks_output
            .iter()
            .filter(|output| output.result.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.tasks_output.len() - self.succeeded()
    }

    /// Raw text of the last task that succeeded.
    pub fn final_output(&self) -> Option<&str> {
        self.tasks_output
            .iter()
            .rev()
            .find_map(|output| output.result.raw())
    }
}

async fn save_output(dir: &Path, output: &CrewOutput) -> Result<PathBuf, PersistenceError> {
    let file_name = persistence::short_hash(format!("{}{}", output.crew_name, output.run_id));
    let path = dir.join(file_name).with_extension("json");
    let json = serde_json::to_string_pretty(output)?;
    persistence::save_to_file(json, &path).await?;
    Ok(path)
}
