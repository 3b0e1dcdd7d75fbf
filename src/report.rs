//! Console rendering for crew runs and demo summaries.
use std::fmt::{self, Display};

use crate::{crew::CrewOutput, task::TaskResult};

/// How many characters of a result the demos print.
pub const PREVIEW_CHARS: usize = 200;

/// The first `max_chars` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_owned(),
    }
}

/// One labeled block per task, followed by a count line. With
/// `preview_chars` set, successful results are cut to that many characters.
pub struct CrewReport<'a> {
    output: &'a CrewOutput,
    preview_chars: Option<usize>,
}

impl<'a> CrewReport<'a> {
    pub fn new(output: &'a CrewOutput, preview_chars: Option<usize>) -> Self {
        Self {
            output,
            preview_chars,
        }
    }
}

impl Display for CrewReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for task in &self.output.tasks_output {
            match &task.result {
                TaskResult::Succeeded(raw) => {
                    writeln!(
                        f,
                        "✅ [{}] {}",
                        task.agent_role,
                        first_line(&task.description)
                    )?;
                    match self.preview_chars {
                        Some(max_chars) => writeln!(f, "{}", preview(raw, max_chars))?,
                        None => writeln!(f, "{raw}")?,
                    }
                }
                TaskResult::Failed(error) => writeln!(
                    f,
                    "❌ [{}] {}\nError: {}",
                    task.agent_role,
                    first_line(&task.description),
                    error
                )?,
            }
        }
        write!(
            f,
            "{}: {} task(s), {} succeeded, {} failed",
            self.output.crew_name,
            self.output.tasks_output.len(),
            self.output.succeeded(),
            self.output.failed()
        )
    }
}

fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Ran to the end, but some tasks failed.
    Partial { failed: usize, total: usize },
    Failed(String),
}

/// What the demo binary prints last.
#[derive(Debug, Default)]
pub struct Summary {
    entries: Vec<(String, Outcome)>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, outcome: Outcome) {
        self.entries.push((name.into(), outcome));
    }

    pub fn record_crew(&mut self, name: impl Into<String>, output: &CrewOutput) {
        let failed = output.failed();
        let outcome = if failed == 0 {
            Outcome::Completed
        } else {
            Outcome::Partial {
                failed,
                total: output.tasks_output.len(),
            }
        };
        self.record(name, outcome);
    }

    pub fn entries(&self) -> &[(String, Outcome)] {
        &self.entries
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, outcome) in &self.entries {
            match outcome {
                Outcome::Completed => writeln!(f, "✅ {name}")?,
                Outcome::Partial { failed, total } => {
                    writeln!(f, "⚠️ {name} ({failed}/{total} tasks failed)")?
                }
                Outcome::Failed(error) => writeln!(f, "❌ {name}: {error}")?,
            }
        }
        Ok(())
    }
}
