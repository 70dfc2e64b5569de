//! Per-project batch pass and the shared per-task update pipeline.
//!
//! [`Pipeline::process_project`] is the initial sweep over a project:
//! resolve the layout, list the candidate tasks (the configured section for
//! boards, the whole project for lists), expand them to full detail, keep
//! the ones not yet marked as processed, and push each one's parsed notes
//! into its custom fields. [`Pipeline::process_task`] runs the same tail of
//! that pipeline for a single task and is what the event poller dispatches
//! to.
//!
//! Containment: a failure while updating one task is journaled and the
//! loop moves on to the next task; a failure while resolving the project
//! itself ends that project's pass and is reported to the caller.

use tracing::{error, info, warn};

use crate::client::TrackerClient;
use crate::config::ProjectContext;
use crate::error::{Result, SyncError};
use crate::journal::Journal;
use crate::notes::parse_notes;
use crate::projector::project_update;
use crate::schema::SchemaIndex;
use crate::selector::select_updateable;
use crate::types::{ProjectLayout, Task, TaskCompact, TICKET_ID_LABEL};

/// The shared sync pipeline: tracker client, journal, and the section that
/// holds new requests on board-layout projects.
pub struct Pipeline {
    client: TrackerClient,
    journal: Journal,
    section_name: String,
}

impl Pipeline {
    /// Creates a pipeline.
    pub fn new(client: TrackerClient, journal: Journal, section_name: impl Into<String>) -> Self {
        Self {
            client,
            journal,
            section_name: section_name.into(),
        }
    }

    /// The tracker client, shared with the event poller.
    pub fn client(&self) -> &TrackerClient {
        &self.client
    }

    /// The journal, shared with the event poller.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// The configured target section name.
    pub fn section_name(&self) -> &str {
        &self.section_name
    }

    /// Runs the batch pass over one project.
    ///
    /// # Errors
    ///
    /// Fails if the project, its sections, or its task listing cannot be
    /// resolved ([`SyncError::MissingSection`] or [`SyncError::Remote`]).
    /// Per-task failures are contained and journaled, not returned.
    pub async fn process_project(&self, project: &ProjectContext) -> Result<()> {
        info!(project = %project.name, "Processing project");
        self.journal
            .record(&project.name, &format!("Processing {}.", project.name));

        let layout = self.client.find_project_by_id(&project.gid).await?.layout;
        let compact = match layout {
            ProjectLayout::Board => {
                let section_gid = self.resolve_section(project).await?;
                self.client.find_tasks_by_section(&section_gid).await?
            }
            ProjectLayout::List => self.client.find_tasks_by_project(&project.gid).await?,
        };

        self.process_candidates(project, compact).await
    }

    /// Runs the update pipeline for a single task (event dispatch path).
    pub async fn process_task(&self, project: &ProjectContext, task_gid: &str) -> Result<()> {
        let candidate = TaskCompact {
            gid: task_gid.to_string(),
            name: String::new(),
        };
        self.process_candidates(project, vec![candidate]).await
    }

    /// Expands candidates, selects the updateable ones, and updates each.
    async fn process_candidates(
        &self,
        project: &ProjectContext,
        candidates: Vec<TaskCompact>,
    ) -> Result<()> {
        let mut tasks = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            tasks.push(self.client.find_task_by_id(&candidate.gid).await?);
        }

        let updateable = select_updateable(tasks);
        if updateable.is_empty() {
            info!(project = %project.name, "No tasks to update");
            self.journal
                .record(&project.name, "There were no tasks to update!");
            return Ok(());
        }

        let settings = self
            .client
            .find_custom_field_settings_by_project(&project.gid)
            .await?;
        let schema = SchemaIndex::build(&settings);

        for task in &updateable {
            if let Err(error) = self.update_task(project, task, &schema).await {
                error!(
                    project = %project.name,
                    task = %task.gid,
                    %error,
                    "Failed to update task"
                );
                self.journal.record(
                    &project.name,
                    &format!("Failed to update task {}: {error}", task.gid),
                );
            }
        }

        Ok(())
    }

    /// Parses one task's notes, projects them, and writes the update.
    async fn update_task(
        &self,
        project: &ProjectContext,
        task: &Task,
        schema: &SchemaIndex,
    ) -> Result<()> {
        let parsed = parse_notes(&task.notes)?;
        let payload = project_update(&parsed, schema)?;

        match self.client.update_task(&task.gid, &payload).await {
            Ok(()) => {
                let line = match parsed.get(TICKET_ID_LABEL) {
                    Some(ticket) => format!("The task ({ticket}) was updated!"),
                    None => "The task was updated!".to_string(),
                };
                info!(project = %project.name, task = %task.gid, "Task updated");
                self.journal.record(&project.name, &line);
                Ok(())
            }
            Err(error) => {
                // Dump the attempted payload for manual remediation.
                warn!(
                    project = %project.name,
                    task = %task.gid,
                    %error,
                    "Update call failed, journaling attempted payload"
                );
                self.journal.record(
                    &project.name,
                    "There was a problem updating the fields in task via the API",
                );
                for (field_gid, value) in &payload.custom_fields {
                    self.journal
                        .record(&project.name, &format!("{field_gid}, {value}"));
                }
                Err(error.into())
            }
        }
    }

    /// Resolves the configured section's gid within a board project.
    async fn resolve_section(&self, project: &ProjectContext) -> Result<String> {
        let sections = self.client.find_sections_by_project(&project.gid).await?;
        sections
            .into_iter()
            .find(|section| section.name == self.section_name)
            .map(|section| section.gid)
            .ok_or_else(|| SyncError::MissingSection {
                section: self.section_name.clone(),
                project: project.name.clone(),
            })
    }
}
