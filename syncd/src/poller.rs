//! Event poller: one long-lived loop per project.
//!
//! Each iteration long-polls the events endpoint with the last-seen sync
//! token, keeps the "task added" events that landed in the configured
//! section (board layouts; lists have no sections, so every added task is
//! taken), and dispatches each affected task through the shared pipeline.
//!
//! The loop never terminates on its own. Any failure while polling or
//! dispatching is logged and the next iteration starts with whatever sync
//! token the poller last held -- the service hands out a fresh token via
//! its 412 response when the held one has expired.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::config::ProjectContext;
use crate::error::Result;
use crate::pipeline::Pipeline;
use crate::types::{EventRecord, ProjectLayout};

/// Pause before retrying after a failed iteration, so a dead network does
/// not turn the loop into a busy spin. Constant, not a backoff.
const ERROR_PAUSE_SECS: u64 = 5;

/// Event action the poller reacts to.
const ACTION_ADDED: &str = "added";

/// Resource kind the poller reacts to.
const RESOURCE_TASK: &str = "task";

/// Parent container kind carrying a section name.
const PARENT_SECTION: &str = "section";

/// A per-project event-polling loop.
pub struct EventPoller {
    pipeline: Arc<Pipeline>,
    project: ProjectContext,
}

impl EventPoller {
    /// Creates a poller for one project on the shared pipeline.
    pub fn new(pipeline: Arc<Pipeline>, project: ProjectContext) -> Self {
        Self { pipeline, project }
    }

    /// Runs the polling loop until the process exits.
    pub async fn run(self) {
        info!(project = %self.project.name, "Starting event loop");
        self.pipeline.journal().record(
            &self.project.name,
            &format!("Starting {} event loop!", self.project.name),
        );

        let mut sync_token: Option<String> = None;

        loop {
            match self.poll_once(sync_token.as_deref()).await {
                Ok(next_token) => sync_token = Some(next_token),
                Err(error) => {
                    // Keep whatever token we hold and loop again.
                    warn!(
                        project = %self.project.name,
                        %error,
                        "Event poll iteration failed"
                    );
                    self.pipeline.journal().record(
                        &self.project.name,
                        &format!("Event poll failed: {error}"),
                    );
                    tokio::time::sleep(Duration::from_secs(ERROR_PAUSE_SECS)).await;
                }
            }
        }
    }

    /// One iteration: poll, filter, dispatch. Returns the next sync token.
    ///
    /// # Errors
    ///
    /// Returns the first remote failure of the iteration; dispatch failures
    /// for individual tasks are contained inside the pipeline.
    pub async fn poll_once(&self, sync: Option<&str>) -> Result<String> {
        let client = self.pipeline.client();
        let page = client.long_poll_events(&self.project.gid, sync).await?;

        if page.events.is_empty() {
            return Ok(page.sync);
        }

        let layout = client.find_project_by_id(&self.project.gid).await?.layout;
        let task_gids = added_task_gids(&page.events, layout, self.pipeline.section_name());

        if task_gids.is_empty() {
            self.pipeline
                .journal()
                .record(&self.project.name, "There were no added tasks to update!");
            return Ok(page.sync);
        }

        info!(
            project = %self.project.name,
            tasks = ?task_gids,
            "Dispatching added tasks"
        );
        self.pipeline.journal().record(
            &self.project.name,
            &format!("The following task gid(s) will be updated {task_gids:?}."),
        );

        for task_gid in &task_gids {
            if let Err(error) = self.pipeline.process_task(&self.project, task_gid).await {
                error!(
                    project = %self.project.name,
                    task = %task_gid,
                    %error,
                    "Dispatch failed for added task"
                );
                self.pipeline.journal().record(
                    &self.project.name,
                    &format!("Failed to process added task {task_gid}: {error}"),
                );
            }
        }

        Ok(page.sync)
    }
}

/// Extracts the task gids of relevant "task added" events.
///
/// Board layouts additionally require the parent container to be the target
/// section; list layouts have no sections, so every added task matches.
pub fn added_task_gids(
    events: &[EventRecord],
    layout: ProjectLayout,
    section_name: &str,
) -> Vec<String> {
    events
        .iter()
        .filter(|event| {
            event.action == ACTION_ADDED && event.resource.resource_type == RESOURCE_TASK
        })
        .filter(|event| match layout {
            ProjectLayout::Board => event.parent.as_ref().is_some_and(|parent| {
                parent.resource_type == PARENT_SECTION
                    && parent.name.as_deref() == Some(section_name)
            }),
            ProjectLayout::List => true,
        })
        .map(|event| event.resource.gid.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventResource;

    fn added_task(gid: &str, parent: Option<EventResource>) -> EventRecord {
        EventRecord {
            action: "added".to_string(),
            resource: EventResource {
                gid: gid.to_string(),
                resource_type: "task".to_string(),
                name: None,
            },
            parent,
        }
    }

    fn section_parent(name: &str) -> EventResource {
        EventResource {
            gid: "s1".to_string(),
            resource_type: "section".to_string(),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn board_keeps_tasks_added_to_target_section() {
        let events = vec![
            added_task("t1", Some(section_parent("New Requests"))),
            added_task("t2", Some(section_parent("Done"))),
            added_task("t3", None),
        ];

        let gids = added_task_gids(&events, ProjectLayout::Board, "New Requests");
        assert_eq!(gids, ["t1"]);
    }

    #[test]
    fn list_keeps_every_added_task() {
        let events = vec![
            added_task("t1", Some(section_parent("Whatever"))),
            added_task("t2", None),
        ];

        let gids = added_task_gids(&events, ProjectLayout::List, "New Requests");
        assert_eq!(gids, ["t1", "t2"]);
    }

    #[test]
    fn non_added_actions_are_ignored() {
        let mut changed = added_task("t1", Some(section_parent("New Requests")));
        changed.action = "changed".to_string();

        let gids = added_task_gids(&[changed], ProjectLayout::Board, "New Requests");
        assert!(gids.is_empty());
    }

    #[test]
    fn non_task_resources_are_ignored() {
        let mut story = added_task("t1", Some(section_parent("New Requests")));
        story.resource.resource_type = "story".to_string();

        let gids = added_task_gids(&[story], ProjectLayout::Board, "New Requests");
        assert!(gids.is_empty());
    }

    #[test]
    fn board_requires_section_parent_kind() {
        let mut project_parent = added_task("t1", Some(section_parent("New Requests")));
        if let Some(parent) = project_parent.parent.as_mut() {
            parent.resource_type = "project".to_string();
        }

        let gids = added_task_gids(&[project_parent], ProjectLayout::Board, "New Requests");
        assert!(gids.is_empty());
    }
}
