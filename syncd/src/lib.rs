//! fieldsync daemon - syncs task notes into tracker custom fields.
//!
//! This crate polls a task-tracking service, finds tasks whose free-text
//! notes field carries structured `label | value` data (written there by an
//! intake form), parses that text, and writes the values into the service's
//! typed custom fields so they become queryable and reportable. A per-project
//! event loop then keeps newly added tasks in sync reactively.
//!
//! # Overview
//!
//! The batch pass for a project lists candidate tasks (the configured
//! section for board layouts, the whole project for lists), keeps the ones
//! whose `api_updated` sentinel field is still unset, and runs each through
//! parse -> project -> update. After the pass, one [`poller::EventPoller`]
//! per project long-polls the events endpoint and dispatches added tasks
//! through the same pipeline.
//!
//! # Modules
//!
//! - [`types`]: wire types for the tracking service REST API
//! - [`config`]: configuration from environment variables
//! - [`error`]: the crate-wide error taxonomy
//! - [`client`]: HTTP client for the tracking service
//! - [`notes`]: notes-field parsing and ticket-id normalization
//! - [`schema`]: custom-field schema index
//! - [`projector`]: parsed notes -> update payload
//! - [`selector`]: filtering of already-processed tasks
//! - [`pipeline`]: per-project batch pass and per-task update pipeline
//! - [`poller`]: per-project event-polling loop
//! - [`journal`]: append-only timestamped log sink

pub mod client;
pub mod config;
pub mod error;
pub mod journal;
pub mod notes;
pub mod pipeline;
pub mod poller;
pub mod projector;
pub mod schema;
pub mod selector;
pub mod types;

pub use client::{ClientError, TrackerClient};
pub use config::{Config, ConfigError, ProjectContext};
pub use error::{Result, SyncError};
pub use journal::Journal;
pub use notes::{normalize_ticket_id, parse_notes};
pub use pipeline::Pipeline;
pub use poller::{added_task_gids, EventPoller};
pub use projector::project_update;
pub use schema::{FieldSchema, SchemaIndex};
pub use selector::{is_updateable, select_updateable};
pub use types::{
    EventPage, EventRecord, FieldKind, ProjectLayout, Task, UpdatePayload, API_UPDATED_FIELD,
    API_UPDATED_YES, NOTES_LABEL, TICKET_ID_LABEL,
};
