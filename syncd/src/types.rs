//! Wire types for the task-tracking service REST API.
//!
//! Every response from the service wraps its payload in a `data` envelope;
//! [`Envelope`] mirrors that. The task, section, and custom-field shapes
//! carry only the fields this daemon reads -- serde ignores the rest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the sentinel enum field marking a task as processed.
pub const API_UPDATED_FIELD: &str = "api_updated";

/// Option label on the sentinel field meaning "processed".
pub const API_UPDATED_YES: &str = "yes";

/// Reserved notes label whose value is a ticket identifier.
pub const TICKET_ID_LABEL: &str = "TicketId";

/// Reserved notes label carried through to the update payload verbatim.
pub const NOTES_LABEL: &str = "notes";

/// The `data` envelope the service wraps every response body in.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Project layout. Anything the service reports that is not a board is
/// treated as a list, matching how the deployment behaves: lists have no
/// sections, so section filtering is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectLayout {
    Board,
    #[serde(other)]
    List,
}

/// A project, as returned by `GET /projects/{gid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    pub layout: ProjectLayout,
}

/// A board section, as returned by `GET /projects/{gid}/sections`.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub gid: String,
    pub name: String,
}

/// Minimal task summary returned by the listing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCompact {
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

/// Subtype of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Enum,
    Text,
    Number,
    #[serde(other)]
    Other,
}

/// The currently selected option of an enum custom field on a task.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumValue {
    pub gid: String,
    #[serde(default)]
    pub name: String,
}

/// A custom-field instance attached to a task.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldValue {
    pub gid: String,
    pub name: String,
    pub resource_subtype: FieldKind,
    #[serde(default)]
    pub enum_value: Option<EnumValue>,
}

/// A fully expanded task, as returned by `GET /tasks/{gid}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub gid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub custom_fields: Vec<CustomFieldValue>,
}

/// A declared option of an enum custom field.
#[derive(Debug, Clone, Deserialize)]
pub struct EnumOption {
    pub gid: String,
    pub name: String,
}

/// The custom-field definition nested inside a setting.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldResource {
    pub gid: String,
    pub name: String,
    pub resource_subtype: FieldKind,
    #[serde(default)]
    pub enum_options: Option<Vec<EnumOption>>,
}

/// One entry from `GET /projects/{gid}/custom_field_settings`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldSetting {
    pub custom_field: CustomFieldResource,
}

/// The resource (or parent container) referenced by an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventResource {
    #[serde(default)]
    pub gid: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One event from the events endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    pub action: String,
    pub resource: EventResource,
    #[serde(default)]
    pub parent: Option<EventResource>,
}

/// A page of events plus the sync token to resume from.
#[derive(Debug, Clone)]
pub struct EventPage {
    pub events: Vec<EventRecord>,
    pub sync: String,
}

/// Body of `PUT /tasks/{gid}`: optional notes carried through unchanged,
/// plus a mapping from custom-field gid to value (an enum-option gid for
/// enum fields, the raw string otherwise). A `BTreeMap` keeps the
/// serialized order stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub custom_fields: BTreeMap<String, String>,
}
