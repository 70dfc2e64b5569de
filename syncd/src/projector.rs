//! Projection of parsed notes into an update payload.
//!
//! Labels the project schema does not know are skipped, keeping the
//! projector forward-compatible with note fields added to the intake form
//! before the schema catches up. The `api_updated` sentinel is always set
//! to its "yes" option as the final step, which is what keeps a task from
//! being processed twice.

use std::collections::HashMap;

use crate::error::{Result, SyncError};
use crate::schema::{FieldSchema, SchemaIndex};
use crate::types::{UpdatePayload, API_UPDATED_FIELD, API_UPDATED_YES, NOTES_LABEL};

/// Maps parsed notes plus the schema index into the update payload.
///
/// # Errors
///
/// Returns [`SyncError::UnrecognizedOption`] if a value for a known enum
/// field is not one of its declared options, and
/// [`SyncError::MissingSentinel`] if the schema has no `api_updated` enum
/// field with a `yes` option.
pub fn project_update(
    parsed: &HashMap<String, String>,
    schema: &SchemaIndex,
) -> Result<UpdatePayload> {
    let mut payload = UpdatePayload {
        notes: parsed.get(NOTES_LABEL).cloned(),
        ..UpdatePayload::default()
    };

    for (label, value) in parsed {
        if label == NOTES_LABEL {
            continue;
        }
        let Some(field) = schema.get(label) else {
            continue;
        };

        match field {
            FieldSchema::Enum { gid, .. } => {
                let option = field
                    .option(value)
                    .ok_or_else(|| SyncError::UnrecognizedOption {
                        field: label.clone(),
                        value: value.clone(),
                    })?;
                payload.custom_fields.insert(gid.clone(), option.to_string());
            }
            FieldSchema::Scalar { gid, .. } => {
                payload.custom_fields.insert(gid.clone(), value.clone());
            }
        }
    }

    let (sentinel_gid, yes_gid) = resolve_sentinel(schema)?;
    payload.custom_fields.insert(sentinel_gid, yes_gid);

    Ok(payload)
}

/// Resolves the sentinel field gid and its "yes" option gid.
fn resolve_sentinel(schema: &SchemaIndex) -> Result<(String, String)> {
    match schema.get(API_UPDATED_FIELD) {
        Some(field @ FieldSchema::Enum { gid, .. }) => field
            .option(API_UPDATED_YES)
            .map(|option| (gid.clone(), option.to_string()))
            .ok_or_else(|| SyncError::MissingSentinel(API_UPDATED_FIELD.to_string())),
        _ => Err(SyncError::MissingSentinel(API_UPDATED_FIELD.to_string())),
    }
}
