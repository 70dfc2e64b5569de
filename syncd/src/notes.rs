//! Parsing of the notes free-text field into label/value pairs.
//!
//! Tasks created through the intake form carry structured data in their
//! notes field: segments separated by `||`, each segment a
//! `<label> | <value>` pair. Surrounding whitespace is trimmed and segments
//! without a value part are silently dropped, so notes written by hand in
//! the tracker UI simply parse to an empty mapping.
//!
//! A form field left empty produces three consecutive pipes (`|||`); a
//! space is inserted between the first and second so the empty value
//! survives the split as an empty string instead of merging two segments.

use std::collections::HashMap;

use crate::error::{Result, SyncError};
use crate::types::TICKET_ID_LABEL;

/// Width the numeric suffix of a ticket id is zero-padded to.
const TICKET_PAD_WIDTH: usize = 6;

/// Splits a notes blob into a label -> value mapping.
///
/// Values under the reserved `TicketId` label are normalized via
/// [`normalize_ticket_id`]. An empty mapping means there is nothing to
/// merge, not an error.
///
/// # Errors
///
/// Returns [`SyncError::MalformedInput`] if a `TicketId` value cannot be
/// normalized.
pub fn parse_notes(notes: &str) -> Result<HashMap<String, String>> {
    let repaired = notes.replace("|||", "| ||");
    let mut fields = HashMap::new();

    for segment in repaired.split("||") {
        let mut parts = segment.split('|');
        let (Some(label), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };

        let label = label.trim();
        let value = value.trim();
        if label == TICKET_ID_LABEL {
            fields.insert(label.to_string(), normalize_ticket_id(value)?);
        } else {
            fields.insert(label.to_string(), value.to_string());
        }
    }

    Ok(fields)
}

/// Zero-pads the suffix of a `<project>-<digits>` ticket id to 6 digits.
///
/// Splits on the first hyphen only. Suffixes already six or more characters
/// long pass through unchanged; padding only ever extends.
///
/// # Errors
///
/// Returns [`SyncError::MalformedInput`] if the value contains no hyphen.
pub fn normalize_ticket_id(raw: &str) -> Result<String> {
    let (project, id) = raw
        .split_once('-')
        .ok_or_else(|| SyncError::MalformedInput(raw.to_string()))?;

    Ok(format!("{project}-{id:0>TICKET_PAD_WIDTH$}"))
}
