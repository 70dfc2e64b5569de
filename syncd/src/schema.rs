//! Custom-field schema index for a project.
//!
//! [`SchemaIndex`] maps each custom-field name to a [`FieldSchema`]: enum
//! fields carry their declared options (label -> option gid), everything
//! else just carries the field gid and its subtype. Field names are unique
//! within a project, so the name is a safe lookup key.

use std::collections::HashMap;

use crate::types::{CustomFieldSetting, FieldKind};

/// Schema of a single custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSchema {
    /// An enum field: values must resolve to a declared option.
    Enum {
        gid: String,
        /// Option display label -> option gid.
        options: HashMap<String, String>,
    },

    /// A text or number field: values are written as raw strings.
    Scalar { gid: String, kind: FieldKind },
}

impl FieldSchema {
    /// The remote identifier of the field.
    pub fn gid(&self) -> &str {
        match self {
            FieldSchema::Enum { gid, .. } | FieldSchema::Scalar { gid, .. } => gid,
        }
    }

    /// The subtype of the field.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldSchema::Enum { .. } => FieldKind::Enum,
            FieldSchema::Scalar { kind, .. } => *kind,
        }
    }

    /// Resolves an option label to its gid. Always `None` for scalar fields.
    pub fn option(&self, label: &str) -> Option<&str> {
        match self {
            FieldSchema::Enum { options, .. } => options.get(label).map(String::as_str),
            FieldSchema::Scalar { .. } => None,
        }
    }
}

/// Lookup from custom-field name to its schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    fields: HashMap<String, FieldSchema>,
}

impl SchemaIndex {
    /// Builds the index from a project's custom-field settings.
    ///
    /// A field that declares enum options becomes [`FieldSchema::Enum`];
    /// everything else becomes [`FieldSchema::Scalar`].
    pub fn build(settings: &[CustomFieldSetting]) -> Self {
        let mut fields = HashMap::new();

        for setting in settings {
            let field = &setting.custom_field;
            let schema = match &field.enum_options {
                Some(options) => FieldSchema::Enum {
                    gid: field.gid.clone(),
                    options: options
                        .iter()
                        .map(|option| (option.name.clone(), option.gid.clone()))
                        .collect(),
                },
                None => FieldSchema::Scalar {
                    gid: field.gid.clone(),
                    kind: field.resource_subtype,
                },
            };
            fields.insert(field.name.clone(), schema);
        }

        Self { fields }
    }

    /// Looks up a field's schema by name.
    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Number of indexed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the project declares no custom fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
