use crate::core::encoding::{code_to_label, label_to_code, EncodingError, Schema, UNSELECTED};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while turning selections into model input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    #[error("Missing selection for: {}", join_schemas(.missing))]
    IncompleteSelection { missing: Vec<Schema> },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

fn join_schemas(schemas: &[Schema]) -> String {
    schemas
        .iter()
        .map(|s| s.field_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One user choice for a single schema
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Label(String),
}

impl Selection {
    /// Interpret a raw form value; the placeholder and the empty string mean "no choice yet".
    /// Anything else is kept verbatim and must match a label exactly.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Selection::Unselected,
            Some(value) if value == UNSELECTED => Selection::Unselected,
            Some(value) => Selection::Label(value.to_string()),
        }
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, Selection::Label(_))
    }
}

/// One selection per schema, indexed by model column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    slots: [Selection; 5],
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, schema: Schema, label: impl Into<String>) -> Self {
        self.set(schema, Selection::Label(label.into()));
        self
    }

    pub fn set(&mut self, schema: Schema, selection: Selection) {
        self.slots[schema.position()] = selection;
    }

    pub fn get(&self, schema: Schema) -> &Selection {
        &self.slots[schema.position()]
    }

    /// Schemas still on the placeholder, in model order
    pub fn missing(&self) -> Vec<Schema> {
        Schema::ALL
            .into_iter()
            .filter(|schema| !self.get(*schema).is_selected())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Selection::is_selected)
    }
}

/// Encoded model input, one code per schema in training order
///
/// Only produced by [`build`] or by checking raw codes with `TryFrom`, so every
/// code is a valid index into its schema's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([u32; 5]);

impl TryFrom<[u32; 5]> for FeatureVector {
    type Error = EncodingError;

    fn try_from(codes: [u32; 5]) -> Result<Self, Self::Error> {
        for schema in Schema::ALL {
            let code = codes[schema.position()];
            if code_to_label(schema, code).is_none() {
                return Err(EncodingError::UnknownCode { schema, code });
            }
        }
        Ok(FeatureVector(codes))
    }
}

impl FeatureVector {
    pub fn codes(&self) -> [u32; 5] {
        self.0
    }

    pub fn code(&self, schema: Schema) -> u32 {
        self.0[schema.position()]
    }

    /// Numeric row in the layout the model consumes
    pub fn as_row(&self) -> Vec<f64> {
        self.0.iter().map(|code| f64::from(*code)).collect()
    }

    /// Schema and label pairs, for logs and responses
    pub fn describe(&self) -> Vec<(Schema, &'static str)> {
        Schema::ALL
            .into_iter()
            .filter_map(|schema| code_to_label(schema, self.code(schema)).map(|label| (schema, label)))
            .collect()
    }
}

/// Build the feature vector for a complete set of selections
///
/// The schema order here is the single source of truth for the model's
/// column order and must not change independently of the trained artifact.
pub fn build(selections: &Selections) -> Result<FeatureVector, FeatureError> {
    let missing = selections.missing();
    if !missing.is_empty() {
        return Err(FeatureError::IncompleteSelection { missing });
    }

    let mut codes = [0u32; 5];
    for schema in Schema::ALL {
        if let Selection::Label(label) = selections.get(schema) {
            codes[schema.position()] = label_to_code(schema, label)?;
        }
    }

    Ok(FeatureVector(codes))
}
