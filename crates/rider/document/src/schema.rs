//! The declared shape of a rider document

use rider_types::{FieldKind, FieldName, FieldValue, NegotiationError, NegotiationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declaration for one rider field
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSpec {
    pub kind: FieldKind,
    /// Required fields must be present in every published version
    pub required: bool,
    /// Allowed selections for `Choice` fields, empty otherwise
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl FieldSpec {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = &'static str>) -> Self {
        self.choices = choices.into_iter().map(str::to_string).collect();
        self
    }
}

/// The field table a rider document must conform to.
///
/// Validation is strict in both directions: required fields must be
/// present, and present fields must be declared with a matching kind.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiderSchema {
    fields: BTreeMap<FieldName, FieldSpec>,
}

impl RiderSchema {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// The marketplace's standard rider shape
    pub fn standard() -> Self {
        let mut schema = Self::new();
        schema
            .declare("performance_duration_minutes", FieldSpec::new(FieldKind::Integer).required())
            .declare("performance_fee", FieldSpec::new(FieldKind::Decimal).required())
            .declare("set_count", FieldSpec::new(FieldKind::Integer))
            .declare("sound_system_provided", FieldSpec::new(FieldKind::Bool))
            .declare("lighting_rig_provided", FieldSpec::new(FieldKind::Bool))
            .declare("dressing_room_required", FieldSpec::new(FieldKind::Bool))
            .declare("parking_required", FieldSpec::new(FieldKind::Bool))
            .declare("meal_provided", FieldSpec::new(FieldKind::Bool))
            .declare("accommodation_required", FieldSpec::new(FieldKind::Bool))
            .declare(
                "power_supply",
                FieldSpec::new(FieldKind::Choice).with_choices(["standard", "three_phase"]),
            )
            .declare("backline_notes", FieldSpec::new(FieldKind::Text));
        schema
    }

    /// Declare (or redeclare) a field
    pub fn declare(&mut self, name: impl Into<FieldName>, spec: FieldSpec) -> &mut Self {
        self.fields.insert(name.into(), spec);
        self
    }

    /// Look up a field declaration
    pub fn spec(&self, name: &FieldName) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Validate a candidate field set against this schema
    pub fn validate(&self, fields: &BTreeMap<FieldName, FieldValue>) -> NegotiationResult<()> {
        for (name, spec) in &self.fields {
            if spec.required && !fields.contains_key(name) {
                return Err(NegotiationError::Validation(format!(
                    "required field '{}' is missing",
                    name
                )));
            }
        }

        for (name, value) in fields {
            let spec = self.fields.get(name).ok_or_else(|| {
                NegotiationError::Validation(format!("field '{}' is not declared", name))
            })?;
            if !value.matches(spec.kind) {
                return Err(NegotiationError::Validation(format!(
                    "field '{}' expects {} but got {}",
                    name,
                    spec.kind,
                    value.kind()
                )));
            }
            if let FieldValue::Choice(selection) = value {
                if !spec.choices.iter().any(|c| c == selection) {
                    return Err(NegotiationError::Validation(format!(
                        "field '{}' does not allow choice '{}'",
                        name, selection
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for RiderSchema {
    fn default() -> Self {
        Self::standard()
    }
}
