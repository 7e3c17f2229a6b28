//! Field data model.
//!
//! A [`Field`] is stored in page percentages only. Its type-specific payload
//! lives in [`FieldKind`], so a radio option list or a checkbox state cannot
//! end up on the wrong kind of field.

use crate::coordinates::PercentPoint;
use serde::{Deserialize, Deserializer, Serialize};
use signkit_core::constants::PERCENT_EPSILON;
use signkit_core::{FieldId, PlacementError, RecipientId};
use std::fmt;
use std::str::FromStr;

/// The kinds of field that can be placed on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Signature,
    Text,
    Date,
    Email,
    Phone,
    Address,
    Radio,
    Checkbox,
}

impl FieldType {
    /// Every field type, in palette order.
    pub const ALL: [FieldType; 8] = [
        FieldType::Signature,
        FieldType::Text,
        FieldType::Date,
        FieldType::Email,
        FieldType::Phone,
        FieldType::Address,
        FieldType::Radio,
        FieldType::Checkbox,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Signature => "signature",
            FieldType::Text => "text",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Address => "address",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
        }
    }

    /// Label shown on the palette and given to freshly dropped fields.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Signature => "Signature",
            FieldType::Text => "Text Field",
            FieldType::Date => "Date",
            FieldType::Email => "Email",
            FieldType::Phone => "Phone",
            FieldType::Address => "Address",
            FieldType::Radio => "Radio Button",
            FieldType::Checkbox => "Checkbox",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| PlacementError::validation(format!("unrecognized field type '{}'", s)))
    }
}

/// State of a checkbox field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    #[default]
    #[serde(alias = "")]
    Unchecked,
    Checked,
}

impl CheckState {
    /// The opposite state.
    pub fn toggled(self) -> Self {
        match self {
            CheckState::Checked => CheckState::Unchecked,
            CheckState::Unchecked => CheckState::Checked,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckState::Checked => "checked",
            CheckState::Unchecked => "unchecked",
        }
    }

    /// Parses a stored value. An empty string is a never-touched checkbox.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "checked" => Some(CheckState::Checked),
            "unchecked" | "" => Some(CheckState::Unchecked),
            _ => None,
        }
    }
}

/// Type-specific payload of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Signature {
        #[serde(default)]
        value: String,
    },
    Text {
        #[serde(default)]
        value: String,
    },
    Date {
        #[serde(default)]
        value: String,
    },
    Email {
        #[serde(default)]
        value: String,
    },
    Phone {
        #[serde(default)]
        value: String,
    },
    Address {
        #[serde(default)]
        value: String,
    },
    Radio {
        /// Comma-separated option list, absent until first edited.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<String>,
        #[serde(default)]
        value: String,
    },
    Checkbox {
        #[serde(default)]
        value: CheckState,
    },
}

impl FieldKind {
    /// A fresh payload with an empty value.
    pub fn empty(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Signature => FieldKind::Signature {
                value: String::new(),
            },
            FieldType::Text => FieldKind::Text {
                value: String::new(),
            },
            FieldType::Date => FieldKind::Date {
                value: String::new(),
            },
            FieldType::Email => FieldKind::Email {
                value: String::new(),
            },
            FieldType::Phone => FieldKind::Phone {
                value: String::new(),
            },
            FieldType::Address => FieldKind::Address {
                value: String::new(),
            },
            FieldType::Radio => FieldKind::Radio {
                options: None,
                value: String::new(),
            },
            FieldType::Checkbox => FieldKind::Checkbox {
                value: CheckState::Unchecked,
            },
        }
    }

    pub fn field_type(&self) -> FieldType {
        match self {
            FieldKind::Signature { .. } => FieldType::Signature,
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Date { .. } => FieldType::Date,
            FieldKind::Email { .. } => FieldType::Email,
            FieldKind::Phone { .. } => FieldType::Phone,
            FieldKind::Address { .. } => FieldType::Address,
            FieldKind::Radio { .. } => FieldType::Radio,
            FieldKind::Checkbox { .. } => FieldType::Checkbox,
        }
    }

    /// Current value as text.
    pub fn value(&self) -> &str {
        match self {
            FieldKind::Signature { value }
            | FieldKind::Text { value }
            | FieldKind::Date { value }
            | FieldKind::Email { value }
            | FieldKind::Phone { value }
            | FieldKind::Address { value }
            | FieldKind::Radio { value, .. } => value,
            FieldKind::Checkbox { value } => value.as_str(),
        }
    }

    /// Radio options, `None` for every other kind.
    pub fn options(&self) -> Option<&str> {
        match self {
            FieldKind::Radio { options, .. } => options.as_deref(),
            _ => None,
        }
    }

    /// Replaces the value. Checkboxes only accept `checked`/`unchecked`.
    pub fn set_value(&mut self, new_value: &str) -> Result<(), PlacementError> {
        match self {
            FieldKind::Signature { value }
            | FieldKind::Text { value }
            | FieldKind::Date { value }
            | FieldKind::Email { value }
            | FieldKind::Phone { value }
            | FieldKind::Address { value }
            | FieldKind::Radio { value, .. } => {
                *value = new_value.to_string();
                Ok(())
            }
            FieldKind::Checkbox { value } => {
                *value =
                    CheckState::parse(new_value).ok_or_else(|| PlacementError::InvalidValue {
                        field_type: FieldType::Checkbox.to_string(),
                        value: new_value.to_string(),
                    })?;
                Ok(())
            }
        }
    }

    /// Replaces the option list of a radio field.
    pub fn set_options(&mut self, new_options: &str) -> Result<(), PlacementError> {
        match self {
            FieldKind::Radio { options, .. } => {
                *options = Some(new_options.to_string());
                Ok(())
            }
            other => Err(PlacementError::validation(format!(
                "{} fields have no options",
                other.field_type()
            ))),
        }
    }
}

/// A placed form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// 1-based page number.
    pub page: u32,
    pub x_percent: f64,
    pub y_percent: f64,
    pub width_percent: f64,
    pub height_percent: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub recipient_id: Option<RecipientId>,
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    pub fn value(&self) -> &str {
        self.kind.value()
    }

    /// Top-left corner in page percentages.
    pub fn position(&self) -> PercentPoint {
        PercentPoint::new(self.x_percent, self.y_percent)
    }

    /// Checks the geometry invariants every stored field satisfies.
    pub fn validate(&self) -> Result<(), PlacementError> {
        if self.page == 0 {
            return Err(PlacementError::validation(format!(
                "{} has page 0; pages start at 1",
                self.id
            )));
        }
        let geometry = [
            self.x_percent,
            self.y_percent,
            self.width_percent,
            self.height_percent,
        ];
        if geometry.iter().any(|v| !v.is_finite()) {
            return Err(PlacementError::validation(format!(
                "{} has a non-finite coordinate",
                self.id
            )));
        }
        if self.width_percent <= 0.0 || self.height_percent <= 0.0 {
            return Err(PlacementError::validation(format!(
                "{} has no area",
                self.id
            )));
        }
        if self.x_percent < 0.0
            || self.y_percent < 0.0
            || self.x_percent + self.width_percent > 100.0 + PERCENT_EPSILON
            || self.y_percent + self.height_percent > 100.0 + PERCENT_EPSILON
        {
            return Err(PlacementError::validation(format!(
                "{} extends past the page",
                self.id
            )));
        }
        Ok(())
    }
}

/// Input to [`crate::FieldStore::add`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDraft {
    /// Explicit id, or `None` to have the store assign one.
    pub id: Option<FieldId>,
    pub kind: FieldKind,
    pub page: u32,
    pub position: PercentPoint,
    pub width_percent: f64,
    pub height_percent: f64,
    pub label: String,
    pub required: bool,
    pub recipient_id: Option<RecipientId>,
}

impl FieldDraft {
    /// A draft with an empty value and the type's default label.
    pub fn new(
        field_type: FieldType,
        page: u32,
        position: PercentPoint,
        width_percent: f64,
        height_percent: f64,
    ) -> Self {
        Self {
            id: None,
            kind: FieldKind::empty(field_type),
            page,
            position,
            width_percent,
            height_percent,
            label: field_type.label().to_string(),
            required: false,
            recipient_id: None,
        }
    }

    pub fn with_id(mut self, id: FieldId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_recipient(mut self, recipient_id: Option<RecipientId>) -> Self {
        self.recipient_id = recipient_id;
        self
    }
}

/// Partial update applied by [`crate::FieldStore::update`].
///
/// Identity and type are not patchable. Unknown keys in a JSON patch are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    pub x_percent: Option<f64>,
    pub y_percent: Option<f64>,
    pub label: Option<String>,
    pub value: Option<String>,
    pub options: Option<String>,
    pub required: Option<bool>,
    /// `Some(None)` unassigns, `None` leaves the assignment alone.
    #[serde(default, deserialize_with = "present")]
    pub recipient_id: Option<Option<RecipientId>>,
}

impl FieldPatch {
    /// Moves the field to a new top-left corner.
    pub fn position(point: PercentPoint) -> Self {
        Self {
            x_percent: Some(point.x),
            y_percent: Some(point.y),
            ..Self::default()
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn options(options: impl Into<String>) -> Self {
        Self {
            options: Some(options.into()),
            ..Self::default()
        }
    }

    pub fn recipient(recipient_id: Option<RecipientId>) -> Self {
        Self {
            recipient_id: Some(recipient_id),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the patch moves the field.
    pub fn moves(&self) -> bool {
        self.x_percent.is_some() || self.y_percent.is_some()
    }
}

// A key that is present maps to `Some`, even when its value is null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
