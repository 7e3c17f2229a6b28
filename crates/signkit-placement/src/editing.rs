//! Click-to-edit protocol for placed fields.
//!
//! Clicking a field yields an [`EditPrompt`] describing what to ask the
//! user. The answer goes back through [`apply_edit`]; `None` means the user
//! dismissed the prompt and nothing changes. Checkboxes skip the prompt and
//! toggle directly.

use crate::field_store::FieldStore;
use crate::model::{CheckState, Field, FieldKind, FieldPatch};
use signkit_core::constants::{DEFAULT_RADIO_OPTIONS, DEFAULT_SIGNATURE_TEXT, RADIO_NOT_SELECTED};
use signkit_core::{FieldId, PlacementError};

/// What to ask the user when a field is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditPrompt {
    /// Ask for signature text; `initial` pre-fills the input.
    Signature { message: String, initial: String },
    /// Ask for a comma-separated option list.
    RadioOptions { message: String, initial: String },
    /// No prompt; the click toggles.
    Toggle,
    /// Ask for a free-text value.
    FreeText { message: String, initial: String },
}

impl EditPrompt {
    /// Text pre-filled in the prompt, if it has one.
    pub fn initial(&self) -> Option<&str> {
        match self {
            EditPrompt::Signature { initial, .. }
            | EditPrompt::RadioOptions { initial, .. }
            | EditPrompt::FreeText { initial, .. } => Some(initial),
            EditPrompt::Toggle => None,
        }
    }
}

/// Builds the prompt for a click on `field`.
pub fn prompt_for(field: &Field) -> EditPrompt {
    match &field.kind {
        FieldKind::Signature { value } => EditPrompt::Signature {
            message: format!(
                "Enter signature text or draw signature for {}:",
                field.label
            ),
            initial: value.clone(),
        },
        FieldKind::Radio { options, .. } => EditPrompt::RadioOptions {
            message: "Enter radio button options (separated by commas):".to_string(),
            initial: options
                .clone()
                .unwrap_or_else(|| DEFAULT_RADIO_OPTIONS.to_string()),
        },
        FieldKind::Checkbox { .. } => EditPrompt::Toggle,
        FieldKind::Text { value }
        | FieldKind::Date { value }
        | FieldKind::Email { value }
        | FieldKind::Phone { value }
        | FieldKind::Address { value } => EditPrompt::FreeText {
            message: format!("Enter value for {}:", field.label),
            initial: value.clone(),
        },
    }
}

/// How an edit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    /// The prompt was dismissed.
    Cancelled,
}

/// Applies the user's answer to the prompt for field `id`.
///
/// `response` is ignored for checkboxes, which always flip.
pub fn apply_edit(
    store: &mut FieldStore,
    id: FieldId,
    response: Option<&str>,
) -> Result<EditOutcome, PlacementError> {
    let field = store.get(id).ok_or(PlacementError::NotFound { id })?;

    let patch = match (&field.kind, response) {
        (FieldKind::Checkbox { value }, _) => FieldPatch::value(value.toggled().as_str()),
        (_, None) => {
            tracing::trace!("Edit of {} cancelled", id);
            return Ok(EditOutcome::Cancelled);
        }
        (FieldKind::Signature { .. }, Some(text)) => {
            let text = if text.is_empty() {
                DEFAULT_SIGNATURE_TEXT
            } else {
                text
            };
            FieldPatch::value(text)
        }
        (FieldKind::Radio { value, .. }, Some(options)) => {
            let value = if value.is_empty() {
                RADIO_NOT_SELECTED.to_string()
            } else {
                value.clone()
            };
            FieldPatch {
                options: Some(options.to_string()),
                value: Some(value),
                ..FieldPatch::default()
            }
        }
        (
            FieldKind::Text { .. }
            | FieldKind::Date { .. }
            | FieldKind::Email { .. }
            | FieldKind::Phone { .. }
            | FieldKind::Address { .. },
            Some(text),
        ) => FieldPatch::value(text),
    };

    store.update(id, patch)?;
    Ok(EditOutcome::Updated)
}

/// Flips a checkbox and returns its new state.
pub fn toggle_checkbox(store: &mut FieldStore, id: FieldId) -> Result<CheckState, PlacementError> {
    let field = store.get(id).ok_or(PlacementError::NotFound { id })?;
    let FieldKind::Checkbox { value } = field.kind else {
        return Err(PlacementError::validation(format!(
            "{} is a {} field, not a checkbox",
            id,
            field.field_type()
        )));
    };
    let next = value.toggled();
    store.update(id, FieldPatch::value(next.as_str()))?;
    Ok(next)
}

/// Picks a radio value. Values outside the option list are accepted.
pub fn select_radio_value(
    store: &mut FieldStore,
    id: FieldId,
    value: &str,
) -> Result<(), PlacementError> {
    let field = store.get(id).ok_or(PlacementError::NotFound { id })?;
    if !matches!(field.kind, FieldKind::Radio { .. }) {
        return Err(PlacementError::validation(format!(
            "{} is a {} field, not a radio",
            id,
            field.field_type()
        )));
    }
    store.update(id, FieldPatch::value(value))?;
    Ok(())
}

/// The recipient-selector popover shown next to one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipientPopover {
    open_for: Option<FieldId>,
}

impl RecipientPopover {
    pub fn open(&mut self, id: FieldId) {
        self.open_for = Some(id);
    }

    pub fn close(&mut self) {
        self.open_for = None;
    }

    pub fn open_for(&self) -> Option<FieldId> {
        self.open_for
    }

    pub fn is_open_for(&self, id: FieldId) -> bool {
        self.open_for == Some(id)
    }
}

/// Deletes a field, dismissing the popover if it belonged to that field.
pub fn delete_field(
    store: &mut FieldStore,
    popover: &mut RecipientPopover,
    id: FieldId,
) -> Option<Field> {
    if popover.is_open_for(id) {
        popover.close();
    }
    store.remove(id)
}
