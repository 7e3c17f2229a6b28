//! Field store: the authoritative ordered collection of placed fields.
//!
//! Every mutation is all-or-nothing. An update is built on a copy of the
//! field, validated, and only then written back, so readers never observe a
//! half-applied patch. Change notifications go out on the session event bus
//! after the write.

use crate::coordinates::clamp_to_bounds;
use crate::model::{Field, FieldDraft, FieldPatch};
use signkit_core::constants::MAX_ID;
use signkit_core::{AppEvent, EventBus, FieldEvent, FieldId, PlacementError, RecipientId};
use std::sync::Arc;

/// Ordered collection of placed fields.
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    fields: Vec<Field>,
    next_id: u64,
    bus: Option<Arc<EventBus>>,
}

impl FieldStore {
    /// Creates an empty store that publishes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store publishing change events on `bus`.
    pub fn with_event_bus(bus: Arc<EventBus>) -> Self {
        Self {
            bus: Some(bus),
            ..Self::default()
        }
    }

    fn generate_id(&mut self) -> Result<FieldId, PlacementError> {
        let id = self
            .next_id
            .checked_add(1)
            .filter(|id| *id <= MAX_ID)
            .ok_or_else(|| PlacementError::validation("field ids exhausted"))?;
        self.next_id = id;
        Ok(FieldId(id))
    }

    fn publish(&self, event: FieldEvent) {
        if let Some(bus) = &self.bus {
            // Nobody listening is fine.
            let _ = bus.publish(AppEvent::Field(event));
        }
    }

    fn position_of(&self, id: FieldId) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Appends a field, assigning an id when the draft has none.
    ///
    /// The position is clamped so the field lies entirely on the page.
    pub fn add(&mut self, draft: FieldDraft) -> Result<FieldId, PlacementError> {
        if draft.page == 0 {
            return Err(PlacementError::validation("page must be >= 1"));
        }
        if !draft.position.is_finite() {
            return Err(PlacementError::validation("position must be finite"));
        }
        let FieldDraft {
            id,
            kind,
            page,
            position,
            width_percent,
            height_percent,
            label,
            required,
            recipient_id,
        } = draft;

        let id = match id {
            Some(id) if self.contains(id) => {
                return Err(PlacementError::validation(format!("duplicate id {}", id)));
            }
            Some(id) if id.0 > MAX_ID => {
                return Err(PlacementError::validation(format!("{} is out of range", id)));
            }
            Some(id) => id,
            None => self.generate_id()?,
        };

        let clamped = clamp_to_bounds(position.x, position.y, width_percent, height_percent);
        let field = Field {
            id,
            kind,
            page,
            x_percent: clamped.x,
            y_percent: clamped.y,
            width_percent,
            height_percent,
            label,
            required,
            recipient_id,
        };
        field.validate()?;
        self.next_id = self.next_id.max(id.0);

        tracing::debug!(
            "Added {} {} on page {} at ({:.2}%, {:.2}%)",
            field.field_type(),
            id,
            page,
            field.x_percent,
            field.y_percent
        );
        self.fields.push(field);
        self.publish(FieldEvent::Added { id, page });
        Ok(id)
    }

    /// Applies a partial update to one field.
    ///
    /// Fails with `NotFound` for an unknown id. A failed update leaves the
    /// field exactly as it was.
    pub fn update(&mut self, id: FieldId, patch: FieldPatch) -> Result<&Field, PlacementError> {
        let index = self
            .position_of(id)
            .ok_or(PlacementError::NotFound { id })?;

        let mut updated = self.fields[index].clone();
        if patch.moves() {
            let x = patch.x_percent.unwrap_or(updated.x_percent);
            let y = patch.y_percent.unwrap_or(updated.y_percent);
            if !x.is_finite() || !y.is_finite() {
                return Err(PlacementError::validation("position must be finite"));
            }
            let clamped = clamp_to_bounds(x, y, updated.width_percent, updated.height_percent);
            updated.x_percent = clamped.x;
            updated.y_percent = clamped.y;
        }
        if let Some(label) = patch.label {
            updated.label = label;
        }
        if let Some(options) = &patch.options {
            updated.kind.set_options(options)?;
        }
        if let Some(value) = &patch.value {
            updated.kind.set_value(value)?;
        }
        if let Some(required) = patch.required {
            updated.required = required;
        }
        if let Some(recipient_id) = patch.recipient_id {
            updated.recipient_id = recipient_id;
        }
        updated.validate()?;

        let page = updated.page;
        self.fields[index] = updated;
        tracing::trace!("Updated {}", id);
        self.publish(FieldEvent::Updated { id, page });
        Ok(&self.fields[index])
    }

    /// Removes a field. Removing an unknown id is a successful no-op.
    pub fn remove(&mut self, id: FieldId) -> Option<Field> {
        let index = self.position_of(id)?;
        let field = self.fields.remove(index);
        tracing::debug!("Removed {} from page {}", id, field.page);
        self.publish(FieldEvent::Removed {
            id,
            page: field.page,
        });
        Some(field)
    }

    /// Fields on `page`, in insertion order.
    pub fn by_page(&self, page: u32) -> impl Iterator<Item = &Field> + Clone + '_ {
        self.fields.iter().filter(move |f| f.page == page)
    }

    /// Fields assigned to `recipient_id`, in insertion order.
    pub fn assigned_to(
        &self,
        recipient_id: RecipientId,
    ) -> impl Iterator<Item = &Field> + Clone + '_ {
        self.fields
            .iter()
            .filter(move |f| f.recipient_id == Some(recipient_id))
    }

    /// Clears the assignment of every field pointing at `recipient_id`.
    ///
    /// Returns the number of fields touched.
    pub fn unassign_recipient(&mut self, recipient_id: RecipientId) -> usize {
        let ids: Vec<FieldId> = self.assigned_to(recipient_id).map(|f| f.id).collect();
        for id in &ids {
            if let Err(e) = self.update(*id, FieldPatch::recipient(None)) {
                tracing::warn!("Could not unassign {}: {}", id, e);
            }
        }
        ids.len()
    }

    pub fn get(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: FieldId) -> bool {
        self.position_of(id).is_some()
    }

    /// All fields, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> + Clone + '_ {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Replaces the whole collection, validating every field first.
    ///
    /// Nothing changes when any field is invalid or ids repeat.
    pub fn replace_all(&mut self, fields: Vec<Field>) -> Result<(), PlacementError> {
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            field.validate()?;
            if field.id.0 > MAX_ID {
                return Err(PlacementError::validation(format!(
                    "{} is out of range",
                    field.id
                )));
            }
            if !seen.insert(field.id) {
                return Err(PlacementError::validation(format!(
                    "duplicate id {}",
                    field.id
                )));
            }
        }
        // Never hand out an id an earlier field already had.
        let highest = fields.iter().map(|f| f.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(highest);
        self.fields = fields;
        tracing::info!("Loaded {} fields", self.fields.len());
        self.publish(FieldEvent::Cleared);
        for field in &self.fields {
            self.publish(FieldEvent::Added {
                id: field.id,
                page: field.page,
            });
        }
        Ok(())
    }
}
