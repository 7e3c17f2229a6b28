//! Drag-and-drop controller.
//!
//! ```text
//! Idle --begin--> Dragging(source) --drop ok--> Dropped(outcome)
//!                     |   \--drop rejected--> Idle
//!                     \--cancel--> Idle
//! ```
//!
//! A drop converts the pointer into page percentages against the live page
//! box, clamps, and commits to the field store. Anything that makes the
//! drop impossible is logged and discarded; it never reaches the store.

use crate::coordinates::{clamp_to_bounds, to_percent, PercentPoint};
use crate::field_store::FieldStore;
use crate::model::{FieldDraft, FieldPatch, FieldType};
use crate::render_surface::RenderSurfaceAdapter;
use signkit_core::{AppEvent, DragEvent, EventBus, FieldId, PlacementError};
use signkit_settings::PlacementSettings;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    /// A new field of this type, from the palette.
    PaletteItem(FieldType),
    /// A field already on the page.
    ExistingField(FieldId),
}

impl fmt::Display for DragSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragSource::PaletteItem(t) => write!(f, "palette {}", t),
            DragSource::ExistingField(id) => write!(f, "{}", id),
        }
    }
}

/// Why a drop did not change the store.
#[derive(Debug, Clone, PartialEq)]
pub enum DropDiscard {
    /// No drag was in progress.
    NotDragging,
    /// The drop could not be placed or the store refused it.
    Placement(PlacementError),
}

impl DropDiscard {
    /// True when the pointer or page box made the drop impossible, as
    /// opposed to the store refusing the write.
    pub fn is_rejection(&self) -> bool {
        matches!(self, DropDiscard::Placement(e) if e.is_rejection())
    }
}

impl From<PlacementError> for DropDiscard {
    fn from(error: PlacementError) -> Self {
        DropDiscard::Placement(error)
    }
}

impl fmt::Display for DropDiscard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropDiscard::NotDragging => write!(f, "no drag in progress"),
            DropDiscard::Placement(e) => write!(f, "{}", e),
        }
    }
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Created(FieldId),
    Moved(FieldId),
    Discarded(DropDiscard),
}

impl DropOutcome {
    /// The created or moved field.
    pub fn field_id(&self) -> Option<FieldId> {
        match self {
            DropOutcome::Created(id) | DropOutcome::Moved(id) => Some(*id),
            DropOutcome::Discarded(_) => None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, DropOutcome::Discarded(_))
    }
}

/// Gesture state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSource),
    Dropped(DropOutcome),
}

/// Drag controller errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragError {
    /// A second drag started before the first ended.
    #[error("A drag is already in progress")]
    AlreadyDragging,
}

/// Drives one drag gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct DragDropController {
    state: DragState,
    hover: bool,
    bus: Option<Arc<EventBus>>,
}

impl DragDropController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_bus(bus: Arc<EventBus>) -> Self {
        Self {
            bus: Some(bus),
            ..Self::default()
        }
    }

    fn publish(&self, event: DragEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Drag(event));
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// True while the pointer hovers over the page during a drag.
    pub fn is_hovering(&self) -> bool {
        self.hover
    }

    /// Starts a drag.
    pub fn begin(&mut self, source: DragSource) -> Result<(), DragError> {
        if self.is_dragging() {
            return Err(DragError::AlreadyDragging);
        }
        tracing::trace!("Drag started from {}", source);
        self.state = DragState::Dragging(source);
        self.hover = false;
        self.publish(DragEvent::Started {
            source: source.to_string(),
        });
        Ok(())
    }

    /// Pointer moved during a drag. Returns whether it is over the page.
    pub fn drag_over(
        &mut self,
        pointer_x: f64,
        pointer_y: f64,
        surface: &RenderSurfaceAdapter,
    ) -> bool {
        self.hover = self.is_dragging()
            && surface
                .current_bounding_box()
                .is_some_and(|b| b.contains(pointer_x, pointer_y));
        self.hover
    }

    /// Abandons the drag.
    pub fn cancel(&mut self) {
        self.hover = false;
        if self.is_dragging() {
            self.state = DragState::Idle;
            self.publish(DragEvent::Cancelled);
        }
    }

    /// Releases the pointer at viewport `(pointer_x, pointer_y)`.
    ///
    /// Creates a palette field on the current page with the configured
    /// default size, or moves an existing field. Never fails: rejected drops
    /// come back as [`DropOutcome::Discarded`] and leave the store untouched.
    pub fn drop_at(
        &mut self,
        pointer_x: f64,
        pointer_y: f64,
        surface: &RenderSurfaceAdapter,
        store: &mut FieldStore,
        placement: &PlacementSettings,
    ) -> DropOutcome {
        self.hover = false;
        let source = match std::mem::take(&mut self.state) {
            DragState::Dragging(source) => source,
            other => {
                self.state = other;
                return DropOutcome::Discarded(DropDiscard::NotDragging);
            }
        };

        let outcome = match Self::resolve(pointer_x, pointer_y, surface) {
            Ok(point) => Self::commit(source, point, surface.page_number(), store, placement),
            Err(e) => DropOutcome::Discarded(e.into()),
        };

        match &outcome {
            DropOutcome::Discarded(reason) => {
                tracing::debug!("Drop from {} discarded: {}", source, reason);
                self.state = DragState::Idle;
                self.publish(DragEvent::Discarded {
                    reason: reason.to_string(),
                });
            }
            DropOutcome::Created(id) | DropOutcome::Moved(id) => {
                self.state = DragState::Dropped(outcome.clone());
                self.publish(DragEvent::Dropped { id: *id });
            }
        }
        outcome
    }

    fn resolve(
        pointer_x: f64,
        pointer_y: f64,
        surface: &RenderSurfaceAdapter,
    ) -> Result<PercentPoint, PlacementError> {
        let bounds = surface
            .current_bounding_box()
            .ok_or(PlacementError::RenderSurfaceUnavailable)?;
        Ok(to_percent(pointer_x, pointer_y, &bounds)?)
    }

    fn commit(
        source: DragSource,
        point: PercentPoint,
        page: u32,
        store: &mut FieldStore,
        placement: &PlacementSettings,
    ) -> DropOutcome {
        match source {
            DragSource::PaletteItem(field_type) => {
                let width = placement.default_field_width_percent;
                let height = placement.default_field_height_percent;
                let corner = clamp_to_bounds(point.x, point.y, width, height);
                let draft = FieldDraft::new(field_type, page, corner, width, height);
                match store.add(draft) {
                    Ok(id) => DropOutcome::Created(id),
                    Err(e) => DropOutcome::Discarded(e.into()),
                }
            }
            DragSource::ExistingField(id) => {
                let Some(field) = store.get(id) else {
                    return DropOutcome::Discarded(PlacementError::NotFound { id }.into());
                };
                let corner =
                    clamp_to_bounds(point.x, point.y, field.width_percent, field.height_percent);
                match store.update(id, FieldPatch::position(corner)) {
                    Ok(_) => DropOutcome::Moved(id),
                    Err(e) => DropOutcome::Discarded(e.into()),
                }
            }
        }
    }
}
