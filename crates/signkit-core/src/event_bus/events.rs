//! Event type definitions for the event bus.
//!
//! Events are published after a mutation has been applied, never before and
//! never for a mutation that failed. They are cloneable and serializable so a
//! renderer can log or replay them.

use serde::{Deserialize, Serialize};

use crate::types::{FieldId, RecipientId};

/// Root event enum for all session events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Field store mutations
    Field(FieldEvent),
    /// Recipient roster mutations
    Recipient(RecipientEvent),
    /// Render surface state changes
    Surface(SurfaceEvent),
    /// Drag-and-drop gesture transitions
    Drag(DragEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Field(_) => EventCategory::Field,
            AppEvent::Recipient(_) => EventCategory::Recipient,
            AppEvent::Surface(_) => EventCategory::Surface,
            AppEvent::Drag(_) => EventCategory::Drag,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Field(e) => e.description(),
            AppEvent::Recipient(e) => e.description(),
            AppEvent::Surface(e) => e.description(),
            AppEvent::Drag(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Field store events.
    Field,
    /// Recipient roster events.
    Recipient,
    /// Render surface events.
    Surface,
    /// Drag gesture events.
    Drag,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Field => write!(f, "Field"),
            EventCategory::Recipient => write!(f, "Recipient"),
            EventCategory::Surface => write!(f, "Surface"),
            EventCategory::Drag => write!(f, "Drag"),
        }
    }
}

/// Field store events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldEvent {
    /// A field was appended.
    Added {
        /// The new field.
        id: FieldId,
        /// Page the field lives on.
        page: u32,
    },
    /// A field was patched (value, position, recipient, ...).
    Updated {
        /// The patched field.
        id: FieldId,
        /// Page the field lives on.
        page: u32,
    },
    /// A field was deleted.
    Removed {
        /// The deleted field.
        id: FieldId,
        /// Page the field lived on.
        page: u32,
    },
    /// Every field was dropped (new document, import).
    Cleared,
}

impl FieldEvent {
    fn description(&self) -> String {
        match self {
            FieldEvent::Added { id, page } => format!("Added {} on page {}", id, page),
            FieldEvent::Updated { id, page } => format!("Updated {} on page {}", id, page),
            FieldEvent::Removed { id, page } => format!("Removed {} from page {}", id, page),
            FieldEvent::Cleared => "Cleared all fields".to_string(),
        }
    }

    /// Page the changed field is on; `None` for `Cleared`.
    pub fn page(&self) -> Option<u32> {
        match self {
            FieldEvent::Added { page, .. }
            | FieldEvent::Updated { page, .. }
            | FieldEvent::Removed { page, .. } => Some(*page),
            FieldEvent::Cleared => None,
        }
    }
}

/// Recipient roster events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipientEvent {
    /// A recipient joined the transaction.
    Added {
        /// The new recipient.
        id: RecipientId,
    },
    /// Recipient details or role changed.
    Updated {
        /// The changed recipient.
        id: RecipientId,
    },
    /// A recipient left the transaction.
    Removed {
        /// The removed recipient.
        id: RecipientId,
    },
    /// The signing sequence changed.
    OrderChanged {
        /// Signers in signing order.
        signers: Vec<RecipientId>,
    },
}

impl RecipientEvent {
    fn description(&self) -> String {
        match self {
            RecipientEvent::Added { id } => format!("Added {}", id),
            RecipientEvent::Updated { id } => format!("Updated {}", id),
            RecipientEvent::Removed { id } => format!("Removed {}", id),
            RecipientEvent::OrderChanged { signers } => {
                format!("Signing order now has {} signers", signers.len())
            }
        }
    }
}

/// Render surface events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    /// The renderer finished loading a document.
    DocumentLoaded {
        /// Page count reported by the renderer.
        num_pages: u32,
    },
    /// The renderer failed to load a document.
    LoadFailed {
        /// Renderer-provided message.
        message: String,
    },
    /// The displayed page changed.
    PageChanged {
        /// New 1-based page number.
        page: u32,
    },
    /// The zoom factor changed.
    ScaleChanged {
        /// New scale factor.
        scale: f64,
    },
    /// A fresh bounding box was observed for the rendered page.
    BoundsChanged {
        /// Left edge in viewport pixels.
        left: f64,
        /// Top edge in viewport pixels.
        top: f64,
        /// Width in pixels.
        width: f64,
        /// Height in pixels.
        height: f64,
    },
    /// The last bounding box is stale until the next render completes.
    Invalidated,
}

impl SurfaceEvent {
    fn description(&self) -> String {
        match self {
            SurfaceEvent::DocumentLoaded { num_pages } => {
                format!("Document loaded ({} pages)", num_pages)
            }
            SurfaceEvent::LoadFailed { message } => format!("Document load failed: {}", message),
            SurfaceEvent::PageChanged { page } => format!("Page changed to {}", page),
            SurfaceEvent::ScaleChanged { scale } => {
                format!("Scale changed to {}%", (scale * 100.0).round())
            }
            SurfaceEvent::BoundsChanged { width, height, .. } => {
                format!("Surface bounds {:.0}x{:.0}", width, height)
            }
            SurfaceEvent::Invalidated => "Surface bounds invalidated".to_string(),
        }
    }
}

/// Drag gesture events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DragEvent {
    /// A drag began from the palette or from a placed field.
    Started {
        /// Human-readable source description.
        source: String,
    },
    /// The drag ended without a drop.
    Cancelled,
    /// The drop created or moved a field.
    Dropped {
        /// The created or moved field.
        id: FieldId,
    },
    /// The drop was discarded.
    Discarded {
        /// Why the drop was discarded.
        reason: String,
    },
}

impl DragEvent {
    fn description(&self) -> String {
        match self {
            DragEvent::Started { source } => format!("Drag started from {}", source),
            DragEvent::Cancelled => "Drag cancelled".to_string(),
            DragEvent::Dropped { id } => format!("Dropped {}", id),
            DragEvent::Discarded { reason } => format!("Drop discarded: {}", reason),
        }
    }
}
