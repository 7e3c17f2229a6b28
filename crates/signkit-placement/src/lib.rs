//! # SignKit Placement
//!
//! Field placement and coordinate mapping for SignKit documents. Users drag
//! field types from a palette onto a rendered PDF page; this crate turns the
//! drop pointer into page-relative percentages, keeps the placed fields in a
//! store, and maps them back to pixels at whatever zoom the page is shown.
//!
//! ## Core Components
//!
//! - **Coordinates**: pixel to percentage mapping and bounds clamping
//! - **Field Store**: placed fields, keyed by id, validated on every write
//! - **Render Surface**: page, zoom, and the on-screen box of the page
//! - **Drag and Drop**: one drag gesture at a time, from palette or field
//! - **Editing**: click-to-edit prompts and checkbox/radio handling
//! - **Recipients**: the roster, dense signing order, field assignment
//! - **Directory**: team-member and customer search
//! - **Transaction**: versioned JSON export, legacy pixel import
//!
//! ## Architecture
//!
//! ```text
//! DocumentSession
//!   ├── RenderSurfaceAdapter ── PageRenderer (external)
//!   ├── DragDropController ─┐
//!   ├── FieldStore <────────┘
//!   ├── RecipientRoster
//!   └── EventBus (shared by all of the above)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signkit_placement::{DocumentInfo, DocumentSession, FieldType, FixedPageRenderer};
//!
//! let mut session = DocumentSession::new(Config::default())?;
//! let info = DocumentInfo::new("contract.pdf", "application/pdf", 2048);
//! session.open_document(info, Box::new(FixedPageRenderer::new(3, 500.0, 700.0)))?;
//!
//! session.begin_palette_drag(FieldType::Signature)?;
//! let id = session.drop_at(150.0, 150.0).field_id();
//! ```

pub mod coordinates;
pub mod directory;
pub mod drag_drop;
pub mod editing;
pub mod field_store;
pub mod model;
pub mod recipients;
pub mod render_surface;
pub mod session;
pub mod transaction;

pub use coordinates::{
    clamp_to_bounds, field_rect_to_pixels, to_percent, to_pixels, BoundingRect, PercentPoint,
};
pub use directory::{DirectoryEntry, RecipientDirectory, StaticDirectory, MIN_QUERY_LEN};
pub use drag_drop::{
    DragDropController, DragError, DragSource, DragState, DropDiscard, DropOutcome,
};
pub use editing::{
    apply_edit, prompt_for, select_radio_value, toggle_checkbox, EditOutcome, EditPrompt,
    RecipientPopover,
};
pub use field_store::FieldStore;
pub use model::{CheckState, Field, FieldDraft, FieldKind, FieldPatch, FieldType};
pub use recipients::{assign, Recipient, RecipientRoster, RecipientType, Role};
pub use render_surface::{
    FixedPageRenderer, PageRenderer, RenderSurfaceAdapter, RenderedPage, SurfaceStatus,
};
pub use session::{DocumentSession, FieldOverlay};
pub use transaction::{
    migrate_legacy_field, DocumentInfo, Transaction, TransactionFile, TransactionStatus,
};
