//! # SignKit
//!
//! Field placement and recipient assignment for e-signature documents:
//! - Drag-and-drop of signature, text, date, and form fields onto PDF pages
//! - Resolution-independent positions stored as page percentages
//! - Recipient roster with a dense signing order
//! - Versioned transaction files, with import of older pixel-based files
//!
//! ## Architecture
//!
//! SignKit is organized as a workspace with multiple crates:
//!
//! 1. **signkit-core** - Errors, constants, identifiers, event bus
//! 2. **signkit-settings** - Placement defaults, zoom bounds, theme palette
//! 3. **signkit-placement** - Coordinate mapping, field store, drag-drop, session
//! 4. **signkit** - This facade plus the headless replay binary

pub mod script;

pub use signkit_core::{
    AppEvent, CoordinateRejection, DocumentError, DragEvent, Error, EventBus, EventBusConfig,
    EventCategory, EventFilter, FieldEvent, FieldId, PlacementError, RecipientError,
    RecipientEvent, RecipientId, Result, SurfaceEvent,
};

pub use signkit_placement::{
    BoundingRect, CheckState, DirectoryEntry, DocumentInfo, DocumentSession, DropOutcome,
    EditOutcome, EditPrompt, Field, FieldKind, FieldStore, FieldType, FixedPageRenderer,
    PageRenderer, PercentPoint, Recipient, RecipientDirectory, RecipientRoster, RecipientType,
    Role, StaticDirectory, Transaction, TransactionFile,
};

pub use signkit_settings::{Config, PlacementSettings, ThemeSettings, ViewerSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so stdout stays free for the transaction JSON
/// - RUST_LOG environment variable support (default `info`)
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
