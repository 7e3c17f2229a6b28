//! # SignKit Core
//!
//! Core types and utilities shared by the SignKit crates.
//! Provides the error taxonomy, the fixed placement constants, and the
//! event bus that carries change notifications from the field store,
//! recipient roster, and render surface to whoever renders them.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod types;

pub use error::{
    CoordinateRejection, DocumentError, Error, PlacementError, RecipientError, Result,
};

pub use event_bus::{
    AppEvent, DragEvent, EventBus, EventBusConfig, EventBusError, EventCategory, EventFilter,
    FieldEvent, RecipientEvent, SubscriptionId, SurfaceEvent,
};

pub use types::{FieldId, RecipientId};
