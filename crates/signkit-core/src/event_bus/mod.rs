//! # Event Bus Module
//!
//! Explicit change notification between the placement core and its
//! renderers. Stores publish an event after each successful mutation;
//! renderers subscribe and re-derive their views (for example the fields of
//! the displayed page) instead of relying on a UI framework's reactivity.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use signkit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Field]),
//!     |event| {
//!         if let AppEvent::Field(change) = event {
//!             println!("field changed: {:?}", change);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
