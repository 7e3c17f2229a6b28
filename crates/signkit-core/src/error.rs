//! Error handling for SignKit
//!
//! Provides error types for every layer of the placement core:
//! - Coordinate rejections (drops that must be silently discarded)
//! - Placement errors (field store contract violations)
//! - Recipient errors (roster and signing order)
//! - Document errors (upload and render-load failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use crate::types::{FieldId, RecipientId};
use thiserror::Error;

/// Why a pointer position could not be turned into page percentages.
///
/// Every variant is an expected edge case. Callers discard the drop
/// without surfacing anything to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CoordinateRejection {
    /// The render surface has zero or negative size.
    #[error("render surface has no area ({width}x{height})")]
    EmptySurface {
        /// Surface width in pixels.
        width: f64,
        /// Surface height in pixels.
        height: f64,
    },

    /// The pointer was released outside the render surface.
    #[error("pointer ({x:.1}, {y:.1}) is outside the render surface")]
    OutsideSurface {
        /// Pointer x relative to the surface origin.
        x: f64,
        /// Pointer y relative to the surface origin.
        y: f64,
    },

    /// The conversion produced NaN or infinity.
    #[error("coordinate conversion produced a non-finite value")]
    NonFinite,
}

/// Placement error type
///
/// Represents failures of field store operations and field edits.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// The drop position could not be mapped onto the page
    #[error("Coordinate rejected: {0}")]
    CoordinateRejected(#[from] CoordinateRejection),

    /// The rendered page bounding box is not known yet
    #[error("Render surface unavailable")]
    RenderSurfaceUnavailable,

    /// A field failed structural validation
    #[error("Validation failed: {reason}")]
    Validation {
        /// The reason validation failed.
        reason: String,
    },

    /// The referenced field does not exist
    #[error("Field not found: {id}")]
    NotFound {
        /// The missing field id.
        id: FieldId,
    },

    /// A value is not acceptable for the field type
    #[error("Invalid value {value:?} for {field_type} field")]
    InvalidValue {
        /// The field type name.
        field_type: String,
        /// The rejected value.
        value: String,
    },
}

impl PlacementError {
    /// Create a validation error from a message
    pub fn validation(reason: impl Into<String>) -> Self {
        PlacementError::Validation {
            reason: reason.into(),
        }
    }

    /// True for the failures a drop swallows silently.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            PlacementError::CoordinateRejected(_) | PlacementError::RenderSurfaceUnavailable
        )
    }
}

/// Recipient error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecipientError {
    /// The referenced recipient does not exist
    #[error("Recipient not found: {id}")]
    NotFound {
        /// The missing recipient id.
        id: RecipientId,
    },

    /// Signing order only applies to signers
    #[error("{id} is not a signer")]
    NotASigner {
        /// The recipient that is not a signer.
        id: RecipientId,
    },

    /// Requested order is outside 1..=signer count
    #[error("Signing order {order} out of range 1..={max}")]
    OrderOutOfRange {
        /// The requested order.
        order: u32,
        /// The current number of signers.
        max: u32,
    },

    /// An imported roster is malformed
    #[error("Invalid recipients: {reason}")]
    Validation {
        /// The reason the roster was refused.
        reason: String,
    },
}

impl RecipientError {
    /// Create a validation error from a message
    pub fn validation(reason: impl Into<String>) -> Self {
        RecipientError::Validation {
            reason: reason.into(),
        }
    }
}

/// Document error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Uploaded file is not a PDF
    #[error("Please upload a PDF file. Selected file type: {mime_type}")]
    UnsupportedFileType {
        /// The MIME type of the rejected file.
        mime_type: String,
    },

    /// The external renderer failed to load the document
    #[error("Failed to load PDF: {message}")]
    LoadFailed {
        /// Renderer-provided message.
        message: String,
    },

    /// A page outside the loaded document was requested
    #[error("Page {page} out of range 1..={num_pages}")]
    PageOutOfRange {
        /// The requested page.
        page: u32,
        /// Number of pages in the document.
        num_pages: u32,
    },
}

/// Main error type for SignKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Placement error
    #[error(transparent)]
    Placement(#[from] PlacementError),

    /// Recipient error
    #[error(transparent)]
    Recipient(#[from] RecipientError),

    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a placement error
    pub fn is_placement_error(&self) -> bool {
        matches!(self, Error::Placement(_))
    }

    /// Check if this is a recipient error
    pub fn is_recipient_error(&self) -> bool {
        matches!(self, Error::Recipient(_))
    }

    /// Check if this is a missing-field error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Placement(PlacementError::NotFound { .. })
                | Error::Recipient(RecipientError::NotFound { .. })
        )
    }
}

impl From<CoordinateRejection> for Error {
    fn from(rejection: CoordinateRejection) -> Self {
        Error::Placement(PlacementError::CoordinateRejected(rejection))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_error_display() {
        let err = PlacementError::validation("page must be >= 1");
        assert_eq!(err.to_string(), "Validation failed: page must be >= 1");

        let err = PlacementError::NotFound { id: FieldId(7) };
        assert_eq!(err.to_string(), "Field not found: field#7");
    }

    #[test]
    fn test_rejection_classification() {
        let rejected: PlacementError = CoordinateRejection::NonFinite.into();
        assert!(rejected.is_rejection());
        assert!(PlacementError::RenderSurfaceUnavailable.is_rejection());
        assert!(!PlacementError::validation("x").is_rejection());
    }

    #[test]
    fn test_document_error_message() {
        let err = DocumentError::UnsupportedFileType {
            mime_type: "image/png".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Please upload a PDF file. Selected file type: image/png"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = PlacementError::NotFound { id: FieldId(1) }.into();
        assert!(err.is_placement_error());
        assert!(err.is_not_found());

        let err: Error = RecipientError::OrderOutOfRange { order: 4, max: 3 }.into();
        assert!(err.is_recipient_error());
        assert!(!err.is_not_found());

        let err: Error = CoordinateRejection::NonFinite.into();
        assert!(matches!(
            err,
            Error::Placement(PlacementError::CoordinateRejected(_))
        ));
    }
}
