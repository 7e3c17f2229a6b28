//! Fixed placement and viewer constants.
//!
//! These values are the built-in defaults; `signkit-settings` may override
//! the sizing and zoom values per installation.

/// Width of a newly dropped field, as a percentage of the page width.
pub const DEFAULT_FIELD_WIDTH_PERCENT: f64 = 25.0;

/// Height of a newly dropped field, as a percentage of the page height.
pub const DEFAULT_FIELD_HEIGHT_PERCENT: f64 = 6.0;

/// Smallest allowed render scale (50%).
pub const MIN_SCALE: f64 = 0.5;

/// Largest allowed render scale (200%).
pub const MAX_SCALE: f64 = 2.0;

/// Zoom step applied by the zoom in/out controls (10 percentage points).
pub const SCALE_STEP: f64 = 0.1;

/// Scale a freshly opened document is rendered at.
pub const INITIAL_SCALE: f64 = 1.2;

/// The "100%" zoom preset.
pub const ACTUAL_SIZE_SCALE: f64 = 1.0;

/// Value written to a signature field when the prompt is confirmed empty.
pub const DEFAULT_SIGNATURE_TEXT: &str = "✓ Signed";

/// Options offered when a radio field is edited for the first time.
pub const DEFAULT_RADIO_OPTIONS: &str = "Yes, No";

/// Value a radio field takes after its options are edited with nothing selected.
pub const RADIO_NOT_SELECTED: &str = "Not selected";

/// Reference surface width used to convert legacy pixel positions.
pub const LEGACY_SURFACE_WIDTH: f64 = 800.0;

/// Reference surface height used to convert legacy pixel positions.
pub const LEGACY_SURFACE_HEIGHT: f64 = 600.0;

/// Legacy default field width in pixels.
pub const LEGACY_FIELD_WIDTH: f64 = 200.0;

/// Legacy default field height in pixels.
pub const LEGACY_FIELD_HEIGHT: f64 = 40.0;

/// The only document MIME type accepted on upload.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Largest field or recipient id accepted from outside (2^53 - 1).
///
/// Ids above this do not survive a round trip through a JSON number.
pub const MAX_ID: u64 = (1 << 53) - 1;

/// Tolerance used when comparing percentage coordinates.
pub const PERCENT_EPSILON: f64 = 1e-9;
