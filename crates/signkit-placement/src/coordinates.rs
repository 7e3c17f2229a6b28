//! Coordinate mapping between the rendered page and stored field positions.
//!
//! Pointer coordinates arrive in viewport pixels. Fields are stored as
//! percentages of the rendered page, so a layout stays valid at every zoom
//! level and viewport size. Pixels are only ever derived for drawing.
//!
//! ```text
//! x_percent = (pointer_x - left) / width  * 100
//! y_percent = (pointer_y - top)  / height * 100
//!
//! pixel_x = left + x_percent / 100 * width
//! pixel_y = top  + y_percent / 100 * height
//! ```

use serde::{Deserialize, Serialize};
use signkit_core::CoordinateRejection;

/// Pixel bounding box of the rendered page, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    /// Creates a new bounding box.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// True when both dimensions are strictly positive.
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// True when the viewport point lies on or inside the edges.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// A position expressed in page percentages (0..=100 on each axis).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentPoint {
    pub x: f64,
    pub y: f64,
}

impl PercentPoint {
    /// Creates a new percentage point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True when both components are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Converts a viewport pointer position into page percentages.
///
/// Rejects a surface without area, a pointer outside the surface, and any
/// non-finite result. A rejection must never reach the field store.
pub fn to_percent(
    pointer_x: f64,
    pointer_y: f64,
    rect: &BoundingRect,
) -> Result<PercentPoint, CoordinateRejection> {
    if !rect.has_area() {
        return Err(CoordinateRejection::EmptySurface {
            width: rect.width,
            height: rect.height,
        });
    }

    let x = pointer_x - rect.left;
    let y = pointer_y - rect.top;
    if !x.is_finite() || !y.is_finite() {
        return Err(CoordinateRejection::NonFinite);
    }
    if x < 0.0 || y < 0.0 || x > rect.width || y > rect.height {
        return Err(CoordinateRejection::OutsideSurface { x, y });
    }

    let point = PercentPoint::new(x / rect.width * 100.0, y / rect.height * 100.0);
    if !point.is_finite() {
        return Err(CoordinateRejection::NonFinite);
    }
    Ok(point)
}

/// Clamps a top-left corner so the whole field stays on the page.
///
/// `max = 100 - size`, floored at zero for fields larger than the page.
/// NaN components collapse to zero.
pub fn clamp_to_bounds(
    x_percent: f64,
    y_percent: f64,
    width_percent: f64,
    height_percent: f64,
) -> PercentPoint {
    let max_x = (100.0 - width_percent).max(0.0);
    let max_y = (100.0 - height_percent).max(0.0);
    PercentPoint::new(
        x_percent.max(0.0).min(max_x),
        y_percent.max(0.0).min(max_y),
    )
}

/// Converts page percentages back into viewport pixels (rendering only).
pub fn to_pixels(x_percent: f64, y_percent: f64, rect: &BoundingRect) -> (f64, f64) {
    (
        rect.left + x_percent / 100.0 * rect.width,
        rect.top + y_percent / 100.0 * rect.height,
    )
}

/// Converts a percentage-sized field into its pixel box on the surface.
pub fn field_rect_to_pixels(
    position: PercentPoint,
    width_percent: f64,
    height_percent: f64,
    rect: &BoundingRect,
) -> BoundingRect {
    let (left, top) = to_pixels(position.x, position.y, rect);
    BoundingRect::new(
        left,
        top,
        width_percent / 100.0 * rect.width,
        height_percent / 100.0 * rect.height,
    )
}
