//! Render surface adapter.
//!
//! Tracks which page is shown at what zoom, and the pixel bounding box of
//! that rendered page. The bounding box is only handed out once it has been
//! observed for the current `(page, scale)`: any page change, zoom change,
//! document load, or container resize makes the previous box stale until the
//! renderer reports again.
//!
//! Rasterising the PDF is not done here. A [`PageRenderer`] does that and
//! reports the resulting page box back.

use crate::coordinates::BoundingRect;
use signkit_core::{AppEvent, DocumentError, EventBus, SurfaceEvent};
use signkit_settings::ViewerSettings;
use std::sync::Arc;

const SCALE_TOLERANCE: f64 = 1e-9;

/// A page rendered at a given scale, with its on-screen box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPage {
    pub page: u32,
    pub scale: f64,
    pub bounds: BoundingRect,
}

/// External document renderer.
pub trait PageRenderer {
    /// Opens the document and returns its page count.
    fn load(&mut self) -> Result<u32, DocumentError>;

    /// Renders one page and returns where it landed on screen.
    fn render_page(&mut self, page: u32, scale: f64) -> Result<RenderedPage, DocumentError>;
}

/// Renderer with a fixed page size, used headless and in tests.
///
/// Every page is `page_width x page_height` pixels at scale 1.0, placed at
/// `(left, top)` in the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPageRenderer {
    num_pages: u32,
    page_width: f64,
    page_height: f64,
    left: f64,
    top: f64,
    failure: Option<String>,
}

impl FixedPageRenderer {
    pub fn new(num_pages: u32, page_width: f64, page_height: f64) -> Self {
        Self {
            num_pages,
            page_width,
            page_height,
            left: 0.0,
            top: 0.0,
            failure: None,
        }
    }

    /// Places the page origin at `(left, top)` viewport pixels.
    pub fn with_origin(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// A renderer whose load always fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new(0, 0.0, 0.0)
        }
    }

    /// Page width in pixels at scale 1.0.
    pub fn page_width(&self) -> f64 {
        self.page_width
    }
}

impl PageRenderer for FixedPageRenderer {
    fn load(&mut self) -> Result<u32, DocumentError> {
        match &self.failure {
            Some(message) => Err(DocumentError::LoadFailed {
                message: message.clone(),
            }),
            None => Ok(self.num_pages),
        }
    }

    fn render_page(&mut self, page: u32, scale: f64) -> Result<RenderedPage, DocumentError> {
        if page == 0 || page > self.num_pages {
            return Err(DocumentError::PageOutOfRange {
                page,
                num_pages: self.num_pages,
            });
        }
        Ok(RenderedPage {
            page,
            scale,
            bounds: BoundingRect::new(
                self.left,
                self.top,
                self.page_width * scale,
                self.page_height * scale,
            ),
        })
    }
}

/// Lifecycle of the document behind the surface.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SurfaceStatus {
    #[default]
    NoDocument,
    Loading,
    Ready {
        num_pages: u32,
    },
    Failed {
        message: String,
    },
}

/// Page, zoom, and bounding-box state of the rendered document.
#[derive(Debug, Clone)]
pub struct RenderSurfaceAdapter {
    status: SurfaceStatus,
    page_number: u32,
    scale: f64,
    viewer: ViewerSettings,
    observed: Option<RenderedPage>,
    bus: Option<Arc<EventBus>>,
}

impl RenderSurfaceAdapter {
    /// `viewer` must already be validated; `min_scale <= max_scale` is assumed.
    pub fn new(viewer: ViewerSettings) -> Self {
        Self {
            status: SurfaceStatus::NoDocument,
            page_number: 1,
            scale: viewer.initial_scale,
            viewer,
            observed: None,
            bus: None,
        }
    }

    /// Publishes surface changes on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    fn publish(&self, event: SurfaceEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Surface(event));
        }
    }

    fn invalidate(&mut self) {
        if self.observed.take().is_some() {
            self.publish(SurfaceEvent::Invalidated);
        }
    }

    pub fn status(&self) -> &SurfaceStatus {
        &self.status
    }

    /// Page count of the loaded document.
    pub fn num_pages(&self) -> Option<u32> {
        match self.status {
            SurfaceStatus::Ready { num_pages } => Some(num_pages),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, SurfaceStatus::Ready { .. })
    }

    /// Message of the last load failure.
    pub fn load_error(&self) -> Option<&str> {
        match &self.status {
            SurfaceStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Document lifecycle
    // ---------------------------------------------------------------------

    /// A new file was handed to the renderer. Resets to page 1.
    pub fn begin_loading(&mut self) {
        self.status = SurfaceStatus::Loading;
        self.page_number = 1;
        self.invalidate();
    }

    /// The renderer reported the page count.
    pub fn on_document_loaded(&mut self, num_pages: u32) {
        if num_pages == 0 {
            self.on_load_error("document has no pages");
            return;
        }
        self.status = SurfaceStatus::Ready { num_pages };
        self.page_number = 1;
        self.invalidate();
        tracing::info!("Document loaded with {} pages", num_pages);
        self.publish(SurfaceEvent::DocumentLoaded { num_pages });
    }

    /// The renderer failed to load the document.
    pub fn on_load_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("Failed to load document: {}", message);
        self.status = SurfaceStatus::Failed {
            message: message.clone(),
        };
        self.invalidate();
        self.publish(SurfaceEvent::LoadFailed { message });
    }

    /// Loads a document through `renderer` and renders its first page.
    pub fn load(&mut self, renderer: &mut dyn PageRenderer) -> Result<u32, DocumentError> {
        self.begin_loading();
        match renderer.load() {
            Ok(num_pages) => {
                self.on_document_loaded(num_pages);
                if let SurfaceStatus::Failed { message } = &self.status {
                    return Err(DocumentError::LoadFailed {
                        message: message.clone(),
                    });
                }
                self.sync(renderer)?;
                Ok(num_pages)
            }
            Err(e) => {
                let message = match &e {
                    DocumentError::LoadFailed { message } if !message.is_empty() => {
                        message.clone()
                    }
                    DocumentError::LoadFailed { .. } => "Failed to load PDF".to_string(),
                    other => other.to_string(),
                };
                self.on_load_error(message);
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Page navigation
    // ---------------------------------------------------------------------

    /// Current 1-based page.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Moves to `page`, clamped to the document. Returns the page shown.
    pub fn set_page(&mut self, page: u32) -> u32 {
        let last = self.num_pages().unwrap_or(1);
        let page = page.clamp(1, last);
        if page != self.page_number {
            self.page_number = page;
            self.invalidate();
            tracing::debug!("Page {} of {}", page, last);
            self.publish(SurfaceEvent::PageChanged { page });
        }
        self.page_number
    }

    /// Moves to `page`, failing when it is not in the document.
    pub fn go_to_page(&mut self, page: u32) -> Result<u32, DocumentError> {
        let num_pages = self.num_pages().unwrap_or(0);
        if page == 0 || page > num_pages {
            return Err(DocumentError::PageOutOfRange { page, num_pages });
        }
        Ok(self.set_page(page))
    }

    pub fn next_page(&mut self) -> u32 {
        self.set_page(self.page_number.saturating_add(1))
    }

    pub fn previous_page(&mut self) -> u32 {
        self.set_page(self.page_number.saturating_sub(1))
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.num_pages().unwrap_or(1)
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    // ---------------------------------------------------------------------
    // Zoom
    // ---------------------------------------------------------------------

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale as a whole percentage, as shown next to the zoom controls.
    pub fn zoom_percent(&self) -> u32 {
        (self.scale * 100.0).round() as u32
    }

    /// Sets the scale, clamped to the configured bounds. Non-finite input is
    /// ignored. Returns the scale in effect.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if !scale.is_finite() {
            tracing::debug!("Ignoring non-finite scale");
            return self.scale;
        }
        let scale = scale.clamp(self.viewer.min_scale, self.viewer.max_scale);
        if (scale - self.scale).abs() > SCALE_TOLERANCE {
            self.scale = scale;
            self.invalidate();
            self.publish(SurfaceEvent::ScaleChanged { scale });
        }
        self.scale
    }

    // Steps in whole percent so repeated clicks land on exact values.
    fn step_percent(&self) -> i64 {
        ((self.viewer.scale_step * 100.0).round() as i64).max(1)
    }

    pub fn zoom_in(&mut self) -> f64 {
        let percent = i64::from(self.zoom_percent()) + self.step_percent();
        self.set_scale(percent as f64 / 100.0)
    }

    pub fn zoom_out(&mut self) -> f64 {
        let percent = i64::from(self.zoom_percent()) - self.step_percent();
        self.set_scale(percent as f64 / 100.0)
    }

    /// Back to 100%.
    pub fn reset_zoom(&mut self) -> f64 {
        self.set_scale(signkit_core::constants::ACTUAL_SIZE_SCALE)
    }

    /// Scales the page so its width fills `container_width` pixels.
    ///
    /// `page_width` is the page width at scale 1.0.
    pub fn fit_to_width(&mut self, container_width: f64, page_width: f64) -> f64 {
        if !(container_width > 0.0 && page_width > 0.0) {
            return self.scale;
        }
        // Nudge before flooring so 750/500 lands on 150, not 149.
        let percent = (container_width / page_width * 100.0 + 1e-6).floor();
        self.set_scale(percent / 100.0)
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < self.viewer.max_scale - SCALE_TOLERANCE
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > self.viewer.min_scale + SCALE_TOLERANCE
    }

    // ---------------------------------------------------------------------
    // Bounding box
    // ---------------------------------------------------------------------

    /// The renderer finished a page. Stale renders are ignored.
    ///
    /// Returns true when the render matched the current page and scale.
    pub fn on_page_rendered(&mut self, rendered: RenderedPage) -> bool {
        let current = self.is_ready()
            && rendered.page == self.page_number
            && (rendered.scale - self.scale).abs() <= SCALE_TOLERANCE;
        if !current {
            tracing::debug!(
                "Ignoring stale render of page {} at {:.2}",
                rendered.page,
                rendered.scale
            );
            return false;
        }
        self.observed = Some(rendered);
        let b = rendered.bounds;
        self.publish(SurfaceEvent::BoundsChanged {
            left: b.left,
            top: b.top,
            width: b.width,
            height: b.height,
        });
        true
    }

    /// The viewport container changed size; the page box must be re-read.
    pub fn on_container_resized(&mut self) {
        self.invalidate();
    }

    /// The rendered page element itself reported a new box.
    pub fn on_element_resized(&mut self, bounds: BoundingRect) {
        if !self.is_ready() {
            return;
        }
        self.on_page_rendered(RenderedPage {
            page: self.page_number,
            scale: self.scale,
            bounds,
        });
    }

    /// Page and scale still waiting for a render, if any.
    pub fn pending_render(&self) -> Option<(u32, f64)> {
        if self.is_ready() && self.current_bounding_box().is_none() {
            Some((self.page_number, self.scale))
        } else {
            None
        }
    }

    /// Asks `renderer` for the current page when the box is stale.
    pub fn sync(
        &mut self,
        renderer: &mut dyn PageRenderer,
    ) -> Result<Option<BoundingRect>, DocumentError> {
        if let Some((page, scale)) = self.pending_render() {
            let rendered = renderer.render_page(page, scale).map_err(|e| {
                tracing::warn!("Render of page {} failed: {}", page, e);
                e
            })?;
            self.on_page_rendered(rendered);
        }
        Ok(self.current_bounding_box())
    }

    /// Box of the currently rendered page, or `None` while it is unknown.
    ///
    /// Never returns a box without area.
    pub fn current_bounding_box(&self) -> Option<BoundingRect> {
        if !self.is_ready() {
            return None;
        }
        self.observed
            .filter(|r| {
                r.page == self.page_number && (r.scale - self.scale).abs() <= SCALE_TOLERANCE
            })
            .map(|r| r.bounds)
            .filter(BoundingRect::has_area)
    }

    /// Pixel size of the overlay layer sitting on the page.
    pub fn overlay_size(&self) -> Option<(f64, f64)> {
        self.current_bounding_box().map(|b| (b.width, b.height))
    }
}

impl Default for RenderSurfaceAdapter {
    fn default() -> Self {
        Self::new(ViewerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(pages: u32) -> (RenderSurfaceAdapter, FixedPageRenderer) {
        let mut surface = RenderSurfaceAdapter::default();
        let mut renderer = FixedPageRenderer::new(pages, 500.0, 700.0);
        surface.load(&mut renderer).unwrap();
        (surface, renderer)
    }

    #[test]
    fn test_unavailable_before_load() {
        let surface = RenderSurfaceAdapter::default();
        assert_eq!(surface.current_bounding_box(), None);
        assert_eq!(surface.overlay_size(), None);
        assert_eq!(surface.zoom_percent(), 120);
    }

    #[test]
    fn test_load_renders_first_page() {
        let (surface, _) = loaded(3);
        assert_eq!(surface.num_pages(), Some(3));
        assert_eq!(surface.page_number(), 1);
        let bounds = surface.current_bounding_box().unwrap();
        assert!((bounds.width - 600.0).abs() < 1e-9);
        assert!((bounds.height - 840.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_failure_sets_error_state() {
        let mut surface = RenderSurfaceAdapter::default();
        let mut renderer = FixedPageRenderer::failing("corrupt xref");
        assert!(surface.load(&mut renderer).is_err());
        assert_eq!(surface.load_error(), Some("corrupt xref"));
        assert_eq!(surface.current_bounding_box(), None);
    }

    #[test]
    fn test_zero_page_document_is_a_load_error() {
        let mut surface = RenderSurfaceAdapter::default();
        let mut renderer = FixedPageRenderer::new(0, 500.0, 700.0);
        assert!(surface.load(&mut renderer).is_err());
        assert!(surface.load_error().is_some());
    }

    #[test]
    fn test_page_change_invalidates_until_rerender() {
        let (mut surface, mut renderer) = loaded(3);
        assert_eq!(surface.next_page(), 2);
        assert_eq!(surface.current_bounding_box(), None);
        assert_eq!(surface.pending_render(), Some((2, 1.2)));

        surface.sync(&mut renderer).unwrap();
        assert!(surface.current_bounding_box().is_some());
    }

    #[test]
    fn test_page_navigation_clamps() {
        let (mut surface, _) = loaded(2);
        assert_eq!(surface.previous_page(), 1);
        assert_eq!(surface.next_page(), 2);
        assert_eq!(surface.next_page(), 2);
        assert!(!surface.has_next_page());
        assert!(surface.go_to_page(5).is_err());
        assert_eq!(surface.go_to_page(1).unwrap(), 1);
    }

    #[test]
    fn test_stale_render_is_ignored() {
        let (mut surface, mut renderer) = loaded(3);
        let stale = renderer.render_page(1, 1.2).unwrap();
        surface.next_page();
        assert!(!surface.on_page_rendered(stale));
        assert_eq!(surface.current_bounding_box(), None);
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        let (mut surface, _) = loaded(1);
        assert_eq!(surface.zoom_percent(), 120);
        surface.zoom_in();
        assert_eq!(surface.zoom_percent(), 130);
        assert_eq!(surface.current_bounding_box(), None);

        for _ in 0..20 {
            surface.zoom_in();
        }
        assert_eq!(surface.scale(), 2.0);
        assert!(!surface.can_zoom_in());

        for _ in 0..30 {
            surface.zoom_out();
        }
        assert_eq!(surface.scale(), 0.5);
        assert_eq!(surface.zoom_percent(), 50);
    }

    #[test]
    fn test_reset_and_fit() {
        let (mut surface, _) = loaded(1);
        surface.reset_zoom();
        assert_eq!(surface.zoom_percent(), 100);

        surface.fit_to_width(750.0, 500.0);
        assert_eq!(surface.zoom_percent(), 150);

        surface.fit_to_width(5000.0, 500.0);
        assert_eq!(surface.scale(), 2.0);

        let before = surface.scale();
        surface.fit_to_width(0.0, 500.0);
        assert_eq!(surface.scale(), before);
    }

    #[test]
    fn test_set_scale_ignores_nan() {
        let (mut surface, _) = loaded(1);
        assert_eq!(surface.set_scale(f64::NAN), 1.2);
    }

    #[test]
    fn test_container_resize_invalidates() {
        let (mut surface, mut renderer) = loaded(1);
        surface.on_container_resized();
        assert_eq!(surface.current_bounding_box(), None);
        surface.sync(&mut renderer).unwrap();
        assert!(surface.current_bounding_box().is_some());
    }

    #[test]
    fn test_element_resize_updates_box() {
        let (mut surface, _) = loaded(1);
        surface.on_element_resized(BoundingRect::new(10.0, 10.0, 300.0, 400.0));
        assert_eq!(surface.overlay_size(), Some((300.0, 400.0)));

        surface.on_element_resized(BoundingRect::new(10.0, 10.0, 0.0, 400.0));
        assert_eq!(surface.current_bounding_box(), None);
    }

    #[test]
    fn test_new_document_resets_page() {
        let (mut surface, _) = loaded(3);
        surface.set_page(3);
        let mut other = FixedPageRenderer::new(5, 500.0, 700.0);
        surface.load(&mut other).unwrap();
        assert_eq!(surface.page_number(), 1);
        assert_eq!(surface.num_pages(), Some(5));
    }
}
