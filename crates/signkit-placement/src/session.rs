//! Document editing session.
//!
//! Owns everything one transaction edit needs: the field store, the
//! recipient roster, the render surface with its renderer, the drag
//! controller, and the recipient popover. All of them publish on the
//! session's own event bus. Operations that move the view (page, zoom,
//! resize) resynchronise the page box before returning, so the next drop
//! maps against the page actually on screen.

use crate::coordinates::{field_rect_to_pixels, BoundingRect};
use crate::directory::DirectoryEntry;
use crate::drag_drop::{DragDropController, DragError, DragSource, DragState, DropOutcome};
use crate::editing::{self, EditOutcome, RecipientPopover};
use crate::field_store::FieldStore;
use crate::model::{CheckState, Field, FieldType};
use crate::recipients::{self, Recipient, RecipientRoster, RecipientType, Role};
use crate::render_surface::{PageRenderer, RenderSurfaceAdapter};
use crate::transaction::{DocumentInfo, Transaction};
use signkit_core::{DocumentError, EventBus, FieldId, PlacementError, RecipientError, RecipientId};
use signkit_settings::{Config, ConfigError};
use std::fmt;
use std::sync::Arc;

/// Pixel box and colour of one field on the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverlay {
    pub id: FieldId,
    pub rect: BoundingRect,
    /// Colour token of the assigned recipient.
    pub color: Option<String>,
}

/// One transaction being prepared.
pub struct DocumentSession {
    config: Config,
    bus: Arc<EventBus>,
    document: Option<DocumentInfo>,
    renderer: Option<Box<dyn PageRenderer>>,
    surface: RenderSurfaceAdapter,
    fields: FieldStore,
    recipients: RecipientRoster,
    drag: DragDropController,
    popover: RecipientPopover,
}

impl DocumentSession {
    /// Creates a session with its own event bus.
    ///
    /// Fails when `config` does not pass [`Config::validate`].
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::with_event_bus(config, Arc::new(EventBus::new()))
    }

    /// Creates a session publishing on `bus`.
    pub fn with_event_bus(config: Config, bus: Arc<EventBus>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            surface: RenderSurfaceAdapter::new(config.viewer.clone()).with_event_bus(bus.clone()),
            fields: FieldStore::with_event_bus(bus.clone()),
            recipients: RecipientRoster::with_event_bus(bus.clone()),
            drag: DragDropController::with_event_bus(bus.clone()),
            popover: RecipientPopover::default(),
            document: None,
            renderer: None,
            config,
            bus,
        })
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    pub fn fields(&self) -> &FieldStore {
        &self.fields
    }

    pub fn recipients(&self) -> &RecipientRoster {
        &self.recipients
    }

    pub fn surface(&self) -> &RenderSurfaceAdapter {
        &self.surface
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn popover(&self) -> &RecipientPopover {
        &self.popover
    }

    // ---------------------------------------------------------------------
    // Document and view
    // ---------------------------------------------------------------------

    /// Opens an uploaded file with `renderer`. Only PDFs are accepted.
    ///
    /// Returns the page count. Placed fields and recipients are kept.
    pub fn open_document(
        &mut self,
        mut info: DocumentInfo,
        mut renderer: Box<dyn PageRenderer>,
    ) -> Result<u32, DocumentError> {
        if let Err(e) = info.check_type() {
            tracing::warn!("Rejected upload {}: {}", info.name, e);
            return Err(e);
        }
        let loaded = self.surface.load(renderer.as_mut());
        info.num_pages = loaded.as_ref().ok().copied();
        tracing::info!("Opened {} ({} bytes)", info.name, info.size_bytes);
        self.document = Some(info);
        self.renderer = Some(renderer);
        loaded
    }

    /// Brings the page box up to date with the renderer.
    pub fn resync(&mut self) -> Option<BoundingRect> {
        let renderer = self.renderer.as_mut()?;
        match self.surface.sync(renderer.as_mut()) {
            Ok(bounds) => bounds,
            Err(e) => {
                tracing::warn!("Page box unavailable: {}", e);
                None
            }
        }
    }

    pub fn next_page(&mut self) -> u32 {
        let page = self.surface.next_page();
        self.resync();
        page
    }

    pub fn previous_page(&mut self) -> u32 {
        let page = self.surface.previous_page();
        self.resync();
        page
    }

    pub fn go_to_page(&mut self, page: u32) -> Result<u32, DocumentError> {
        let page = self.surface.go_to_page(page)?;
        self.resync();
        Ok(page)
    }

    pub fn zoom_in(&mut self) -> f64 {
        let scale = self.surface.zoom_in();
        self.resync();
        scale
    }

    pub fn zoom_out(&mut self) -> f64 {
        let scale = self.surface.zoom_out();
        self.resync();
        scale
    }

    pub fn reset_zoom(&mut self) -> f64 {
        let scale = self.surface.reset_zoom();
        self.resync();
        scale
    }

    /// Zooms so the page fills `container_width` pixels.
    ///
    /// Needs a known page box to derive the page's natural width.
    pub fn fit_to_width(&mut self, container_width: f64) -> f64 {
        let Some(bounds) = self.resync() else {
            return self.surface.scale();
        };
        let natural_width = bounds.width / self.surface.scale();
        let scale = self.surface.fit_to_width(container_width, natural_width);
        self.resync();
        scale
    }

    /// The viewport container was resized.
    pub fn container_resized(&mut self) {
        self.surface.on_container_resized();
        self.resync();
    }

    // ---------------------------------------------------------------------
    // Drag and drop
    // ---------------------------------------------------------------------

    pub fn begin_palette_drag(&mut self, field_type: FieldType) -> Result<(), DragError> {
        self.drag.begin(DragSource::PaletteItem(field_type))
    }

    pub fn begin_field_drag(&mut self, id: FieldId) -> Result<(), DragError> {
        self.drag.begin(DragSource::ExistingField(id))
    }

    pub fn drag_over(&mut self, pointer_x: f64, pointer_y: f64) -> bool {
        self.drag.drag_over(pointer_x, pointer_y, &self.surface)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Releases the pointer. Rejected drops leave the store untouched.
    pub fn drop_at(&mut self, pointer_x: f64, pointer_y: f64) -> DropOutcome {
        self.drag.drop_at(
            pointer_x,
            pointer_y,
            &self.surface,
            &mut self.fields,
            &self.config.placement,
        )
    }

    // ---------------------------------------------------------------------
    // Field editing
    // ---------------------------------------------------------------------

    /// Fields on the page currently shown.
    pub fn visible_fields(&self) -> impl Iterator<Item = &Field> + Clone + '_ {
        self.fields.by_page(self.surface.page_number())
    }

    /// Pixel boxes of the visible fields, or nothing while the page box is
    /// unknown.
    pub fn field_overlays(&self) -> Vec<FieldOverlay> {
        let Some(bounds) = self.surface.current_bounding_box() else {
            return Vec::new();
        };
        self.visible_fields()
            .map(|field| FieldOverlay {
                id: field.id,
                rect: field_rect_to_pixels(
                    field.position(),
                    field.width_percent,
                    field.height_percent,
                    &bounds,
                ),
                color: field
                    .recipient_id
                    .and_then(|r| self.color_for(r))
                    .map(str::to_string),
            })
            .collect()
    }

    /// Applies the answer to a field's edit prompt (`None` = dismissed).
    pub fn edit_field(
        &mut self,
        id: FieldId,
        response: Option<&str>,
    ) -> Result<EditOutcome, PlacementError> {
        editing::apply_edit(&mut self.fields, id, response)
    }

    pub fn toggle_checkbox(&mut self, id: FieldId) -> Result<CheckState, PlacementError> {
        editing::toggle_checkbox(&mut self.fields, id)
    }

    pub fn select_radio_value(
        &mut self,
        id: FieldId,
        value: &str,
    ) -> Result<(), PlacementError> {
        editing::select_radio_value(&mut self.fields, id, value)
    }

    /// Deletes a field. Deleting an unknown id is a no-op.
    pub fn delete_field(&mut self, id: FieldId) -> Option<Field> {
        editing::delete_field(&mut self.fields, &mut self.popover, id)
    }

    // ---------------------------------------------------------------------
    // Recipients
    // ---------------------------------------------------------------------

    /// Opens the recipient selector next to field `id`.
    pub fn open_recipient_selector(&mut self, id: FieldId) -> Result<(), PlacementError> {
        if !self.fields.contains(id) {
            return Err(PlacementError::NotFound { id });
        }
        self.popover.open(id);
        Ok(())
    }

    pub fn close_recipient_selector(&mut self) {
        self.popover.close();
    }

    /// Assigns a field to a known recipient, or unassigns it. Closes the
    /// selector.
    pub fn assign_recipient(
        &mut self,
        field_id: FieldId,
        recipient_id: Option<RecipientId>,
    ) -> signkit_core::Result<()> {
        if let Some(id) = recipient_id {
            if !self.recipients.contains(id) {
                return Err(RecipientError::NotFound { id }.into());
            }
        }
        recipients::assign(&mut self.fields, field_id, recipient_id)?;
        self.popover.close();
        Ok(())
    }

    /// Adds a blank signer.
    pub fn add_recipient(&mut self, recipient_type: RecipientType) -> RecipientId {
        self.recipients.add(recipient_type)
    }

    /// Fills a recipient from a directory search hit.
    pub fn select_directory_entry(
        &mut self,
        id: RecipientId,
        entry: &DirectoryEntry,
    ) -> Result<&Recipient, RecipientError> {
        self.recipients.apply_directory_entry(id, entry)
    }

    pub fn update_recipient_details(
        &mut self,
        id: RecipientId,
        name: &str,
        email: &str,
    ) -> Result<(), RecipientError> {
        self.recipients.update_details(id, name, email)
    }

    pub fn set_role(&mut self, id: RecipientId, role: Role) -> Result<(), RecipientError> {
        self.recipients.set_role(id, role)
    }

    pub fn reorder(&mut self, id: RecipientId, order: u32) -> Result<(), RecipientError> {
        self.recipients.reorder(id, order)
    }

    /// Removes a recipient and unassigns its fields.
    pub fn remove_recipient(&mut self, id: RecipientId) -> Result<Recipient, RecipientError> {
        let removed = self.recipients.remove(id)?;
        let unassigned = self.fields.unassign_recipient(id);
        if unassigned > 0 {
            tracing::debug!("Unassigned {} fields from {}", unassigned, id);
        }
        Ok(removed)
    }

    /// Colour token for a recipient from the configured palette.
    pub fn color_for(&self, id: RecipientId) -> Option<&str> {
        self.recipients
            .color_for(id, &self.config.theme.recipient_palette)
    }

    // ---------------------------------------------------------------------
    // Transactions
    // ---------------------------------------------------------------------

    /// Snapshot of the session as a pending transaction.
    pub fn transaction(&self) -> Result<Transaction, PlacementError> {
        let transaction = Transaction::new(
            self.document.clone(),
            self.fields.iter().cloned().collect(),
            self.recipients.iter().cloned().collect(),
        );
        transaction.validate()?;
        Ok(transaction)
    }

    /// Replaces fields and recipients with those of `transaction`.
    pub fn import_transaction(&mut self, transaction: Transaction) -> signkit_core::Result<()> {
        transaction.validate()?;
        if let (Some(num_pages), Some(max_page)) = (
            self.surface.num_pages(),
            transaction.fields.iter().map(|f| f.page).max(),
        ) {
            if max_page > num_pages {
                return Err(DocumentError::PageOutOfRange {
                    page: max_page,
                    num_pages,
                }
                .into());
            }
        }
        self.popover.close();
        self.fields.replace_all(transaction.fields)?;
        self.recipients.replace_all(transaction.recipients)?;
        if self.document.is_none() {
            self.document = transaction.document;
        }
        Ok(())
    }
}

impl fmt::Debug for DocumentSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSession")
            .field("document", &self.document)
            .field("surface", &self.surface)
            .field("fields", &self.fields.len())
            .field("recipients", &self.recipients.len())
            .field("drag", self.drag.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_surface::FixedPageRenderer;

    #[test]
    fn test_invalid_config_is_refused() {
        let mut config = Config::default();
        config.viewer.min_scale = 3.0;
        assert!(matches!(
            DocumentSession::new(config),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_recipient_ids_are_not_imported() {
        let mut session = session_with_pdf(1);
        let kept = session.add_recipient(RecipientType::TeamMember);
        let mut transaction = session.transaction().unwrap();
        let twin = transaction.recipients[0].clone();
        transaction.recipients.push(twin);

        let mut other = session_with_pdf(1);
        assert!(other.import_transaction(transaction).is_err());
        assert!(other.recipients().is_empty());
        assert!(session.recipients().contains(kept));
    }

    fn session_with_pdf(pages: u32) -> DocumentSession {
        let mut session = DocumentSession::new(Config::default()).unwrap();
        let info = DocumentInfo::new("contract.pdf", "application/pdf", 2048);
        session
            .open_document(info, Box::new(FixedPageRenderer::new(pages, 500.0, 700.0)))
            .unwrap();
        session
    }

    #[test]
    fn test_rejects_non_pdf_upload() {
        let mut session = DocumentSession::new(Config::default()).unwrap();
        let info = DocumentInfo::new("photo.png", "image/png", 10);
        let err = session
            .open_document(info, Box::new(FixedPageRenderer::new(1, 500.0, 700.0)))
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::UnsupportedFileType {
                mime_type: "image/png".to_string()
            }
        );
        assert!(session.document().is_none());
    }

    #[test]
    fn test_load_error_refuses_drops() {
        let mut session = DocumentSession::new(Config::default()).unwrap();
        let info = DocumentInfo::new("broken.pdf", "application/pdf", 10);
        assert!(session
            .open_document(info, Box::new(FixedPageRenderer::failing("bad header")))
            .is_err());
        assert_eq!(session.surface().load_error(), Some("bad header"));

        session.begin_palette_drag(FieldType::Signature).unwrap();
        assert!(session.drop_at(10.0, 10.0).is_discarded());
        assert!(session.fields().is_empty());
    }

    #[test]
    fn test_field_lands_on_current_page() {
        let mut session = session_with_pdf(3);
        session.next_page();
        session.begin_palette_drag(FieldType::Date).unwrap();
        let id = session.drop_at(60.0, 84.0).field_id().unwrap();

        let field = session.fields().get(id).unwrap();
        assert_eq!(field.page, 2);
        assert!((field.x_percent - 10.0).abs() < 1e-9);
        assert!((field.y_percent - 10.0).abs() < 1e-9);
        assert_eq!(session.visible_fields().count(), 1);

        session.previous_page();
        assert_eq!(session.visible_fields().count(), 0);
    }

    #[test]
    fn test_zoom_keeps_percentages_and_scales_pixels() {
        let mut session = session_with_pdf(1);
        session.begin_palette_drag(FieldType::Text).unwrap();
        let id = session.drop_at(300.0, 420.0).field_id().unwrap();
        let before = session.fields().get(id).unwrap().clone();
        let overlay_before = session.field_overlays()[0].rect;

        session.zoom_out();
        session.zoom_out();
        let after = session.fields().get(id).unwrap();
        assert_eq!(after.x_percent, before.x_percent);
        assert_eq!(after.y_percent, before.y_percent);

        let overlay_after = session.field_overlays()[0].rect;
        let ratio = session.surface().scale() / 1.2;
        assert!((overlay_after.left - overlay_before.left * ratio).abs() < 1e-6);
        assert!((overlay_after.width - overlay_before.width * ratio).abs() < 1e-6);
    }

    #[test]
    fn test_fit_to_width() {
        let mut session = session_with_pdf(1);
        assert_eq!(session.fit_to_width(750.0), 1.5);
        assert!(session.surface().current_bounding_box().is_some());
    }

    #[test]
    fn test_assign_requires_known_recipient_and_closes_popover() {
        let mut session = session_with_pdf(1);
        session.begin_palette_drag(FieldType::Signature).unwrap();
        let field = session.drop_at(10.0, 10.0).field_id().unwrap();
        let recipient = session.add_recipient(RecipientType::Customer);

        session.open_recipient_selector(field).unwrap();
        assert!(session
            .assign_recipient(field, Some(RecipientId(999)))
            .unwrap_err()
            .is_not_found());
        assert!(session.popover().is_open_for(field));

        session.assign_recipient(field, Some(recipient)).unwrap();
        assert_eq!(session.popover().open_for(), None);
        assert_eq!(session.color_for(recipient), Some("blue"));
        assert_eq!(session.field_overlays()[0].color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_remove_recipient_unassigns_fields() {
        let mut session = session_with_pdf(1);
        let recipient = session.add_recipient(RecipientType::TeamMember);
        session.begin_palette_drag(FieldType::Signature).unwrap();
        let field = session.drop_at(10.0, 10.0).field_id().unwrap();
        session.assign_recipient(field, Some(recipient)).unwrap();

        session.remove_recipient(recipient).unwrap();
        assert_eq!(session.fields().get(field).unwrap().recipient_id, None);
    }

    #[test]
    fn test_transaction_round_trip_through_import() {
        let mut session = session_with_pdf(2);
        session.add_recipient(RecipientType::TeamMember);
        session.begin_palette_drag(FieldType::Checkbox).unwrap();
        session.drop_at(100.0, 100.0);

        let transaction = session.transaction().unwrap();
        assert_eq!(transaction.fields.len(), 1);
        assert_eq!(transaction.document.as_ref().unwrap().num_pages, Some(2));

        let mut other = session_with_pdf(2);
        other.import_transaction(transaction.clone()).unwrap();
        assert_eq!(other.fields().len(), 1);
        assert_eq!(other.recipients().len(), 1);

        let mut small = session_with_pdf(1);
        let mut moved = transaction;
        moved.fields[0].page = 2;
        moved.document = None;
        assert!(small.import_transaction(moved).is_err());
        assert!(small.fields().is_empty());
    }
}
