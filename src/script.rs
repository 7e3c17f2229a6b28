//! Interaction scripts for headless replay.
//!
//! A script names the document, the page geometry the fixed renderer should
//! report, an optional in-memory directory, and the user actions to replay.
//!
//! ```json
//! {
//!   "document": { "name": "nda.pdf", "mimeType": "application/pdf", "sizeBytes": 1200 },
//!   "pages": { "count": 2, "width": 600.0, "height": 800.0 },
//!   "steps": [
//!     { "action": "add_recipient", "recipientType": "customer" },
//!     { "action": "place_field", "fieldType": "signature", "x": 150.0, "y": 150.0 },
//!     { "action": "assign", "field": 1, "recipient": 1 }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use signkit_core::{FieldId, RecipientId};
use signkit_placement::{
    DocumentInfo, DocumentSession, DropOutcome, FieldType, FixedPageRenderer,
    RecipientDirectory, RecipientType, Role, StaticDirectory, Transaction,
};
use signkit_settings::Config;
use std::path::Path;

/// Page geometry reported by the replay renderer, in pixels at 100%.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub count: u32,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // US Letter at 72 dpi
        Self {
            count: 1,
            width: 612.0,
            height: 792.0,
            left: 0.0,
            top: 0.0,
        }
    }
}

/// One user action. Pointer coordinates are viewport pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Step {
    PlaceField {
        field_type: FieldType,
        x: f64,
        y: f64,
    },
    MoveField {
        field: FieldId,
        x: f64,
        y: f64,
    },
    /// Answer to the click prompt; `null` dismisses it.
    Edit {
        field: FieldId,
        response: Option<String>,
    },
    Toggle {
        field: FieldId,
    },
    SelectRadio {
        field: FieldId,
        value: String,
    },
    DeleteField {
        field: FieldId,
    },
    AddRecipient {
        #[serde(default)]
        recipient_type: RecipientType,
    },
    UpdateRecipient {
        recipient: RecipientId,
        name: String,
        email: String,
    },
    /// Searches the directory and takes the first hit.
    PickFromDirectory {
        recipient: RecipientId,
        query: String,
    },
    SetRole {
        recipient: RecipientId,
        role: Role,
    },
    Reorder {
        recipient: RecipientId,
        order: u32,
    },
    RemoveRecipient {
        recipient: RecipientId,
    },
    Assign {
        field: FieldId,
        recipient: Option<RecipientId>,
    },
    NextPage,
    PreviousPage,
    GoToPage {
        page: u32,
    },
    ZoomIn,
    ZoomOut,
    ResetZoom,
    FitWidth {
        width: f64,
    },
}

/// A complete replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub document: DocumentInfo,
    #[serde(default)]
    pub pages: PageGeometry,
    #[serde(default)]
    pub directory: StaticDirectory,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read script file")?;
        serde_json::from_str(&content).context("Failed to parse script file")
    }

    /// Replays every step against a fresh session and returns the result.
    pub fn run(&self, config: Config) -> Result<Transaction> {
        let mut session = DocumentSession::new(config).context("Invalid configuration")?;
        let pages = &self.pages;
        let renderer = FixedPageRenderer::new(pages.count, pages.width, pages.height)
            .with_origin(pages.left, pages.top);
        session
            .open_document(self.document.clone(), Box::new(renderer))
            .context("Failed to open document")?;

        for (index, step) in self.steps.iter().enumerate() {
            self.apply(&mut session, step)
                .with_context(|| format!("Step {} ({:?}) failed", index + 1, step))?;
        }

        Ok(session.transaction()?)
    }

    fn apply(&self, session: &mut DocumentSession, step: &Step) -> Result<()> {
        match step {
            Step::PlaceField { field_type, x, y } => {
                session.begin_palette_drag(*field_type)?;
                report_drop(session.drop_at(*x, *y));
            }
            Step::MoveField { field, x, y } => {
                session.begin_field_drag(*field)?;
                report_drop(session.drop_at(*x, *y));
            }
            Step::Edit { field, response } => {
                session.edit_field(*field, response.as_deref())?;
            }
            Step::Toggle { field } => {
                session.toggle_checkbox(*field)?;
            }
            Step::SelectRadio { field, value } => session.select_radio_value(*field, value)?,
            Step::DeleteField { field } => {
                session.delete_field(*field);
            }
            Step::AddRecipient { recipient_type } => {
                session.add_recipient(*recipient_type);
            }
            Step::UpdateRecipient {
                recipient,
                name,
                email,
            } => session.update_recipient_details(*recipient, name, email)?,
            Step::PickFromDirectory { recipient, query } => {
                let kind = session
                    .recipients()
                    .get(*recipient)
                    .map(|r| r.recipient_type)
                    .with_context(|| format!("Unknown {}", recipient))?;
                let Some(entry) = self.directory.search(query, kind).into_iter().next() else {
                    bail!("No directory entry matches '{}'", query);
                };
                session.select_directory_entry(*recipient, &entry)?;
            }
            Step::SetRole { recipient, role } => session.set_role(*recipient, *role)?,
            Step::Reorder { recipient, order } => session.reorder(*recipient, *order)?,
            Step::RemoveRecipient { recipient } => {
                session.remove_recipient(*recipient)?;
            }
            Step::Assign { field, recipient } => session.assign_recipient(*field, *recipient)?,
            Step::NextPage => {
                session.next_page();
            }
            Step::PreviousPage => {
                session.previous_page();
            }
            Step::GoToPage { page } => {
                session.go_to_page(*page)?;
            }
            Step::ZoomIn => {
                session.zoom_in();
            }
            Step::ZoomOut => {
                session.zoom_out();
            }
            Step::ResetZoom => {
                session.reset_zoom();
            }
            Step::FitWidth { width } => {
                session.fit_to_width(*width);
            }
        }
        Ok(())
    }
}

// Discarded drops are expected; the user simply missed the page.
fn report_drop(outcome: DropOutcome) {
    match outcome {
        DropOutcome::Created(id) => tracing::info!("Placed {}", id),
        DropOutcome::Moved(id) => tracing::info!("Moved {}", id),
        DropOutcome::Discarded(reason) => tracing::warn!("Drop discarded: {}", reason),
    }
}
