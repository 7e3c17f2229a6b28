//! Transaction export and import.
//!
//! A transaction is the hand-off to submission: the document, the placed
//! fields, and the recipients. Files are versioned JSON. Older files that
//! stored field positions in pixels are converted on load against the
//! 800x600 surface those positions were recorded on.

use crate::coordinates::clamp_to_bounds;
use crate::model::Field;
use crate::recipients::{check_ids, Recipient};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use signkit_core::constants::{
    LEGACY_FIELD_HEIGHT, LEGACY_FIELD_WIDTH, LEGACY_SURFACE_HEIGHT, LEGACY_SURFACE_WIDTH, MAX_ID,
    PDF_MIME_TYPE,
};
use signkit_core::{DocumentError, PlacementError};
use std::collections::HashSet;
use std::path::Path;

/// Transaction file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Uploaded document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    pub name: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: u64,
    /// Page count, once the renderer has reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_pages: Option<u32>,
}

impl DocumentInfo {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes,
            num_pages: None,
        }
    }

    /// Only PDFs are accepted.
    pub fn check_type(&self) -> Result<(), DocumentError> {
        if self.mime_type == PDF_MIME_TYPE {
            Ok(())
        } else {
            Err(DocumentError::UnsupportedFileType {
                mime_type: self.mime_type.clone(),
            })
        }
    }
}

/// Where the transaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Rejected,
}

/// Fields and recipients ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentInfo>,
    pub fields: Vec<Field>,
    pub recipients: Vec<Recipient>,
    #[serde(default)]
    pub status: TransactionStatus,
    pub created_date: DateTime<Utc>,
}

impl Transaction {
    /// A pending transaction created now.
    pub fn new(
        document: Option<DocumentInfo>,
        fields: Vec<Field>,
        recipients: Vec<Recipient>,
    ) -> Self {
        Self {
            document,
            fields,
            recipients,
            status: TransactionStatus::Pending,
            created_date: Utc::now(),
        }
    }

    /// Checks every field is on a real page and inside it, and that field
    /// and recipient ids are unique.
    pub fn validate(&self) -> Result<(), PlacementError> {
        let num_pages = self.document.as_ref().and_then(|d| d.num_pages);
        let mut ids = HashSet::new();
        for field in &self.fields {
            field.validate()?;
            if let Some(num_pages) = num_pages {
                if field.page > num_pages {
                    return Err(PlacementError::validation(format!(
                        "{} is on page {} of a {}-page document",
                        field.id, field.page, num_pages
                    )));
                }
            }
            if field.id.0 > MAX_ID {
                return Err(PlacementError::validation(format!(
                    "{} is out of range",
                    field.id
                )));
            }
            if !ids.insert(field.id) {
                return Err(PlacementError::validation(format!(
                    "duplicate id {}",
                    field.id
                )));
            }
        }
        check_ids(&self.recipients).map_err(|e| PlacementError::validation(e.to_string()))
    }
}

/// Versioned transaction file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFile {
    pub version: String,
    pub transaction: Transaction,
}

impl TransactionFile {
    pub fn new(transaction: Transaction) -> Self {
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            transaction,
        }
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.transaction
            .validate()
            .context("Refusing to save an invalid transaction")?;
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize transaction")?;
        std::fs::write(path.as_ref(), json).context("Failed to write transaction file")?;
        Ok(())
    }

    /// Load from file, converting legacy pixel-positioned fields.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read transaction file")?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string, converting legacy pixel-positioned fields.
    pub fn from_json(content: &str) -> Result<Self> {
        let mut value: Value =
            serde_json::from_str(content).context("Failed to parse transaction file")?;

        if let Some(fields) = value
            .pointer_mut("/transaction/fields")
            .and_then(Value::as_array_mut)
        {
            let mut converted = 0;
            for field in fields.iter_mut().filter_map(Value::as_object_mut) {
                if migrate_legacy_field(field) {
                    converted += 1;
                }
            }
            if converted > 0 {
                tracing::info!("Converted {} legacy pixel-positioned fields", converted);
            }
        }

        let file: Self =
            serde_json::from_value(value).context("Failed to deserialize transaction")?;
        if file.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                "Transaction file version {} differs from {}",
                file.version,
                FILE_FORMAT_VERSION
            );
        }
        file.transaction
            .validate()
            .context("Transaction file contains invalid fields")?;
        Ok(file)
    }
}

/// Rewrites a pixel-positioned field object into percentages.
///
/// Returns false, untouched, when the field has no pixel position.
pub fn migrate_legacy_field(field: &mut Map<String, Value>) -> bool {
    if !field.contains_key("x") && !field.contains_key("y") {
        return false;
    }
    let number = |map: &Map<String, Value>, key: &str| map.get(key).and_then(Value::as_f64);

    let width = number(field, "width").unwrap_or(LEGACY_FIELD_WIDTH);
    let height = number(field, "height").unwrap_or(LEGACY_FIELD_HEIGHT);
    let width_percent = (width / LEGACY_SURFACE_WIDTH * 100.0).min(100.0);
    let height_percent = (height / LEGACY_SURFACE_HEIGHT * 100.0).min(100.0);
    let x = number(field, "x").unwrap_or(0.0) / LEGACY_SURFACE_WIDTH * 100.0;
    let y = number(field, "y").unwrap_or(0.0) / LEGACY_SURFACE_HEIGHT * 100.0;
    let corner = clamp_to_bounds(x, y, width_percent, height_percent);

    for key in ["x", "y", "width", "height"] {
        field.remove(key);
    }
    field.insert("xPercent".into(), Value::from(corner.x));
    field.insert("yPercent".into(), Value::from(corner.y));
    field
        .entry("widthPercent")
        .or_insert_with(|| Value::from(width_percent));
    field
        .entry("heightPercent")
        .or_insert_with(|| Value::from(height_percent));
    field.entry("page").or_insert_with(|| Value::from(1));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_type_check() {
        assert!(DocumentInfo::new("a.pdf", "application/pdf", 10).check_type().is_ok());
        let err = DocumentInfo::new("a.png", "image/png", 10)
            .check_type()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please upload a PDF file. Selected file type: image/png"
        );
    }

    #[test]
    fn test_migrate_legacy_field() {
        let mut value = json!({ "id": 1, "type": "text", "x": 400.0, "y": 300.0 });
        let map = value.as_object_mut().unwrap();
        assert!(migrate_legacy_field(map));

        assert_eq!(map["xPercent"], 50.0);
        assert_eq!(map["yPercent"], 50.0);
        assert_eq!(map["widthPercent"], 25.0);
        assert_eq!(map["page"], 1);
        assert!(!map.contains_key("x"));
    }

    #[test]
    fn test_migrate_clamps_legacy_position() {
        let mut value = json!({ "id": 1, "type": "text", "x": 790.0, "y": 590.0, "page": 2 });
        let map = value.as_object_mut().unwrap();
        migrate_legacy_field(map);
        assert_eq!(map["xPercent"], 75.0);
        assert_eq!(map["page"], 2);
    }

    #[test]
    fn test_percent_fields_are_left_alone() {
        let mut value = json!({ "xPercent": 1.0, "yPercent": 2.0 });
        assert!(!migrate_legacy_field(value.as_object_mut().unwrap()));
    }

    #[test]
    fn test_partial_percent_position_is_not_treated_as_legacy() {
        let mut value = json!({ "id": 3, "type": "text", "xPercent": 40.0 });
        let map = value.as_object_mut().unwrap();
        assert!(!migrate_legacy_field(map));
        assert_eq!(map["xPercent"], 40.0);
        assert!(!map.contains_key("yPercent"));

        let mut value = json!({ "id": 4, "type": "text", "x": 400.0, "yPercent": 10.0 });
        let map = value.as_object_mut().unwrap();
        assert!(migrate_legacy_field(map));
        assert_eq!(map["xPercent"], 50.0);
    }

    #[test]
    fn test_transaction_wire_format() {
        let transaction = Transaction::new(None, Vec::new(), Vec::new());
        let value = serde_json::to_value(&transaction).unwrap();
        assert_eq!(value["status"], "pending");
        assert!(value["createdDate"].is_string());
        assert!(value.get("document").is_none());
    }

    #[test]
    fn test_from_json_rejects_page_past_end() {
        let content = json!({
            "version": "1.0",
            "transaction": {
                "document": { "name": "a.pdf", "mimeType": "application/pdf", "numPages": 1 },
                "fields": [{
                    "id": 1, "type": "date", "page": 2,
                    "xPercent": 0.0, "yPercent": 0.0, "widthPercent": 25.0, "heightPercent": 6.0
                }],
                "recipients": [],
                "createdDate": "2024-01-15T10:30:00Z"
            }
        })
        .to_string();
        assert!(TransactionFile::from_json(&content).is_err());
    }
}
