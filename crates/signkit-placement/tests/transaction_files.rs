//! Transaction file save/load, including import of older files that stored
//! field positions in pixels.

use signkit_placement::{
    DocumentInfo, DocumentSession, FieldType, FixedPageRenderer, RecipientType,
    TransactionFile, TransactionStatus,
};
use signkit_settings::Config;
use tempfile::TempDir;

fn session_with_fields() -> DocumentSession {
    let mut session = DocumentSession::new(Config::default()).unwrap();
    let info = DocumentInfo::new("nda.pdf", "application/pdf", 1200);
    session
        .open_document(info, Box::new(FixedPageRenderer::new(2, 600.0, 800.0)))
        .unwrap();
    session.reset_zoom();

    let signer = session.add_recipient(RecipientType::Customer);
    session.begin_palette_drag(FieldType::Signature).unwrap();
    let id = session.drop_at(150.0, 150.0).field_id().unwrap();
    session.assign_recipient(id, Some(signer)).unwrap();

    session.begin_palette_drag(FieldType::Radio).unwrap();
    let radio = session.drop_at(300.0, 400.0).field_id().unwrap();
    session.edit_field(radio, Some("Red, Green")).unwrap();
    session
}

#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nda.signkit.json");

    let session = session_with_fields();
    let transaction = session.transaction().unwrap();
    assert_eq!(transaction.status, TransactionStatus::Pending);

    TransactionFile::new(transaction.clone())
        .save_to_file(&path)
        .unwrap();
    let loaded = TransactionFile::load_from_file(&path).unwrap();

    assert_eq!(loaded.version, "1.0");
    assert_eq!(loaded.transaction, transaction);

    let mut restored = DocumentSession::new(Config::default()).unwrap();
    restored.import_transaction(loaded.transaction).unwrap();
    assert_eq!(restored.fields().len(), 2);
    assert_eq!(restored.recipients().len(), 1);
    assert_eq!(restored.document().map(|d| d.name.as_str()), Some("nda.pdf"));
}

#[test]
fn test_saved_file_uses_percentages() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("out.json");
    TransactionFile::new(session_with_fields().transaction().unwrap())
        .save_to_file(&path)
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let field = &value["transaction"]["fields"][0];
    assert_eq!(field["type"], "signature");
    assert_eq!(field["xPercent"], 25.0);
    assert_eq!(field["yPercent"], 18.75);
    assert!(field.get("x").is_none());
    assert_eq!(value["transaction"]["status"], "pending");
}

#[test]
fn test_legacy_pixel_file_is_converted() {
    let content = r#"{
        "version": "0.9",
        "transaction": {
            "fields": [
                { "id": 1, "type": "signature", "x": 200.0, "y": 150.0, "label": "Signature", "value": "" },
                { "id": 2, "type": "checkbox", "x": 780.0, "y": 590.0, "width": 40.0, "height": 40.0, "label": "Checkbox", "value": "checked" }
            ],
            "recipients": [],
            "createdDate": "2024-03-01T09:00:00Z"
        }
    }"#;

    let file = TransactionFile::from_json(content).unwrap();
    let fields = &file.transaction.fields;

    assert_eq!(fields[0].x_percent, 25.0);
    assert_eq!(fields[0].y_percent, 25.0);
    assert_eq!(fields[0].width_percent, 25.0);
    assert_eq!(fields[0].page, 1);

    // 40px on an 800x600 surface, pushed back inside the page
    assert_eq!(fields[1].width_percent, 5.0);
    assert_eq!(fields[1].x_percent, 95.0);
    assert!(fields[1].y_percent <= 100.0 - fields[1].height_percent + 1e-9);
    assert_eq!(fields[1].value(), "checked");
}

#[test]
fn test_load_rejects_unknown_checkbox_value() {
    let content = r#"{
        "version": "1.0",
        "transaction": {
            "fields": [{
                "id": 1, "type": "checkbox", "page": 1, "value": "maybe",
                "xPercent": 1.0, "yPercent": 1.0, "widthPercent": 25.0, "heightPercent": 6.0
            }],
            "recipients": [],
            "createdDate": "2024-03-01T09:00:00Z"
        }
    }"#;
    assert!(TransactionFile::from_json(content).is_err());
}

#[test]
fn test_load_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    assert!(TransactionFile::load_from_file(temp_dir.path().join("missing.json")).is_err());
}

#[test]
fn test_load_rejects_repeated_recipient_ids() {
    let content = r#"{
        "version": "1.0",
        "transaction": {
            "fields": [],
            "recipients": [
                { "id": 1, "type": "customer", "role": "signer", "order": 1 },
                { "id": 1, "type": "customer", "role": "signer", "order": 2 }
            ],
            "createdDate": "2024-03-01T09:00:00Z"
        }
    }"#;
    assert!(TransactionFile::from_json(content).is_err());
}

#[test]
fn test_load_rejects_oversized_field_id() {
    let content = r#"{
        "version": "1.0",
        "transaction": {
            "fields": [{
                "id": 18446744073709551615, "type": "text", "page": 1,
                "xPercent": 1.0, "yPercent": 1.0, "widthPercent": 25.0, "heightPercent": 6.0
            }],
            "recipients": [],
            "createdDate": "2024-03-01T09:00:00Z"
        }
    }"#;
    assert!(TransactionFile::from_json(content).is_err());

    // A refused import leaves the session placing fields as before
    let mut transaction = session_with_fields().transaction().unwrap();
    transaction.fields[0].id = signkit_core::FieldId(u64::MAX);
    let mut session = session_with_fields();
    assert!(session.import_transaction(transaction).is_err());

    session.begin_palette_drag(FieldType::Date).unwrap();
    assert!(session.drop_at(10.0, 10.0).field_id().is_some());
}
