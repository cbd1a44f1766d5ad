// ==========================================
// 设备导入集成测试
// ==========================================
// 测试目标: 文件 → 预览 → 提交 → 报告 的完整流程
// ==========================================

mod test_helpers;

use lab_equipment_import::api::{ApiError, ImportApi};
use lab_equipment_import::domain::{Category, ImportBatchResult, Lab};
use lab_equipment_import::logging;
use test_helpers::{
    create_test_config, write_legacy_xlsx, write_text_file, MockBulkClient,
    LEGACY_ROWS_WITH_BLANK_NAME,
};

#[tokio::test]
async fn test_legacy_batch_with_blank_name() {
    logging::init_test();

    let (_db, config) = create_test_config().expect("Failed to create test config");
    let dir = tempfile::tempdir().unwrap();
    let path = write_legacy_xlsx(dir.path(), "inventory.xlsx", &LEGACY_ROWS_WITH_BLANK_NAME)
        .expect("Failed to write xlsx");

    let api = ImportApi::new(config).with_year(2024);

    // 预览
    let preview = api.preview(&path, &[]).await.expect("Preview should succeed");
    assert_eq!(preview.summary.total_rows, 5);
    assert_eq!(preview.summary.valid_rows, 4);
    assert_eq!(preview.summary.invalid_rows, 1);

    let invalid: Vec<_> = preview.outcomes.iter().filter(|o| !o.is_valid()).collect();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].row_number, 3);
    assert_eq!(invalid[0].errors, vec!["Name is required".to_string()]);

    // 导入
    let client = MockBulkClient::accepting_all(4);
    let report = api
        .import_with_client(&path, &[], client.clone())
        .await
        .expect("Import should succeed");

    assert_eq!(client.calls(), 1);
    assert_eq!(client.submitted().len(), 4);
    assert_eq!(report.submitted, 4);
    assert_eq!(
        report.success_message.as_deref(),
        Some("Successfully imported 4 equipment items!")
    );
    assert!(report.error_message.is_none());
}

#[tokio::test]
async fn test_submitted_payloads_are_normalized() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_legacy_xlsx(dir.path(), "inventory.xlsx", &LEGACY_ROWS_WITH_BLANK_NAME).unwrap();

    let client = MockBulkClient::accepting_all(4);
    ImportApi::new(config)
        .with_year(2024)
        .import_with_client(&path, &[Lab::new(7), Lab::new(2)], client.clone())
        .await
        .unwrap();

    let submitted = client.submitted();
    let serials: Vec<&str> = submitted.iter().map(|p| p.serial_number.as_str()).collect();
    assert_eq!(
        serials,
        vec!["HP-001-2024", "EPSON-002-2024", "CISCO-004-2024", "OLYMPUS-005-2024"]
    );

    let desktop = &submitted[0];
    assert_eq!(desktop.category, Category::Computer);
    assert_eq!(desktop.lab_id, 7);
    assert_eq!(desktop.purchase_price, 31999.0);
    assert_eq!(desktop.current_value, 25599.0);
    assert_eq!(desktop.stock_register_page.as_deref(), Some("12"));

    let microscope = &submitted[3];
    assert_eq!(microscope.category, Category::Microscope);
    assert_eq!(microscope.quantity, 3);
    assert_eq!(microscope.purchase_price, 45000.0);
}

#[tokio::test]
async fn test_empty_sheet_short_circuits() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_legacy_xlsx(dir.path(), "empty.xlsx", &[]).unwrap();

    let client = MockBulkClient::accepting_all(0);
    let result = ImportApi::new(config)
        .import_with_client(&path, &[], client.clone())
        .await;

    match result {
        Err(err @ ApiError::DecodeError(_)) => {
            assert!(err.resets_flow());
            assert_eq!(err.to_string(), "The file appears to be empty");
        }
        other => panic!("Expected DecodeError, got {:?}", other.map(|r| r.batch_id)),
    }
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_all_rows_invalid() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_text_file(
        dir.path(),
        "broken.csv",
        "name,category,status\nOscilloscope,spaceship,available\nMultimeter,lab_equipment,lost\n",
    )
    .unwrap();

    let client = MockBulkClient::accepting_all(0);
    let result = ImportApi::new(config)
        .import_with_client(&path, &[], client.clone())
        .await;

    assert!(matches!(result, Err(ApiError::NoValidRows(_))));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_submission_error_propagates() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_legacy_xlsx(dir.path(), "inventory.xlsx", &LEGACY_ROWS_WITH_BLANK_NAME).unwrap();

    let client = MockBulkClient::responding(Err("Token expired".to_string()));
    let result = ImportApi::new(config)
        .import_with_client(&path, &[], client.clone())
        .await;

    match result {
        Err(ApiError::SubmissionError(msg)) => assert_eq!(msg, "Token expired"),
        other => panic!("Expected SubmissionError, got {:?}", other.map(|r| r.batch_id)),
    }
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_partial_success_reported() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_legacy_xlsx(dir.path(), "inventory.xlsx", &LEGACY_ROWS_WITH_BLANK_NAME).unwrap();

    let client = MockBulkClient::responding(Ok(ImportBatchResult {
        succeeded: 3,
        failed: 1,
        errors: vec!["CISCO-004-2024: serial number already exists".to_string()],
    }));
    let report = ImportApi::new(config)
        .with_year(2024)
        .import_with_client(&path, &[], client)
        .await
        .expect("Partial success is not an error");

    assert_eq!(report.result.succeeded, 3);
    assert_eq!(report.result.failed, 1);
    assert_eq!(
        report.success_message.as_deref(),
        Some("Successfully imported 3 equipment items!")
    );
    let error_message = report.error_message.expect("error message expected");
    assert!(error_message.contains("CISCO-004-2024: serial number already exists"));
}

#[tokio::test]
async fn test_canonical_csv_with_extra_columns() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_text_file(
        dir.path(),
        "canonical.csv",
        "\u{feff}name,serial_number,category,lab_id,purchase_price,room\n\
         Spectrophotometer,SP-100,lab_equipment,2,125000,B-204\n\
         ,,,,,C-101\n",
    )
    .unwrap();

    let labs = vec![Lab::new(2), Lab::new(5)];
    let client = MockBulkClient::accepting_all(2);
    let report = ImportApi::new(config)
        .import_with_client(&path, &labs, client.clone())
        .await
        .unwrap();
    assert_eq!(report.submitted, 2);

    let submitted = client.submitted();
    assert_eq!(submitted[0].serial_number, "SP-100");
    assert_eq!(submitted[0].purchase_price, 125000.0);
    assert_eq!(submitted[0].extra["room"], serde_json::json!("B-204"));

    // 全默认行
    assert_eq!(submitted[1].name, "Unknown Equipment");
    assert_eq!(submitted[1].serial_number, "AUTO-2");
    assert_eq!(submitted[1].category, Category::LabEquipment);
    assert_eq!(submitted[1].lab_id, 2);
}

#[tokio::test]
async fn test_unknown_lab_blocks_row() {
    let (_db, config) = create_test_config().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_text_file(
        dir.path(),
        "labs.csv",
        "name,category,lab_id\nFume Hood,furniture,9\nBalance,lab_equipment,1\n",
    )
    .unwrap();

    let preview = ImportApi::new(config)
        .preview(&path, &[Lab::new(1)])
        .await
        .unwrap();
    assert_eq!(preview.summary.valid_rows, 1);
    assert_eq!(preview.outcomes[0].errors, vec!["Lab ID 9 does not exist".to_string()]);
}
