// ==========================================
// 批量导入 HTTP 客户端测试
// ==========================================
// 测试目标: 请求格式（路径 / Bearer / 请求体）与响应解析
// 使用本地一次性 TCP 服务替代外部接口
// ==========================================

use lab_equipment_import::domain::{
    Category, ConditionStatus, EquipmentPayload, EquipmentStatus,
};
use lab_equipment_import::importer::{BulkImportClient, HttpBulkImportClient, ImportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 接受一次连接，返回收到的原始请求文本
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        // 读到请求头结束，再按 Content-Length 读完请求体
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let lower = line.to_ascii_lowercase();
                        lower
                            .strip_prefix("content-length:")
                            .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf).to_string()
    });

    (base_url, handle)
}

fn payload(serial: &str) -> EquipmentPayload {
    EquipmentPayload {
        name: "Desktop System".to_string(),
        description: None,
        serial_number: serial.to_string(),
        model: String::new(),
        manufacturer: "HP".to_string(),
        category: Category::Computer,
        lab_id: 1,
        location_details: String::new(),
        status: EquipmentStatus::Available,
        condition_status: ConditionStatus::Good,
        purchase_price: 31999.0,
        current_value: 25599.0,
        purchase_date: None,
        warranty_expiry: None,
        quantity: 2,
        stock_register_page: None,
        extra: serde_json::Map::new(),
    }
}

#[tokio::test]
async fn test_bulk_create_request_shape() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"success":true,"results":{"success":2,"failed":0,"errors":[]}}"#,
    )
    .await;

    let client = HttpBulkImportClient::new(base_url, "secret-token");
    let result = client
        .bulk_create(&[payload("HP-001-2024"), payload("HP-002-2024")])
        .await
        .unwrap();
    assert_eq!(result.succeeded, 2);
    assert_eq!(result.failed, 0);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/equipment/bulk-import HTTP/1.1"));
    assert!(request
        .to_ascii_lowercase()
        .contains("authorization: bearer secret-token"));

    let body_start = request.find("\r\n\r\n").unwrap() + 4;
    let body: serde_json::Value = serde_json::from_str(&request[body_start..]).unwrap();
    let equipment = body["equipment"].as_array().unwrap();
    assert_eq!(equipment.len(), 2);
    assert_eq!(equipment[0]["serial_number"], "HP-001-2024");
    assert_eq!(equipment[0]["category"], "computer");
    assert_eq!(equipment[0]["status"], "available");
}

#[tokio::test]
async fn test_bulk_create_surfaces_collaborator_message() {
    let (base_url, server) = serve_once(
        "401 Unauthorized",
        r#"{"message":"Invalid or expired token"}"#,
    )
    .await;

    let client = HttpBulkImportClient::new(base_url, "stale");
    let result = client.bulk_create(&[payload("HP-001-2024")]).await;
    server.await.unwrap();

    match result {
        Err(ImportError::SubmissionError(msg)) => assert_eq!(msg, "Invalid or expired token"),
        other => panic!("Expected SubmissionError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bulk_create_generic_message_without_body() {
    let (base_url, server) = serve_once("500 Internal Server Error", "").await;

    let client = HttpBulkImportClient::new(base_url, "token");
    let result = client.bulk_create(&[payload("HP-001-2024")]).await;
    server.await.unwrap();

    match result {
        Err(ImportError::SubmissionError(msg)) => assert_eq!(msg, "Failed to import equipment"),
        other => panic!("Expected SubmissionError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_bulk_create_connection_refused() {
    // 绑定后立即释放端口，连接必然失败
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = HttpBulkImportClient::new(base_url, "token");
    let result = client.bulk_create(&[payload("HP-001-2024")]).await;
    assert!(matches!(result, Err(ImportError::SubmissionError(_))));
}
