//! Drives `HttpBackend` against a throwaway axum server on an ephemeral port.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use backend_adapters::HttpBackend;
use domains::{MaintenanceBackend, MonitorError, NewMaintenanceLog, Operation};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn equipments() -> Json<Value> {
    Json(json!({
        "equipments": [
            { "id": 1, "name": "Boiler", "serial": "B-1", "status": "operational" },
            { "id": 2, "name": "Chiller", "serial": "C-9", "status": "critical" }
        ]
    }))
}

async fn open_logs() -> Json<Value> {
    Json(json!({
        "maintenance_logs": [
            { "id": "a1", "equipment_serial": "B-1", "issue_description": "noise",
              "date_reported": "2025-03-02", "severity": "high" }
        ]
    }))
}

async fn all_logs() -> &'static str {
    "<html>maintenance offline</html>"
}

async fn equipment_logs(Path(serial): Path<String>) -> Json<Value> {
    Json(json!([
        { "id": 7, "equipment_serial": serial, "issue_description": "leak",
          "date_reported": "2025-01-01", "date_resolved": null }
    ]))
}

async fn monitoring(Path(serial): Path<String>) -> (StatusCode, Json<Value>) {
    if serial == "broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "sensor bus down" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "monitoring_data": [
                { "id": 1, "equipment_serial": serial, "timestamp": "2025-03-01T10:00:00",
                  "reading_type": "temperature", "value": 71.5, "unit": "C", "status": "normal" }
            ]
        })),
    )
}

async fn add_log(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["equipment_serial"] == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Equipment not found" })));
    }
    (StatusCode::OK, Json(json!({ "message": "added" })))
}

async fn analysis() -> Json<Value> {
    Json(json!({ "message": "no status here" }))
}

async fn validation() -> Json<Value> {
    Json(json!({
        "status": {
            "analysis_report": [
                { "equipment_details": { "name": "Boiler", "serial": "B-1" },
                  "priority": "high", "needs_maintenance": true,
                  "ai_summary": "Bearing wear", "validation_feedback": "Confirmed" }
            ]
        }
    }))
}

async fn respond(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let input = params.get("input").cloned().unwrap_or_default();
    Json(json!({ "message": format!("echo: {input}") }))
}

async fn spawn_backend() -> HttpBackend {
    let app = Router::new()
        .route("/equipments/list_all", get(equipments))
        .route("/maintenance/logs", get(all_logs))
        .route("/maintenance/logs/open", get(open_logs))
        .route("/maintenance/logs/add", put(add_log))
        .route("/maintenance/logs/{serial}", post(equipment_logs))
        .route("/monitoring/{serial}", post(monitoring))
        .route("/ai_analysis", get(analysis))
        .route("/ai_validation", get(validation))
        .route("/response", post(respond));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    HttpBackend::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn unwraps_keyed_equipment_lists() {
    let backend = spawn_backend().await;
    let equipments = backend.list_equipments().await.unwrap();
    assert_eq!(equipments.len(), 2);
    assert_eq!(equipments[1].serial, "C-9");
}

#[tokio::test]
async fn unwraps_keyed_log_lists() {
    let backend = spawn_backend().await;
    let logs = backend.list_open_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].severity.as_deref(), Some("high"));
}

#[tokio::test]
async fn non_json_list_body_degrades_to_empty() {
    let backend = spawn_backend().await;
    assert!(backend.list_all_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn serial_survives_path_encoding() {
    let backend = spawn_backend().await;
    let logs = backend.equipment_logs("AC 2022/7").await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].equipment_serial, "AC 2022/7");

    let readings = backend.monitoring_readings("pump #3").await.unwrap();
    assert_eq!(readings[0].equipment_serial, "pump #3");
    assert_eq!(readings[0].value, 71.5);
}

#[tokio::test]
async fn server_error_is_a_network_failure() {
    let backend = spawn_backend().await;
    let err = backend.monitoring_readings("broken").await.unwrap_err();
    assert!(matches!(
        err,
        MonitorError::NetworkFailure {
            operation: Operation::MonitoringReadings,
            status: Some(500),
            ..
        }
    ));
    assert_eq!(err.user_message(), Operation::MonitoringReadings.failure_message());
}

#[tokio::test]
async fn add_log_carries_backend_detail() {
    let backend = spawn_backend().await;
    let log = NewMaintenanceLog {
        raised_by: "Operator".into(),
        equipment_serial: "missing".into(),
        issue_description: "rattle".into(),
        date_reported: "2025-03-02".into(),
        severity: "low".into(),
        date_predicted: None,
    };
    let err = backend.add_log(log.clone()).await.unwrap_err();
    assert_eq!(err.user_message(), "Equipment not found");

    let ok = NewMaintenanceLog {
        equipment_serial: "B-1".into(),
        ..log
    };
    backend.add_log(ok).await.unwrap();
}

#[tokio::test]
async fn analysis_without_status_is_malformed() {
    let backend = spawn_backend().await;
    let err = backend.run_analysis().await.unwrap_err();
    assert!(matches!(
        err,
        MonitorError::MalformedResponse {
            operation: Operation::RunAnalysis,
            ..
        }
    ));
}

#[tokio::test]
async fn validation_report_is_unwrapped() {
    let backend = spawn_backend().await;
    let report = backend.run_validation().await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].equipment_details.serial, "B-1");
    assert!(report[0].needs_maintenance);
}

#[tokio::test]
async fn chat_sends_input_as_query_parameter() {
    let backend = spawn_backend().await;
    let reply = backend.chat("is B-1 ok & running?").await.unwrap();
    assert_eq!(reply.as_deref(), Some("echo: is B-1 ok & running?"));
}

#[tokio::test]
async fn refused_connection_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = HttpBackend::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = backend.list_equipments().await.unwrap_err();
    assert_eq!(err, MonitorError::network(Operation::ListEquipments, None));
}
