//! Integration tests for tabkit
//!
//! Exercises the conversion pipeline, the table store, and the HTTP API
//! end to end against temporary directories.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tabkit::config::ServiceConfig;
use tabkit::convert::{convert_all, ConversionRequest, FileConverter};
use tabkit::formats::{read_table, Format, TableWriter};
use tabkit::server::{build_router, AppState};
use tabkit::store::{TableStore, WriteMode};
use tempfile::tempdir;
use tower::ServiceExt;

fn sample_rows() -> Vec<serde_json::Value> {
    vec![
        json!({"name": "Alice", "age": 30}),
        json!({"name": "Bob", "age": 25}),
    ]
}

fn write_sample_csv(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("people.csv");
    fs::write(&path, "name,age\nAlice,30\nBob,25\n").unwrap();
    path
}

#[test]
fn test_csv_parquet_csv_round_trip() {
    let dir = tempdir().unwrap();
    let input = write_sample_csv(dir.path());
    let out_dir = dir.path().join("out");

    let parquet = FileConverter::new(&input, "parquet", Some(out_dir.clone()))
        .convert()
        .unwrap()
        .unwrap();
    let csv = FileConverter::new(&parquet, "csv", Some(out_dir))
        .convert()
        .unwrap()
        .unwrap();

    let table = read_table(Format::Csv, &csv).unwrap();
    assert_eq!(table.to_rows().unwrap(), sample_rows());
}

#[test]
fn test_rows_written_as_csv_survive_to_parquet() {
    // Records written as CSV, converted to Parquet, read back: must equal
    // the original records exactly
    let dir = tempdir().unwrap();
    let writer = TableWriter::new(Format::Csv, dir.path(), "people");
    let csv = writer.write(Some(&sample_rows())).unwrap().unwrap();

    let parquet = FileConverter::new(&csv, "parquet", Some(dir.path().to_path_buf()))
        .convert()
        .unwrap()
        .unwrap();

    let table = read_table(Format::Parquet, &parquet).unwrap();
    assert_eq!(table.to_rows().unwrap(), sample_rows());
}

#[test]
fn test_batch_isolation_end_to_end() {
    let dir = tempdir().unwrap();
    let out_dir = Some(dir.path().join("out"));

    let mut requests: Vec<ConversionRequest> = (0..4)
        .map(|i| {
            let path = dir.path().join(format!("input_{i}.csv"));
            fs::write(&path, format!("id\n{i}\n")).unwrap();
            ConversionRequest {
                input_path: path,
                output_format: "parquet".into(),
                output_dir: out_dir.clone(),
            }
        })
        .collect();

    // Break exactly one request in the middle
    requests[2].input_path = dir.path().join("does_not_exist.csv");

    let results = convert_all(&requests);
    assert_eq!(results.len(), 4);

    let failures: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.success)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(failures, vec![2]);

    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.input, requests[i].input_path);
        if i != 2 {
            assert!(result.output.as_ref().unwrap().exists());
        }
    }
}

#[test]
fn test_table_store_overwrite_semantics() {
    let dir = tempdir().unwrap();
    let store = TableStore::new(dir.path().join("tables"));

    store
        .save("metrics", Some(&sample_rows()), WriteMode::Overwrite)
        .unwrap();
    let second = vec![json!({"name": "Carol", "age": 41})];
    store
        .save("metrics", Some(&second), WriteMode::Overwrite)
        .unwrap();

    let path = store.resolve("metrics").unwrap();
    let table = read_table(Format::Parquet, &path).unwrap();
    assert_eq!(table.to_rows().unwrap(), second);
}

#[tokio::test]
async fn test_query_over_stored_table() {
    let dir = tempdir().unwrap();
    let store = TableStore::new(dir.path().join("tables"));
    store
        .save("people", Some(&sample_rows()), WriteMode::Overwrite)
        .unwrap();

    let outcome = tabkit::server::query_table(
        &store,
        "people",
        "SELECT name FROM people WHERE age > 26",
    )
    .await
    .unwrap();
    assert_eq!(outcome.row_count, 1);
    assert_eq!(outcome.rows[0]["name"], "Alice");
}

// ─── HTTP API ────────────────────────────────────────────────────

fn test_app(root: &Path) -> Arc<AppState> {
    let config = ServiceConfig::prepare(root).unwrap();
    Arc::new(AppState::new(config))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_convert_endpoint() {
    let dir = tempdir().unwrap();
    let input = write_sample_csv(dir.path());
    let router = build_router(test_app(dir.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"input_path": input, "output_format": "parquet"}).to_string(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let produced = body["file_path"].as_str().unwrap();
    assert!(produced.ends_with(".parquet"));
    assert!(Path::new(produced).exists());
}

#[tokio::test]
async fn test_convert_endpoint_identical_format_is_bad_request() {
    let dir = tempdir().unwrap();
    let input = write_sample_csv(dir.path());
    let router = build_router(test_app(dir.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"input_path": input, "output_format": "csv"}).to_string(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_convert_endpoint_missing_input_is_not_found() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/convert")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "input_path": dir.path().join("absent.csv"),
                "output_format": "parquet",
            })
            .to_string(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_endpoint_reports_per_item_outcomes() {
    let dir = tempdir().unwrap();
    let input = write_sample_csv(dir.path());
    let router = build_router(test_app(dir.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/convert/batch")
        .header("content-type", "application/json")
        .body(Body::from(
            json!([
                {"input_path": input, "output_format": "parquet"},
                {"input_path": dir.path().join("absent.csv"), "output_format": "parquet"},
            ])
            .to_string(),
        ))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["success"], true);
    assert_eq!(body["results"][1]["success"], false);
}

const MULTIPART_BOUNDARY: &str = "tabkit-test-boundary";

fn multipart_file_body(field: &str, filename: &str, contents: &str) -> Body {
    Body::from(format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {contents}\r\n\
         --{MULTIPART_BOUNDARY}--\r\n"
    ))
}

fn upload_request(uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

#[tokio::test]
async fn test_upload_endpoint_converts_and_discards_upload() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    // Path components in the client filename must not escape the scratch
    // directory; only the final component survives
    let request = upload_request(
        "/api/upload?output_format=parquet",
        multipart_file_body("file", "../nested/people.csv", "name,age\nAlice,30\nBob,25"),
    );

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let produced = body["file_path"].as_str().unwrap();
    assert!(produced.ends_with(".parquet"));
    assert!(produced.contains("people"));
    assert!(Path::new(produced).exists());

    let table = read_table(Format::Parquet, Path::new(produced)).unwrap();
    assert_eq!(table.to_rows().unwrap(), sample_rows());

    // The upload itself is scratch; nothing may linger
    let uploads = dir.path().join("uploads");
    assert_eq!(fs::read_dir(&uploads).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_endpoint_missing_file_field() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    let request = upload_request(
        "/api/upload?output_format=parquet",
        multipart_file_body("attachment", "people.csv", "name,age\nAlice,30"),
    );

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_endpoint_discards_upload_on_failed_conversion() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    // CSV to CSV is rejected after the upload has been stored
    let request = upload_request(
        "/api/upload?output_format=csv",
        multipart_file_body("file", "people.csv", "name,age\nAlice,30"),
    );

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uploads = dir.path().join("uploads");
    assert_eq!(fs::read_dir(&uploads).unwrap().count(), 0);
}

#[tokio::test]
async fn test_save_list_and_query_tables() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    // Save
    let request = Request::builder()
        .method("POST")
        .uri("/api/tables/people")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"rows": sample_rows(), "mode": "overwrite"}).to_string(),
        ))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // List
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/tables")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["tables"][0], "people");

    // Query
    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"table": "people", "sql": "SELECT COUNT(*) AS n FROM people"}).to_string(),
        ))
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["rows"][0]["n"], 2);
}

#[tokio::test]
async fn test_query_requires_exactly_one_source() {
    let dir = tempdir().unwrap();
    let router = build_router(test_app(dir.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(json!({"sql": "SELECT 1"}).to_string()))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
