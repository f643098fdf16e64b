//! Integration tests for vinos-dash API endpoints
//!
//! Tests cover:
//! - Health endpoint, healthy and degraded
//! - Model listing with precomputed accuracy
//! - Upload prediction, including aggregated column errors
//! - Sample prediction with caching, invalidation and graceful degradation

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method
use vinos_common::config::Settings;
use vinos_common::schema::normalize;
use vinos_common::validator::validate;
use vinos_common::model::{ArtifactLoader, JsonArtifactLoader};
use vinos_common::{db, Classifier, DecimalStyle, ModelId, ModelRegistry, RawTable};
use vinos_dash::{build_router, AppState, DatabaseSource};

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("..").join(relative)
}

fn sample_csv() -> String {
    std::fs::read_to_string(repo_path("data/vinos.csv")).expect("Sample CSV should exist")
}

/// Test helper: state over the shipped models and the given database source
fn setup_state(database: DatabaseSource) -> AppState {
    let registry = ModelRegistry::from_dir(repo_path("models"));
    AppState::new(registry, database, &Settings::default())
}

/// Test helper: SQLite file seeded with the sample CSV
async fn setup_db() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("vinos.db").display());

    let table = RawTable::from_csv_str(&sample_csv(), b';').unwrap();
    let samples = validate(&normalize(&table, DecimalStyle::Comma).unwrap()).unwrap();
    db::create_vinos_table(&url).await.unwrap();
    db::insert_samples(&url, &samples, 1000).await.unwrap();

    (dir, url)
}

fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health and models
// =============================================================================

#[tokio::test]
async fn test_health_degraded_without_database() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app.oneshot(request("GET", "/health", Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["module"], "vinos-dash");
    assert_eq!(body["database_configured"], false);
}

#[tokio::test]
async fn test_models_listed_with_accuracy() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app.oneshot(request("GET", "/api/models", Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let models = body.as_array().expect("Should be an array");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["id"], "decision-tree");
    assert_eq!(models[1]["id"], "gradient-boosted-tree");
    assert!(models.iter().all(|m| m["accuracy"].is_number()));
    assert!(models.iter().all(|m| m["available"] == true));
}

#[tokio::test]
async fn test_index_served() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app.oneshot(request("GET", "/", Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Upload prediction
// =============================================================================

#[tokio::test]
async fn test_predict_upload_trailing_delimiter() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));
    let csv: String = sample_csv()
        .lines()
        .map(|line| format!("{};\n", line))
        .collect();

    let response = app
        .oneshot(request("POST", "/api/predict", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 10);
    assert_eq!(body["rows"][0]["actual"], "Regular");
}

#[tokio::test]
async fn test_predict_upload_missing_column_reported_before_model() {
    let empty_models = tempfile::tempdir().unwrap();
    let state = AppState::new(
        ModelRegistry::from_dir(empty_models.path()),
        DatabaseSource::Unavailable("no url".into()),
        &Settings::default(),
    );
    let app = build_router(state);

    let response = app
        .oneshot(request("POST", "/api/predict", "alcohol\n9,4\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "MISSING_COLUMNS");
}

#[tokio::test]
async fn test_predict_upload() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app
        .oneshot(request(
            "POST",
            "/api/predict?model=gradient-boosted-tree",
            sample_csv(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["model"], "gradient-boosted-tree");
    assert_eq!(body["total_rows"], 10);
    assert_eq!(body["rows"].as_array().unwrap().len(), 10);
    assert_eq!(body["rows"][0]["predicted"], "Regular");
    assert_eq!(body["rows"][0]["actual"], "Regular");
    assert!(body["distribution"].is_array());
}

#[tokio::test]
async fn test_predict_upload_missing_column() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));
    let csv = "fixed acidity;volatile acidity;citric acid;residual sugar;chlorides;\
free sulfur dioxide;total sulfur dioxide;density;pH;sulphates\n\
7,4;0,7;0;1,9;0,076;11;34;0,9978;3,51;0,56\n";

    let response = app
        .oneshot(request("POST", "/api/predict", csv))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "MISSING_COLUMNS");
    assert!(body["error"]["message"].as_str().unwrap().contains("alcohol"));
    assert!(body.get("rows").is_none());
}

#[tokio::test]
async fn test_predict_upload_unknown_model() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app
        .oneshot(request("POST", "/api/predict?model=random-forest", sample_csv()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "MODEL_NOT_FOUND");
}

#[tokio::test]
async fn test_predict_upload_point_decimal_rejects_commas() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app
        .oneshot(request("POST", "/api/predict?decimal=point", sample_csv()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "VALUE_CONVERSION_ERROR");
}

/// Test helper: shipped artifacts behind a slow, counting loader
struct SlowCountingLoader {
    inner: JsonArtifactLoader,
    loads: Arc<AtomicUsize>,
}

impl ArtifactLoader for SlowCountingLoader {
    fn load(&self, id: ModelId) -> vinos_common::Result<Arc<dyn Classifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        self.inner.load(id)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_uploads_share_one_model_load() {
    let loads = Arc::new(AtomicUsize::new(0));
    let registry = ModelRegistry::new(Box::new(SlowCountingLoader {
        inner: JsonArtifactLoader::new(repo_path("models")),
        loads: Arc::clone(&loads),
    }));
    let state = AppState::new(
        registry,
        DatabaseSource::Unavailable("no url".into()),
        &Settings::default(),
    );
    let app = build_router(state);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                app.oneshot(request("POST", "/api/predict", sample_csv()))
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_predict_upload_empty_body() {
    let app = build_router(setup_state(DatabaseSource::Unavailable("no url".into())));

    let response = app
        .oneshot(request("POST", "/api/predict", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Sample prediction
// =============================================================================

#[tokio::test]
async fn test_samples_without_database_warns() {
    let app = build_router(setup_state(DatabaseSource::Unavailable(
        "Database connection not configured".into(),
    )));

    let response = app
        .oneshot(request("GET", "/api/samples", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body.get("report").is_none());
    assert!(body["warning"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_samples_failed_query_warns() {
    let dir = tempfile::tempdir().unwrap();
    // database file exists but has no vinos table
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("empty.db").display());
    let app = build_router(setup_state(DatabaseSource::Configured(url)));

    let response = app
        .oneshot(request("GET", "/api/samples", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body.get("report").is_none());
    assert!(body["warning"].as_str().unwrap().contains("Could not load sample data"));
}

#[tokio::test]
async fn test_samples_predicted_and_cached() {
    let (_dir, url) = setup_db().await;
    let state = setup_state(DatabaseSource::Configured(url));
    let app = build_router(state.clone());

    let response = app
        .clone()
        .oneshot(request("GET", "/api/samples?model=decision-tree", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["report"]["total_rows"], 10);
    assert_eq!(body["report"]["rows"][0]["id"], "1");
    assert_eq!(body["report"]["rows"][0]["actual"], "Regular");
    let first_refresh = state.samples.refreshed_at().await;
    assert!(first_refresh.is_some());

    // second request is served from the cache
    let response = app
        .clone()
        .oneshot(request("GET", "/api/samples", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.samples.refreshed_at().await, first_refresh);

    // manual invalidation drops the cached rows
    let response = app
        .oneshot(request("POST", "/api/samples/refresh", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.samples.refreshed_at().await, None);
}
