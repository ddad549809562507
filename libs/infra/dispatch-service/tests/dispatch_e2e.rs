// [libs/infra/dispatch-service/tests/dispatch_e2e.rs]
//! End-to-end scenarios against a live Postgres instance and a mocked
//! remote endpoint. Run with `POSTGRES_HOST` (and the rest of the
//! `POSTGRES_*` family `DbConfig::from_env` reads) pointed at a
//! disposable test database, then `cargo test -- --ignored`.

use chrono::{Duration as ChronoDuration, Utc};
use prospector_catalog_models::{ApiType, ObservedModel, VerificationStatus};
use prospector_catalog_store::repositories::{endpoint, model, verified_endpoint};
use prospector_catalog_store::{CatalogStore, DbConfig, SqlValue};
use prospector_dispatch_service::{forward, resolve, DispatchError, ForwardRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn connect() -> CatalogStore {
    std::env::var("POSTGRES_HOST").expect("POSTGRES_HOST (and friends) must point at a disposable test database for ignored integration tests");
    let config = DbConfig::from_env().expect("reading test database configuration from the environment");
    CatalogStore::connect(config).await.expect("connecting to the test database")
}

async fn clean(store: &CatalogStore, ip: &str, port: i64) {
    let _ = store
        .exec(
            "DELETE FROM endpoints WHERE ip = $1 AND port = $2",
            &[SqlValue::Text(ip.to_string()), SqlValue::Int(port)],
        )
        .await;
}

/// Sets up a verified, non-honeypot endpoint hosting one model named
/// `model_name`, with `verified_endpoints.verification_date` pinned to
/// `verification_date`. Returns the endpoint id.
async fn seed_verified_endpoint(
    store: &CatalogStore,
    ip: &str,
    port: i32,
    model_name: &str,
    verification_date: chrono::DateTime<Utc>,
) -> i64 {
    let ip = ip.to_string();
    let model_name = model_name.to_string();
    store
        .transaction(move |tx| {
            Box::pin(async move {
                let now = Utc::now();
                let endpoint_row = endpoint::upsert_on_discovery(tx, &ip, port, VerificationStatus::Unverified, false, now).await?;
                endpoint::mark_valid(tx, endpoint_row.id, ApiType::Ollama, Some("0.1.0"), &[], now).await?;
                verified_endpoint::upsert(tx, endpoint_row.id, Some("api_tags"), verification_date).await?;
                model::reconcile(
                    tx,
                    endpoint_row.id,
                    &[ObservedModel { name: model_name, parameter_size: None, quantization_level: None, size_mb: Some(1000.0) }],
                )
                .await?;
                Ok(endpoint_row.id)
            })
        })
        .await
        .expect("seeding a verified endpoint")
}

#[tokio::test]
#[ignore]
async fn resolve_by_name_picks_most_recently_verified_endpoint() {
    let store = connect().await;
    clean(&store, "10.0.0.1", 11434).await;
    clean(&store, "10.0.0.2", 11434).await;

    let now = Utc::now();
    let older_id = seed_verified_endpoint(&store, "10.0.0.1", 11434, "llama3:8b", now - ChronoDuration::hours(1)).await;
    let newer_id = seed_verified_endpoint(&store, "10.0.0.2", 11434, "llama3:8b", now).await;

    let target = resolve(&store, "llama3").await.expect("resolve should find a match");

    assert_eq!(target.endpoint_id, newer_id);
    assert_ne!(target.endpoint_id, older_id);
    assert_eq!(target.ip, "10.0.0.2");
}

#[tokio::test]
#[ignore]
async fn resolve_skips_honeypot_and_inactive_endpoints() {
    let store = connect().await;
    clean(&store, "10.0.0.3", 11434).await;

    let endpoint_id = seed_verified_endpoint(&store, "10.0.0.3", 11434, "mistral:7b", Utc::now()).await;
    store
        .transaction(move |tx| Box::pin(async move { endpoint::mark_honeypot(tx, endpoint_id, "canned response", Utc::now()).await }))
        .await
        .expect("marking honeypot");

    let result = resolve(&store, "mistral").await;
    assert!(matches!(result, Err(DispatchError::ModelNotFound(_))), "a honeypot endpoint must never be resolved to");
}

#[tokio::test]
#[ignore]
async fn forward_upstream_500_returns_error_without_altering_endpoint_row() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: i32 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;
    let verification_date = Utc::now() - ChronoDuration::minutes(5);
    let endpoint_id = seed_verified_endpoint(&store, &ip, port, "llama3:8b", verification_date).await;

    Mock::given(method("POST")).and(path("/api/chat")).respond_with(ResponseTemplate::new(500)).mount(&mock).await;

    let target = resolve(&store, "llama3").await.expect("resolve should find the seeded endpoint");
    let http = reqwest::Client::new();
    let request = ForwardRequest {
        user_id: "test-user",
        prompt: "hello",
        system_prompt: None,
        temperature: 0.7,
        max_tokens: 128,
        save_history: false,
    };

    let result = forward(&store, &http, &target, &request).await;
    assert!(matches!(result, Err(DispatchError::UpstreamStatus(500))));

    let endpoint_row = store
        .transaction(move |tx| Box::pin(async move { endpoint::find_by_id(tx, endpoint_id).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must still exist");
    assert_eq!(endpoint_row.verified, VerificationStatus::Verified, "a forward failure is the caller's problem, not a verification signal");
    assert_eq!(endpoint_row.verification_date.map(|d| d.timestamp()), Some(verification_date.timestamp()));
}
