// [libs/domain/verifier/tests/verify_e2e.rs]
//! End-to-end scenarios against a live Postgres instance and a mocked
//! remote endpoint. Run with `POSTGRES_HOST` (and the rest of the
//! `POSTGRES_*` family `DbConfig::from_env` reads) pointed at a
//! disposable test database, then `cargo test -- --ignored`; these are
//! too slow and too environment-dependent for the default local loop.

use prospector_catalog_store::repositories::{endpoint, model, verified_endpoint, verification_history};
use prospector_catalog_store::{CatalogStore, DbConfig};
use prospector_probe_client::ProbeClient;
use prospector_verifier::{ScanStatus, VerdictKind, Verifier};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn connect() -> CatalogStore {
    std::env::var("POSTGRES_HOST").expect("POSTGRES_HOST (and friends) must point at a disposable test database for ignored integration tests");
    let config = DbConfig::from_env().expect("reading test database configuration from the environment");
    CatalogStore::connect(config).await.expect("connecting to the test database")
}

async fn clean(store: &CatalogStore, ip: &str, port: i64) {
    let _ = store.exec("DELETE FROM endpoints WHERE ip = $1 AND port = $2", &[
        prospector_catalog_store::SqlValue::Text(ip.to_string()),
        prospector_catalog_store::SqlValue::Int(port),
    ]).await;
}

#[tokio::test]
#[ignore]
async fn valid_probe_creates_endpoint_verified_endpoint_and_model() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: u16 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;

    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "models": [{
            "name": "llama3",
            "size": 4_000_000_000i64,
            "details": { "parameter_size": "7B", "quantization_level": "Q4_K_M" }
        }]
    }))).mount(&mock).await;

    Mock::given(method("POST")).and(path("/api/generate")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": "Hello! I am running fine today.",
        "eval_count": 7,
        "eval_duration": 200_000_000i64
    }))).mount(&mock).await;

    Mock::given(method("GET")).and(path("/api/version")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "version": "0.1.0" }))).mount(&mock).await;
    Mock::given(method("GET")).and(path("/api/ps")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": [] }))).mount(&mock).await;

    let verifier = Verifier::new(store.clone(), ProbeClient::new());
    let outcome = verifier.verify(&ip, port, ScanStatus::Unverified, false).await.expect("verify should not error");

    assert_eq!(outcome.verdict_kind, VerdictKind::Valid);

    let endpoint_row = store
        .transaction(|tx| Box::pin(async move { endpoint::find_by_ip_port(tx, &ip, port as i32).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist");
    assert!(endpoint_row.verified == prospector_catalog_models::VerificationStatus::Verified);
    assert!(!endpoint_row.is_honeypot);

    let endpoint_id = endpoint_row.id;
    let models = store
        .transaction(move |tx| Box::pin(async move { model::list_for_endpoint(tx, endpoint_id).await }))
        .await
        .expect("model lookup");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "llama3");
    let size_mb = models[0].size_mb.expect("reconciled model should carry a size");
    assert!((size_mb - 3814.7).abs() < 1.0);
}

#[tokio::test]
#[ignore]
async fn unauthorized_tags_response_marks_auth_required_without_verified_endpoint() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: u16 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;

    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(401)).mount(&mock).await;

    let verifier = Verifier::new(store.clone(), ProbeClient::new());
    let outcome = verifier.verify(&ip, port, ScanStatus::Unverified, false).await.expect("verify should not error");

    assert_eq!(outcome.verdict_kind, VerdictKind::AuthRequired);

    let endpoint_row = store
        .transaction(|tx| Box::pin(async move { endpoint::find_by_ip_port(tx, &ip, port as i32).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist");
    assert!(endpoint_row.auth_required);

    let endpoint_id = endpoint_row.id;
    let verified = store
        .transaction(move |tx| Box::pin(async move { verified_endpoint::delete(tx, endpoint_id).await.map(|_| ()) }))
        .await;
    assert!(verified.is_ok(), "deleting an absent VerifiedEndpoint row is a no-op, confirming it was never created");
}

#[tokio::test]
#[ignore]
async fn running_verify_twice_appends_exactly_two_history_rows() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: u16 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;

    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "models": [{ "name": "llama3", "size": 4_000_000_000i64 }]
    }))).mount(&mock).await;
    Mock::given(method("POST")).and(path("/api/generate")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": "Hello! I am running fine today.",
        "eval_count": 7,
        "eval_duration": 200_000_000i64
    }))).mount(&mock).await;
    Mock::given(method("GET")).and(path("/api/version")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "version": "0.1.0" }))).mount(&mock).await;
    Mock::given(method("GET")).and(path("/api/ps")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": [] }))).mount(&mock).await;

    let verifier = Verifier::new(store.clone(), ProbeClient::new());
    verifier.verify(&ip, port, ScanStatus::Unverified, false).await.expect("first verify");
    verifier.verify(&ip, port, ScanStatus::Unverified, false).await.expect("second verify");

    let endpoint_id = store
        .transaction({
            let ip = ip.clone();
            move |tx| Box::pin(async move { endpoint::find_by_ip_port(tx, &ip, port as i32).await })
        })
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist")
        .id;

    let history = store
        .transaction(move |tx| Box::pin(async move { verification_history::recent_for_endpoint(tx, endpoint_id, 10).await }))
        .await
        .expect("history lookup");
    assert_eq!(history.len(), 2);
}

/// Probe step 3 (`/api/generate`) failing after step 1 (`/api/tags`)
/// succeeded yields Invalid with a reason naming the failing step, and
/// never creates a `VerifiedEndpoint`.
#[tokio::test]
#[ignore]
async fn generate_failure_after_tags_success_yields_invalid_naming_the_step() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: u16 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;

    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "models": [{ "name": "llama3", "size": 4_000_000_000i64 }]
    }))).mount(&mock).await;
    Mock::given(method("POST")).and(path("/api/generate")).respond_with(ResponseTemplate::new(500)).mount(&mock).await;

    let verifier = Verifier::new(store.clone(), ProbeClient::new());
    let outcome = verifier.verify(&ip, port, ScanStatus::Unverified, false).await.expect("verify should not error");

    assert_eq!(outcome.verdict_kind, VerdictKind::Invalid);
    assert!(outcome.reason.as_deref().unwrap_or_default().contains("Generate"));

    let endpoint_row = store
        .transaction(|tx| Box::pin(async move { endpoint::find_by_ip_port(tx, &ip, port as i32).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist");
    let endpoint_id = endpoint_row.id;
    let verified = store
        .transaction(move |tx| Box::pin(async move { verified_endpoint::delete(tx, endpoint_id).await.map(|_| ()) }))
        .await;
    assert!(verified.is_ok(), "deleting an absent VerifiedEndpoint row is a no-op, confirming it was never created");
}

/// `preserve_verified = true` only protects status-only discovery upserts;
/// a probe that actually runs and fails still transitions the endpoint to
/// rejected (spec §8 boundary 3).
#[tokio::test]
#[ignore]
async fn preserve_verified_does_not_survive_a_failed_probe() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: u16 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;

    // Seed the endpoint as already verified before the failing probe runs.
    let seed_ip = ip.clone();
    store
        .transaction(move |tx| {
            Box::pin(async move {
                endpoint::upsert_on_discovery(tx, &seed_ip, port as i32, prospector_catalog_models::VerificationStatus::Verified, false, chrono::Utc::now()).await
            })
        })
        .await
        .expect("seeding a pre-verified endpoint");

    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(500)).mount(&mock).await;

    let verifier = Verifier::new(store.clone(), ProbeClient::new());
    let outcome = verifier.verify(&ip, port, ScanStatus::Verified, true).await.expect("verify should not error");
    assert_eq!(outcome.verdict_kind, VerdictKind::Invalid);

    let endpoint_row = store
        .transaction(|tx| Box::pin(async move { endpoint::find_by_ip_port(tx, &ip, port as i32).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist");
    assert_eq!(endpoint_row.verified, prospector_catalog_models::VerificationStatus::Rejected);
}

/// Universal invariants (spec §8): exercised across a Valid run followed
/// by a Honeypot run against the same endpoint.
#[tokio::test]
#[ignore]
async fn invariants_hold_across_valid_then_honeypot_transition() {
    let store = connect().await;
    let mock = MockServer::start().await;
    let ip = mock.uri().trim_start_matches("http://").split(':').next().unwrap().to_string();
    let port: u16 = mock.uri().rsplit(':').next().unwrap().parse().unwrap();

    clean(&store, &ip, port as i64).await;

    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "models": [{ "name": "llama3", "size": 4_000_000_000i64 }]
    }))).up_to_n_times(1).mount(&mock).await;
    Mock::given(method("POST")).and(path("/api/generate")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": "Hello! I am running fine today.",
        "eval_count": 7,
        "eval_duration": 200_000_000i64
    }))).up_to_n_times(1).mount(&mock).await;
    Mock::given(method("GET")).and(path("/api/version")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "version": "0.1.0" }))).mount(&mock).await;
    Mock::given(method("GET")).and(path("/api/ps")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "models": [] }))).mount(&mock).await;

    let verifier = Verifier::new(store.clone(), ProbeClient::new());
    let valid_outcome = verifier.verify(&ip, port, ScanStatus::Unverified, false).await.expect("first verify");
    assert_eq!(valid_outcome.verdict_kind, VerdictKind::Valid);

    let endpoint_id = valid_outcome.endpoint_id;
    let after_valid = store
        .transaction(move |tx| Box::pin(async move { endpoint::find_by_id(tx, endpoint_id).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist");
    assert_eq!(after_valid.verified, prospector_catalog_models::VerificationStatus::Verified);
    assert!(!after_valid.is_honeypot, "invariant 1: a VerifiedEndpoint implies its Endpoint is verified and not a honeypot");

    // Four canned-sounding DeepSeek-style tags flip the classifier to Honeypot on re-scan.
    Mock::given(method("GET")).and(path("/api/tags")).respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "models": [
            { "name": "deepseek-r1:1.5b" }, { "name": "deepseek-r1:7b" },
            { "name": "deepseek-r1:8b" }, { "name": "deepseek-r1:14b" }
        ]
    }))).mount(&mock).await;

    let honeypot_outcome = verifier.verify(&ip, port, ScanStatus::Verified, false).await.expect("second verify");
    assert_eq!(honeypot_outcome.verdict_kind, VerdictKind::Honeypot);

    let after_honeypot = store
        .transaction(move |tx| Box::pin(async move { endpoint::find_by_id(tx, endpoint_id).await }))
        .await
        .expect("endpoint lookup")
        .expect("endpoint row must exist");
    assert!(after_honeypot.is_honeypot, "invariant 2: a honeypot-flagged Endpoint has no VerifiedEndpoint row");

    let verified_gone = store
        .transaction(move |tx| Box::pin(async move { verified_endpoint::delete(tx, endpoint_id).await.map(|_| ()) }))
        .await;
    assert!(verified_gone.is_ok(), "the VerifiedEndpoint marker must already be gone (deleting an absent row is a no-op)");

    let models = store
        .transaction(move |tx| Box::pin(async move { model::list_for_endpoint(tx, endpoint_id).await }))
        .await
        .expect("model lookup");
    assert!(models.iter().all(|m| m.endpoint_id == endpoint_id), "invariant 3: every Model's endpoint_id identifies an extant Endpoint");
}
