// [libs/infra/catalog-store/tests/reconcile_e2e.rs]
//! Round-trip and invariant checks for `repositories::model::reconcile`
//! against a live Postgres instance. Run with `POSTGRES_HOST` (and the
//! rest of the `POSTGRES_*` family `DbConfig::from_env` reads) pointed at
//! a disposable test database, then `cargo test -- --ignored`.

use chrono::Utc;
use prospector_catalog_models::{ObservedModel, VerificationStatus};
use prospector_catalog_store::repositories::{endpoint, model};
use prospector_catalog_store::{CatalogStore, DbConfig, SqlValue};

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

fn observed(name: &str, parameter_size: Option<&str>, quantization_level: Option<&str>, size_mb: f64) -> ObservedModel {
    ObservedModel {
        name: name.to_string(),
        parameter_size: parameter_size.map(str::to_string),
        quantization_level: quantization_level.map(str::to_string),
        size_mb: Some(size_mb),
    }
}

/// Reconciling an observed set and re-reading it yields the same set back,
/// ignoring order and the fields the input never set.
#[tokio::test]
#[ignore]
async fn reconcile_then_list_round_trips_to_an_equal_set() {
    let store = connect().await;
    clean(&store, "10.0.1.1", 11434).await;

    let endpoint_id = store
        .transaction(|tx| {
            Box::pin(async move {
                endpoint::upsert_on_discovery(tx, "10.0.1.1", 11434, VerificationStatus::Never, false, Utc::now()).await
            })
        })
        .await
        .expect("seeding endpoint")
        .id;

    let input = vec![
        observed("llama3:8b", Some("7B"), Some("Q4_K_M"), 3814.7),
        observed("phi3", None, None, 1907.3),
    ];

    store
        .transaction(move |tx| {
            let input = input.clone();
            Box::pin(async move { model::reconcile(tx, endpoint_id, &input).await })
        })
        .await
        .expect("first reconcile");

    let mut round_tripped = store
        .transaction(move |tx| Box::pin(async move { model::list_for_endpoint(tx, endpoint_id).await }))
        .await
        .expect("listing models");
    round_tripped.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(round_tripped.len(), 2);
    assert_eq!(round_tripped[0].name, "llama3:8b");
    assert_eq!(round_tripped[0].parameter_size.as_deref(), Some("7B"));
    assert_eq!(round_tripped[0].quantization_level.as_deref(), Some("Q4_K_M"));
    assert_eq!(round_tripped[1].name, "phi3");
    assert_eq!(round_tripped[1].parameter_size, None);
}

/// After reconciling against a smaller observed set, the stored Model set
/// is exactly that smaller set — stale rows from the prior reconcile are
/// gone, not merely superseded.
#[tokio::test]
#[ignore]
async fn reconcile_drops_models_absent_from_the_new_observed_set() {
    let store = connect().await;
    clean(&store, "10.0.1.2", 11434).await;

    let endpoint_id = store
        .transaction(|tx| {
            Box::pin(async move {
                endpoint::upsert_on_discovery(tx, "10.0.1.2", 11434, VerificationStatus::Never, false, Utc::now()).await
            })
        })
        .await
        .expect("seeding endpoint")
        .id;

    let first = vec![observed("llama3:8b", Some("7B"), Some("Q4_K_M"), 3814.7), observed("phi3", None, None, 1907.3)];
    store
        .transaction(move |tx| {
            let first = first.clone();
            Box::pin(async move { model::reconcile(tx, endpoint_id, &first).await })
        })
        .await
        .expect("first reconcile");

    let second = vec![observed("llama3:8b", Some("7B"), Some("Q4_K_M"), 3814.7)];
    store
        .transaction(move |tx| {
            let second = second.clone();
            Box::pin(async move { model::reconcile(tx, endpoint_id, &second).await })
        })
        .await
        .expect("second reconcile");

    let remaining = store
        .transaction(move |tx| Box::pin(async move { model::list_for_endpoint(tx, endpoint_id).await }))
        .await
        .expect("listing models");

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "llama3:8b");
}
