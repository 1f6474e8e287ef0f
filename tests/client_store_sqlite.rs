//! SQLite client store integration tests
//!
//! These tests exercise the public store contract: round trips, duplicate and
//! missing clients, provisioning against shared databases, and concurrent writers.

#![cfg(feature = "sqlite")]

use oauth2_client_store::errors::{ConfigError, StorageError};
use oauth2_client_store::oauth::{Client, ClientInfo};
use oauth2_client_store::storage::{
    ClientInfoStore, ClientStoreOptions, PoolSettings, RequestContext, SqliteClientStore,
    StorageBackend, TableName, create_client_store,
};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn database_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("clients.db").display())
}

async fn memory_store() -> SqliteClientStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteClientStore::with_pool(pool, ClientStoreOptions::default())
        .await
        .unwrap()
}

fn example_client() -> Client {
    Client::new("abc", "s3cr3t", "https://example.com").with_user_id("42")
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let store = memory_store().await;
    let ctx = RequestContext::background();

    let client = example_client();
    store.create(&ctx, &client).await.unwrap();

    let fetched: Client = store.get_by_id(&ctx, "abc").await.unwrap().unwrap();
    assert_eq!(fetched.id(), "abc");
    assert_eq!(fetched.secret(), "s3cr3t");
    assert_eq!(fetched.domain(), "https://example.com");
    assert!(!fetched.is_public());
    assert_eq!(fetched, client);
}

#[tokio::test]
async fn test_duplicate_client_id_rejected() {
    let store = memory_store().await;
    let ctx = RequestContext::background();

    store.create(&ctx, &example_client()).await.unwrap();

    let second = Client::new("abc", "other", "https://other.example.com");
    let result = store.create(&ctx, &second).await;
    assert!(
        matches!(result, Err(StorageError::DuplicateClient(ref id)) if id == "abc"),
        "unexpected result: {result:?}"
    );

    // The first registration is untouched
    let fetched: Client = store.get_by_id(&ctx, "abc").await.unwrap().unwrap();
    assert_eq!(fetched.secret, "s3cr3t");
}

#[tokio::test]
async fn test_unknown_client_not_found() {
    let store = memory_store().await;
    let ctx = RequestContext::background();

    let result: Result<Option<Client>, StorageError> =
        store.get_by_id(&ctx, "nonexistent-id").await;
    match result {
        Err(err) => assert!(err.is_not_found(), "unexpected error: {err}"),
        Ok(client) => panic!("expected not found, got {client:?}"),
    }
}

#[tokio::test]
async fn test_empty_client_id_returns_none() {
    let store = memory_store().await;
    let ctx = RequestContext::background();
    store.create(&ctx, &example_client()).await.unwrap();

    let result: Option<Client> = store.get_by_id(&ctx, "").await.unwrap();
    assert!(result.is_none());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RegisteredClient {
    client_id: String,
    client_secret: String,
    redirect_domain: String,
    public: bool,
    owner: String,
    metadata: BTreeMap<String, serde_json::Value>,
}

impl ClientInfo for RegisteredClient {
    fn id(&self) -> &str {
        &self.client_id
    }

    fn secret(&self) -> &str {
        &self.client_secret
    }

    fn domain(&self) -> &str {
        &self.redirect_domain
    }

    fn is_public(&self) -> bool {
        self.public
    }

    fn user_id(&self) -> &str {
        &self.owner
    }
}

#[tokio::test]
async fn test_custom_entity_metadata_round_trip() {
    let store = memory_store().await;
    let ctx = RequestContext::background();

    let mut metadata = BTreeMap::new();
    metadata.insert("client_name".to_string(), serde_json::json!("Dashboard"));
    metadata.insert(
        "redirect_uris".to_string(),
        serde_json::json!(["https://app.example.com/callback"]),
    );
    let client = RegisteredClient {
        client_id: "dashboard".to_string(),
        client_secret: String::new(),
        redirect_domain: "https://app.example.com".to_string(),
        public: true,
        owner: "1001".to_string(),
        metadata,
    };

    store.create(&ctx, &client).await.unwrap();

    let fetched: RegisteredClient = store.get_by_id(&ctx, "dashboard").await.unwrap().unwrap();
    assert_eq!(fetched, client);
}

#[tokio::test]
async fn test_connect_provisions_table_once() {
    let dir = tempfile::tempdir().unwrap();
    let url = database_url(&dir);
    let options = ClientStoreOptions::default()
        .with_table_name(TableName::try_from("oauth2_clients").unwrap())
        .with_pool(PoolSettings::new(4, 1, Duration::from_secs(60)));
    let ctx = RequestContext::background();

    let first = SqliteClientStore::connect(&url, options.clone()).await.unwrap();
    assert!(first.table_exists(&ctx).await.unwrap());
    first.create(&ctx, &example_client()).await.unwrap();

    // A second store on the same table keeps existing rows
    let second = SqliteClientStore::connect(&url, options).await.unwrap();
    let fetched: Client = second.get_by_id(&ctx, "abc").await.unwrap().unwrap();
    assert_eq!(fetched, example_client());
}

#[tokio::test]
async fn test_stores_share_a_pool() {
    let dir = tempfile::tempdir().unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect(&database_url(&dir))
        .await
        .unwrap();
    let ctx = RequestContext::background();

    let clients = SqliteClientStore::with_pool(pool.clone(), ClientStoreOptions::default())
        .await
        .unwrap();
    let partners = SqliteClientStore::with_pool(
        pool,
        ClientStoreOptions::default().with_table_name(TableName::try_from("partner_clients").unwrap()),
    )
    .await
    .unwrap();

    clients.create(&ctx, &example_client()).await.unwrap();

    let missing: Result<Option<Client>, StorageError> = partners.get_by_id(&ctx, "abc").await;
    assert!(matches!(missing, Err(StorageError::NotFound(_))));

    let found: Option<Client> = clients.get_by_id(&ctx, "abc").await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_concurrent_creates_with_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        SqliteClientStore::connect(
            &database_url(&dir),
            ClientStoreOptions::default().with_pool(PoolSettings::new(8, 2, Duration::from_secs(60))),
        )
        .await
        .unwrap(),
    );
    let ctx = RequestContext::background();

    let tasks = (0..16).map(|i| {
        let store = store.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let client = Client::new(format!("client-{i}"), format!("secret-{i}"), "https://example.com")
                .with_user_id(i.to_string());
            store.create(&ctx, &client).await
        })
    });

    for result in futures::future::join_all(tasks).await {
        result.unwrap().unwrap();
    }

    for i in 0..16 {
        let fetched: Client = store
            .get_by_id(&ctx, &format!("client-{i}"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.secret, format!("secret-{i}"));
        assert_eq!(fetched.user_id, i.to_string());
    }
}

#[tokio::test]
async fn test_concurrent_creates_with_same_id() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(
        SqliteClientStore::connect(
            &database_url(&dir),
            ClientStoreOptions::default().with_pool(PoolSettings::new(8, 2, Duration::from_secs(60))),
        )
        .await
        .unwrap(),
    );
    let ctx = RequestContext::background();

    let tasks = (0..16).map(|i| {
        let store = store.clone();
        let ctx = ctx.clone();
        tokio::spawn(async move {
            let client = Client::new("same", format!("secret-{i}"), "https://example.com");
            store.create(&ctx, &client).await
        })
    });

    let mut created = 0;
    for result in futures::future::join_all(tasks).await {
        match result.unwrap() {
            Ok(()) => created += 1,
            Err(StorageError::DuplicateClient(id)) => assert_eq!(id, "same"),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
    assert_eq!(created, 1);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM oauth2_clients WHERE client_id = 'same'")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_factory_returns_shared_trait_object() {
    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ClientInfoStore<Client>> = create_client_store(
        StorageBackend::Sqlite(database_url(&dir)),
        ClientStoreOptions::default(),
    )
    .await
    .unwrap();
    let ctx = RequestContext::background().with_timeout(Duration::from_secs(30));

    store.create(&ctx, &example_client()).await.unwrap();
    let fetched = store.get_by_id(&ctx, "abc").await.unwrap();
    assert_eq!(fetched, Some(example_client()));
}

#[tokio::test]
async fn test_invalid_database_url_is_config_error() {
    let result =
        SqliteClientStore::connect("sqlite:/nonexistent-dir/clients.db", ClientStoreOptions::default()).await;
    assert!(matches!(result, Err(ConfigError::ConnectionFailed(_))));
}
