//! Integration tests for Atelier.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and start the storefront with an import key configured
//! cargo run -p atelier-cli -- migrate
//! CATALOG_IMPORT_API_KEY=... cargo run -p atelier-storefront
//!
//! # Run the ignored integration tests
//! cargo test -p atelier-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `ATELIER_BASE_URL` - Storefront URL (default `http://localhost:3000`)
//! - `CATALOG_IMPORT_API_KEY` - Same key the server was started with
//! - `STOREFRONT_DATABASE_URL` / `DATABASE_URL` - Database the server writes to

use reqwest::{Client, Response};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

/// Shared handles for a test: HTTP client, server URL and database.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub api_key: String,
    pub pool: PgPool,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// # Panics
    ///
    /// Panics if the import key or database URL is missing, or the database
    /// is unreachable.
    pub async fn new() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("ATELIER_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_key =
            std::env::var("CATALOG_IMPORT_API_KEY").expect("CATALOG_IMPORT_API_KEY must be set");
        let database_url = std::env::var("STOREFRONT_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .expect("STOREFRONT_DATABASE_URL or DATABASE_URL must be set");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        Self {
            client: Client::new(),
            base_url,
            api_key,
            pool,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Post an import envelope with the configured key.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn import(&self, kind: &str, data: Value) -> Response {
        self.client
            .post(self.url("/api/catalog/import"))
            .header("x-api-key", &self.api_key)
            .json(&json!({ "type": kind, "data": data }))
            .send()
            .await
            .expect("Failed to send import request")
    }

    /// Post an import and assert it succeeded with `expected` records.
    ///
    /// # Panics
    ///
    /// Panics if the import does not succeed.
    pub async fn import_ok(&self, kind: &str, data: Value, expected: u64) {
        let resp = self.import(kind, data).await;
        assert_eq!(resp.status(), 200, "import of {kind} failed");
        let body: Value = resp.json().await.expect("Invalid import response");
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], expected);
    }
}

/// Handle unique to one test run, e.g. `it-coat-3f9a0c1b`.
#[must_use]
pub fn unique_handle(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("it-{prefix}-{}", id.get(..8).unwrap_or(&id))
}
