//! HTTP client for the hosted BaaS: auth, REST tables and object storage.

use super::models::{
    AuthResponse, NewPriceResult, NewScan, NewScanResult, NewSupportTicket, Page, Profile,
    ProfileUpdate, ScanRecord, Session, SettingsUpdate, UserDataExport, UserSettings,
};
use crate::analysis::models::image_mime;
use crate::config::Config;
use crate::error::ServiceError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::RngExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};
use wreq::{Client, RequestBuilder};

const NESTED_SCAN_SELECT: &str = "*,scan_results(*),price_results(*)";

/// Trait for BaaS calls - enables mocking for tests.
#[async_trait]
pub trait BaasStore: Send + Sync {
    /// Signs in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Registers a new account. Fails with `ConfirmationRequired` when the
    /// project requires email confirmation before issuing a session.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session>;

    /// Revokes the session's tokens.
    async fn sign_out(&self, session: &Session) -> Result<()>;

    /// Changes the signed-in user's password.
    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()>;

    /// Deletes the profile row; dependent rows cascade server-side.
    async fn delete_account(&self, user_id: &str) -> Result<()>;

    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>>;

    async fn update_settings(&self, user_id: &str, update: &SettingsUpdate) -> Result<()>;

    /// Inserts a scan row and returns it with its generated id.
    async fn save_scan(&self, scan: &NewScan) -> Result<ScanRecord>;

    async fn save_scan_result(&self, result: &NewScanResult) -> Result<()>;

    async fn save_price_result(&self, result: &NewPriceResult) -> Result<()>;

    /// Lists scans with nested results, newest first.
    async fn history(&self, user_id: &str, page: Page) -> Result<Vec<ScanRecord>>;

    /// Fetches one scan with nested results.
    async fn get_scan(&self, scan_id: &str) -> Result<Option<ScanRecord>>;

    async fn create_support_ticket(&self, ticket: &NewSupportTicket) -> Result<()>;

    /// Uploads a local image and returns its public URL.
    async fn upload_image(&self, bucket: &str, path: &Path) -> Result<String>;

    /// Collects every row stored for the user.
    async fn export_user_data(&self, user_id: &str) -> Result<UserDataExport>;
}

/// Supabase-compatible client.
///
/// Requests carry the project key as `apikey` and the session token (or the
/// project key when signed out) as the bearer token.
pub struct BaasClient {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

impl BaasClient {
    /// Creates a client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let (url, key) = config.baas_credentials().ok_or(ServiceError::BaasNotConfigured)?;

        let mut builder = Client::builder().gzip(true).brotli(true);

        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: key.to_string(),
            access_token: None,
        })
    }

    /// Creates a client against a custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let config = Config {
            baas_url: Some(base_url.into()),
            baas_key: Some(api_key.into()),
            ..Config::default()
        };
        Self::new(&config)
    }

    /// Authenticates subsequent requests as the session's user.
    pub fn with_session(mut self, session: Option<&Session>) -> Self {
        self.access_token = session.map(|s| s.access_token.clone());
        self
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public URL of an object in a public bucket.
    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            urlencoding::encode(name)
        )
    }

    fn rest_url(&self, table: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url, table);
        for (i, (key, value)) in query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Sends a request as the current user and returns the body of a
    /// successful response.
    async fn send(&self, endpoint: &str, builder: RequestBuilder) -> Result<String> {
        let token = self.access_token.as_deref().unwrap_or(&self.api_key);
        self.send_as(endpoint, builder, token).await
    }

    async fn send_as(&self, endpoint: &str, builder: RequestBuilder, token: &str) -> Result<String> {
        let response = builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|source| ServiceError::Transport { endpoint: endpoint.to_string(), source })?;

        let status = response.status();
        debug!("{} -> {}", endpoint, status);

        let body = response
            .text()
            .await
            .map_err(|source| ServiceError::Transport { endpoint: endpoint.to_string(), source })?;

        if !status.is_success() {
            return Err(ServiceError::Server {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, endpoint: &str, builder: RequestBuilder) -> Result<T> {
        let body = self.send(endpoint, builder).await?;
        let parsed = serde_json::from_str(&body)
            .map_err(|source| ServiceError::Decode { endpoint: endpoint.to_string(), source })?;
        Ok(parsed)
    }

    fn json_body<T: Serialize + ?Sized>(builder: RequestBuilder, payload: &T) -> Result<RequestBuilder> {
        let body = serde_json::to_string(payload).context("Failed to serialize request body")?;
        Ok(builder.header("Content-Type", "application/json").body(body))
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let url = self.rest_url(table, query);
        debug!("GET {}", url);
        self.send_json(table, self.client.get(&url)).await
    }

    async fn insert<T: Serialize + Sync + ?Sized>(&self, table: &str, row: &T) -> Result<()> {
        let url = self.rest_url(table, &[]);
        debug!("POST {}", url);
        let builder = self.client.post(&url).header("Prefer", "return=minimal");
        self.send(table, Self::json_body(builder, row)?).await?;
        Ok(())
    }

    async fn update<T: Serialize + Sync + ?Sized>(
        &self,
        table: &str,
        filter: (&str, String),
        changes: &T,
    ) -> Result<()> {
        let url = self.rest_url(table, &[filter]);
        debug!("PATCH {}", url);
        let builder = self.client.patch(&url).header("Prefer", "return=minimal");
        self.send(table, Self::json_body(builder, changes)?).await?;
        Ok(())
    }

    async fn auth(&self, endpoint: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let url = format!("{}/auth/v1/{}", self.base_url, endpoint);
        debug!("POST {}", url);
        let payload = serde_json::json!({ "email": email, "password": password });
        let builder = Self::json_body(self.client.post(&url), &payload)?;
        self.send_json(endpoint, builder).await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// Storage object name: `<unix-millis>-<random>.<ext>`.
pub fn object_name(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    let suffix: u32 = rand::rng().random_range(0..1_000_000);
    format!("{}-{:06}.{}", unix_millis(), suffix, ext)
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0)
}

fn now_rfc3339() -> Result<String> {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .context("Failed to format export timestamp")
}

#[async_trait]
impl BaasStore for BaasClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        info!("Signing in as {}", email);
        let response = self.auth("token?grant_type=password", email, password).await?;
        response.into_session().context("Sign-in response did not include a session")
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        info!("Registering {}", email);
        let response = self.auth("signup", email, password).await?;
        response
            .into_session()
            .ok_or_else(|| ServiceError::ConfirmationRequired { email: email.to_string() }.into())
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        debug!("POST {}", url);
        self.send_as("logout", self.client.post(&url), &session.access_token).await?;
        Ok(())
    }

    async fn update_password(&self, session: &Session, new_password: &str) -> Result<()> {
        info!("Updating password");
        let url = format!("{}/auth/v1/user", self.base_url);
        debug!("PUT {}", url);
        let payload = serde_json::json!({ "password": new_password });
        let builder = Self::json_body(self.client.put(&url), &payload)?;
        self.send_as("user", builder, &session.access_token).await?;
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let rows: Vec<Profile> =
            self.select("profiles", &[("select", "*".to_string()), ("id", eq(user_id))]).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        info!("Updating profile");
        self.update("profiles", ("id", eq(user_id)), update).await
    }

    async fn delete_account(&self, user_id: &str) -> Result<()> {
        info!("Deleting account data");
        let url = self.rest_url("profiles", &[("id", eq(user_id))]);
        debug!("DELETE {}", url);
        self.send("profiles", self.client.delete(&url)).await?;
        Ok(())
    }

    async fn get_settings(&self, user_id: &str) -> Result<Option<UserSettings>> {
        let rows: Vec<UserSettings> = self
            .select("user_settings", &[("select", "*".to_string()), ("user_id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn update_settings(&self, user_id: &str, update: &SettingsUpdate) -> Result<()> {
        info!("Updating settings");
        self.update("user_settings", ("user_id", eq(user_id)), update).await
    }

    async fn save_scan(&self, scan: &NewScan) -> Result<ScanRecord> {
        let url = self.rest_url("scans", &[]);
        debug!("POST {}", url);
        let builder = self.client.post(&url).header("Prefer", "return=representation");
        let rows: Vec<ScanRecord> = self.send_json("scans", Self::json_body(builder, scan)?).await?;
        rows.into_iter().next().context("Scan insert returned no rows")
    }

    async fn save_scan_result(&self, result: &NewScanResult) -> Result<()> {
        self.insert("scan_results", result).await
    }

    async fn save_price_result(&self, result: &NewPriceResult) -> Result<()> {
        self.insert("price_results", result).await
    }

    async fn history(&self, user_id: &str, page: Page) -> Result<Vec<ScanRecord>> {
        info!("Fetching history (offset {}, limit {})", page.offset, page.limit);
        self.select(
            "scans",
            &[
                ("select", NESTED_SCAN_SELECT.to_string()),
                ("user_id", eq(user_id)),
                ("order", "created_at.desc".to_string()),
                ("limit", page.limit.to_string()),
                ("offset", page.offset.to_string()),
            ],
        )
        .await
    }

    async fn get_scan(&self, scan_id: &str) -> Result<Option<ScanRecord>> {
        let rows: Vec<ScanRecord> = self
            .select("scans", &[("select", NESTED_SCAN_SELECT.to_string()), ("id", eq(scan_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn create_support_ticket(&self, ticket: &NewSupportTicket) -> Result<()> {
        info!("Creating support ticket: {}", ticket.subject);
        self.insert("support_tickets", ticket).await
    }

    async fn upload_image(&self, bucket: &str, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ServiceError::Io { path: path.display().to_string(), source })?;

        let name = object_name(path);
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            urlencoding::encode(bucket),
            urlencoding::encode(&name)
        );
        debug!("POST {} ({} bytes)", url, bytes.len());

        let builder = self
            .client
            .post(&url)
            .header("Content-Type", image_mime(path))
            .header("x-upsert", "false")
            .body(bytes);
        self.send("storage", builder).await?;

        Ok(self.public_url(bucket, &name))
    }

    async fn export_user_data(&self, user_id: &str) -> Result<UserDataExport> {
        info!("Exporting user data");
        let profile: Vec<Value> =
            self.select("profiles", &[("select", "*".to_string()), ("id", eq(user_id))]).await?;
        let settings: Vec<Value> = self
            .select("user_settings", &[("select", "*".to_string()), ("user_id", eq(user_id))])
            .await?;
        let scans: Vec<Value> = self
            .select("scans", &[("select", NESTED_SCAN_SELECT.to_string()), ("user_id", eq(user_id))])
            .await?;
        let support_tickets: Vec<Value> = self
            .select("support_tickets", &[("select", "*".to_string()), ("user_id", eq(user_id))])
            .await?;

        Ok(UserDataExport {
            profile: profile.into_iter().next(),
            settings: settings.into_iter().next(),
            scans,
            support_tickets,
            exported_at: now_rfc3339()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ScanIntent;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> Session {
        Session {
            access_token: "user-jwt".to_string(),
            refresh_token: None,
            user_id: "user-1".to_string(),
            email: Some("a@b.co".to_string()),
        }
    }

    fn client(server: &MockServer) -> BaasClient {
        BaasClient::with_base_url(server.uri(), "anon-key").unwrap().with_session(Some(&session()))
    }

    #[tokio::test]
    async fn test_not_configured() {
        let err = BaasClient::new(&Config::default()).err().unwrap();
        assert!(matches!(err.downcast_ref::<ServiceError>(), Some(ServiceError::BaasNotConfigured)));
    }

    #[tokio::test]
    async fn test_sign_in() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(header("Authorization", "Bearer anon-key"))
            .and(body_json(json!({"email": "a@b.co", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "user-jwt",
                "refresh_token": "r1",
                "user": {"id": "user-1", "email": "a@b.co"}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BaasClient::with_base_url(mock_server.uri(), "anon-key").unwrap();
        let session = client.sign_in("a@b.co", "secret").await.unwrap();

        assert_eq!(session.access_token, "user-jwt");
        assert_eq!(session.user_id, "user-1");
    }

    #[tokio::test]
    async fn test_sign_in_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&mock_server)
            .await;

        let client = BaasClient::with_base_url(mock_server.uri(), "anon-key").unwrap();
        let err = client.sign_in("a@b.co", "wrong").await.unwrap_err();

        assert_eq!(err.downcast_ref::<ServiceError>().and_then(|e| e.status()), Some(400));
        assert!(err.to_string().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn test_sign_up_requires_confirmation() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "user-2", "email": "n@b.co"})),
            )
            .mount(&mock_server)
            .await;

        let client = BaasClient::with_base_url(mock_server.uri(), "anon-key").unwrap();
        let err = client.sign_up("n@b.co", "secret").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::ConfirmationRequired { .. })
        ));
    }

    #[tokio::test]
    async fn test_sign_out_uses_session_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("Authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BaasClient::with_base_url(mock_server.uri(), "anon-key").unwrap();
        client.sign_out(&session()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_password() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/auth/v1/user"))
            .and(header("apikey", "anon-key"))
            .and(header("Authorization", "Bearer user-jwt"))
            .and(body_json(json!({"password": "n3w-secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "user-1"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = BaasClient::with_base_url(mock_server.uri(), "anon-key").unwrap();
        client.update_password(&session(), "n3w-secret").await.unwrap();
    }

    #[tokio::test]
    async fn test_update_password_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/auth/v1/user"))
            .respond_with(ResponseTemplate::new(422).set_body_string("same_password"))
            .mount(&mock_server)
            .await;

        let client = BaasClient::with_base_url(mock_server.uri(), "anon-key").unwrap();
        let err = client.update_password(&session(), "secret").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ServiceError>(),
            Some(ServiceError::Server { status: 422, .. })
        ));
    }

    #[tokio::test]
    async fn test_get_profile() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.user-1"))
            .and(header("Authorization", "Bearer user-jwt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "user-1", "full_name": "Asha Rao", "email": "a@b.co"}
            ])))
            .mount(&mock_server)
            .await;

        let profile = client(&mock_server).get_profile("user-1").await.unwrap().unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
    }

    #[tokio::test]
    async fn test_get_settings_missing_row() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/user_settings"))
            .and(query_param("user_id", "eq.user-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let settings = client(&mock_server).get_settings("user-1").await.unwrap();
        assert!(settings.is_none());
    }

    #[tokio::test]
    async fn test_update_settings_sends_only_changed_columns() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/user_settings"))
            .and(query_param("user_id", "eq.user-1"))
            .and(body_json(json!({"theme": "dark"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut update = SettingsUpdate::default();
        update.set("theme", "dark").unwrap();
        client(&mock_server).update_settings("user-1", &update).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_account() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/rest/v1/profiles"))
            .and(query_param("id", "eq.user-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(&mock_server).delete_account("user-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_save_scan_returns_row() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/scans"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(json!({"user_id": "user-1", "input_type": "image", "intent": "verify"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                {"id": "scan-9", "user_id": "user-1", "intent": "verify"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let scan = NewScan::image("user-1", ScanIntent::Verify, None);
        let record = client(&mock_server).save_scan(&scan).await.unwrap();
        assert_eq!(record.id, "scan-9");
    }

    #[tokio::test]
    async fn test_save_scan_result_stores_metadata() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/scan_results"))
            .and(body_json(json!({
                "scan_id": "scan-9",
                "authenticity_status": "analyzed",
                "confidence_score": 92,
                "product_name": "Air Max",
                "brand": "Nike",
                "metadata": {"input_analysis": {}}
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = NewScanResult {
            scan_id: "scan-9".to_string(),
            authenticity_status: "analyzed".to_string(),
            confidence_score: 92,
            product_name: "Air Max".to_string(),
            brand: "Nike".to_string(),
            metadata: json!({"input_analysis": {}}),
        };
        client(&mock_server).save_scan_result(&result).await.unwrap();
    }

    #[tokio::test]
    async fn test_history_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/scans"))
            .and(query_param("select", NESTED_SCAN_SELECT))
            .and(query_param("user_id", "eq.user-1"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "10"))
            .and(query_param("offset", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "s2", "intent": "price", "price_results": [{"price": 8}]},
                {"id": "s1", "intent": "verify", "scan_results": [{"authenticity_status": "analyzed"}]}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let records = client(&mock_server).history("user-1", Page::nth(1, 10)).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "s2");
        assert_eq!(records[0].price_results[0].amount(), Some(8.0));
    }

    #[tokio::test]
    async fn test_get_scan_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/scans"))
            .and(query_param("id", "eq.missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&mock_server)
            .await;

        assert!(client(&mock_server).get_scan("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upload_image_returns_public_url() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path_regex(r"^/storage/v1/object/scans/\d+-\d{6}\.png$"))
            .and(header("Content-Type", "image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "scans/x.png"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        write!(file, "PNGDATA").unwrap();

        let url = client(&mock_server).upload_image("scans", file.path()).await.unwrap();
        assert!(url.starts_with(&format!("{}/storage/v1/object/public/scans/", mock_server.uri())));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/support_tickets"))
            .respond_with(ResponseTemplate::new(401).set_body_string("JWT expired"))
            .mount(&mock_server)
            .await;

        let ticket = NewSupportTicket {
            user_id: "user-1".to_string(),
            subject: "Help".to_string(),
            message: "Scan stuck".to_string(),
        };
        let err = client(&mock_server).create_support_ticket(&ticket).await.unwrap_err();
        assert!(err.to_string().contains("JWT expired"));
    }

    #[tokio::test]
    async fn test_export_user_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/profiles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "user-1"}])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/user_settings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/scans"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "s1"}])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/support_tickets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&mock_server)
            .await;

        let export = client(&mock_server).export_user_data("user-1").await.unwrap();
        assert_eq!(export.profile, Some(json!({"id": "user-1"})));
        assert!(export.settings.is_none());
        assert_eq!(export.scans.len(), 1);
        assert!(export.exported_at.contains('T'));
    }

    #[test]
    fn test_object_name_format() {
        let name = object_name(Path::new("/tmp/photo.JPEG"));
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<u128>().is_ok());
        assert!(rest.ends_with(".jpeg"));
        assert_eq!(rest.len(), "000000.jpeg".len());

        assert!(object_name(Path::new("noext")).ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_public_url() {
        let client = BaasClient::with_base_url("https://proj.example.co/", "k").unwrap();
        assert_eq!(
            client.public_url("scans", "1-000001.jpg"),
            "https://proj.example.co/storage/v1/object/public/scans/1-000001.jpg"
        );
    }
}
