//! Hosted backend client - REST tables, RPC and password auth.
//!
//! Implements `TableGateway`, `RpcClient` and `AuthGateway` over HTTP.
//!
//! # Endpoints
//!
//! - tables: `{base}/rest/v1/{table}` with `Accept-Profile`/`Content-Profile`
//!   headers for schema-qualified tables
//! - RPC: `POST {base}/rest/v1/rpc/{function}`
//! - auth: `POST {base}/auth/v1/token?grant_type=password`
//!
//! Requests carry the anon key as `apikey` and the session token (or the
//! anon key when signed out) as bearer token. Nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::business::{Query, Row, TableRef};
use crate::domain::foundation::Timestamp;
use crate::ports::{AuthGateway, AuthSession, GatewayError, RpcClient, TableGateway};

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    pub base_url: String,
    anon_key: Secret<String>,
    /// Timeout of every HTTP request.
    pub timeout: Duration,
    /// Upper bound for a whole sign-in exchange.
    pub auth_timeout: Duration,
}

impl PostgrestConfig {
    pub fn new(base_url: impl Into<String>, anon_key: Secret<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            timeout: Duration::from_secs(30),
            auth_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_timeout(mut self, auth_timeout: Duration) -> Self {
        self.auth_timeout = auth_timeout;
        self
    }

    fn anon_key(&self) -> &str {
        self.anon_key.expose_secret()
    }
}

pub struct PostgrestClient {
    config: PostgrestConfig,
    client: Client,
    session: RwLock<Option<AuthSession>>,
}

impl PostgrestClient {
    pub fn new(config: PostgrestConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            session: RwLock::new(None),
        })
    }

    fn table_url(&self, table: &TableRef) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table.name)
    }

    async fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = match self.session.read().await.as_ref() {
            Some(session) if !session.is_expired(&Timestamp::now()) => {
                session.access_token.expose_secret().clone()
            }
            _ => self.config.anon_key().to_string(),
        };

        self.client
            .request(method, url)
            .header("apikey", self.config.anon_key())
            .header("Authorization", format!("Bearer {}", bearer))
    }

    /// Request against a table, with the schema profile header for `method`.
    async fn table_request(
        &self,
        method: Method,
        table: &TableRef,
        query: &Query,
    ) -> RequestBuilder {
        let profile_header = if method == Method::GET {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };
        let mut builder = self
            .request(method, self.table_url(table))
            .await
            .query(&query.to_params());
        if let Some(schema) = &table.schema {
            builder = builder.header(profile_header, schema);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, GatewayError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayError::Timeout(self.config.timeout)
            } else {
                GatewayError::Network(e.to_string())
            }
        })?;
        check_status(response).await
    }

    async fn rows(&self, builder: RequestBuilder) -> Result<Vec<Row>, GatewayError> {
        let response = self.send(builder).await?;
        response
            .json::<Vec<Row>>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }

    async fn password_grant(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthSession, GatewayError> {
        let url = format!("{}/auth/v1/token", self.config.base_url);
        let builder = self
            .client
            .post(url)
            .query(&[("grant_type", "password")])
            .header("apikey", self.config.anon_key())
            .json(&serde_json::json!({
                "email": email,
                "password": password.expose_secret(),
            }));

        let response = self.send(builder).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(AuthSession {
            user_id: token.user.id,
            email: token.user.email,
            access_token: Secret::new(token.access_token),
            expires_at: Timestamp::now().plus_secs(token.expires_in),
        })
    }
}

/// Maps non-success statuses to gateway errors.
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error_description"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);

    match status.as_u16() {
        401 | 403 => Err(GatewayError::Unauthorized(message)),
        code => Err(GatewayError::Backend {
            status: code,
            message,
        }),
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl TableGateway for PostgrestClient {
    async fn select(&self, table: &TableRef, query: &Query) -> Result<Vec<Row>, GatewayError> {
        let builder = self
            .table_request(Method::GET, table, query)
            .await
            .query(&[("select", "*")]);
        self.rows(builder).await
    }

    async fn insert(&self, table: &TableRef, row: Row) -> Result<Row, GatewayError> {
        let builder = self
            .table_request(Method::POST, table, &Query::new())
            .await
            .header("Prefer", "return=representation")
            .json(&row);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("insert returned no row".to_string()))
    }

    async fn update(
        &self,
        table: &TableRef,
        query: &Query,
        patch: Row,
    ) -> Result<Vec<Row>, GatewayError> {
        let builder = self
            .table_request(Method::PATCH, table, query)
            .await
            .header("Prefer", "return=representation")
            .json(&patch);
        self.rows(builder).await
    }

    async fn delete(&self, table: &TableRef, query: &Query) -> Result<usize, GatewayError> {
        let builder = self
            .table_request(Method::DELETE, table, query)
            .await
            .header("Prefer", "return=representation");
        Ok(self.rows(builder).await?.len())
    }
}

#[async_trait]
impl RpcClient for PostgrestClient {
    async fn call(&self, function: &str, args: Value) -> Result<Value, GatewayError> {
        let target = TableRef::parse(function);
        let url = format!("{}/rest/v1/rpc/{}", self.config.base_url, target.name);

        let mut builder = self.request(Method::POST, url).await.json(&args);
        if let Some(schema) = &target.schema {
            builder = builder.header("Content-Profile", schema);
        }

        let response = self.send(builder).await?;
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl AuthGateway for PostgrestClient {
    async fn sign_in(
        &self,
        email: &str,
        password: &Secret<String>,
    ) -> Result<AuthSession, GatewayError> {
        let limit = self.config.auth_timeout;
        let session = tokio::time::timeout(limit, self.password_grant(email, password))
            .await
            .map_err(|_| GatewayError::Timeout(limit))??;

        tracing::info!(user_id = %session.user_id, "Signed in to backend");
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    async fn session(&self) -> Option<AuthSession> {
        self.session
            .read()
            .await
            .as_ref()
            .filter(|s| !s.is_expired(&Timestamp::now()))
            .cloned()
    }

    async fn sign_out(&self) {
        self.session.write().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, RawQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::net::SocketAddr;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr) -> PostgrestClient {
        let config = PostgrestConfig::new(
            format!("http://{}/", addr),
            Secret::new("anon-key".to_string()),
        )
        .with_timeout(Duration::from_secs(5))
        .with_auth_timeout(Duration::from_millis(200));
        PostgrestClient::new(config).unwrap()
    }

    /// Echoes the request line details back as a single row.
    async fn echo(
        Path(table): Path<String>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> Json<Value> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!([{
            "table": table,
            "query": query,
            "accept_profile": header("accept-profile"),
            "apikey": header("apikey"),
            "authorization": header("authorization"),
        }]))
    }

    #[tokio::test]
    async fn select_sends_profile_filters_and_keys() {
        let addr = serve(Router::new().route("/rest/v1/:table", get(echo))).await;
        let client = client(addr);

        let rows = client
            .select(
                &TableRef::parse("inventory.products"),
                &Query::new().filter_eq("sku", "A1"),
            )
            .await
            .unwrap();

        let row = &rows[0];
        assert_eq!(row["table"], "products");
        assert_eq!(row["accept_profile"], "inventory");
        assert_eq!(row["apikey"], "anon-key");
        assert_eq!(row["authorization"], "Bearer anon-key");
        let query = row["query"].as_str().unwrap();
        assert!(query.contains("sku=eq.A1"), "{}", query);
        assert!(query.contains("select=*"), "{}", query);
    }

    #[tokio::test]
    async fn rpc_posts_args_with_content_profile() {
        let app = Router::new().route(
            "/rest/v1/rpc/:function",
            post(
                |Path(function): Path<String>, headers: HeaderMap, Json(args): Json<Value>| async move {
                    let profile = headers
                        .get("content-profile")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    Json(json!({"function": function, "profile": profile, "args": args}))
                },
            ),
        );
        let client = client(serve(app).await);

        let result = client
            .call("agent.predict_sales", json!({"days": 30}))
            .await
            .unwrap();

        assert_eq!(result["function"], "predict_sales");
        assert_eq!(result["profile"], "agent");
        assert_eq!(result["args"]["days"], 30);
    }

    #[tokio::test]
    async fn error_status_carries_backend_message() {
        let app = Router::new().route(
            "/rest/v1/:table",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "column people.nope does not exist"})),
                )
            }),
        );
        let client = client(serve(app).await);

        let err = client
            .select(&TableRef::parse("people"), &Query::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            GatewayError::Backend {
                status: 400,
                message: "column people.nope does not exist".to_string()
            }
        );
    }

    #[tokio::test]
    async fn unauthorized_status_maps_to_unauthorized() {
        let app = Router::new().route(
            "/rest/v1/:table",
            get(|| async { (StatusCode::UNAUTHORIZED, "JWT expired") }),
        );
        let client = client(serve(app).await);

        let err = client
            .select(&TableRef::parse("people"), &Query::new())
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Unauthorized("JWT expired".to_string()));
    }

    #[tokio::test]
    async fn sign_in_stores_session_and_uses_token() {
        let app = Router::new()
            .route(
                "/auth/v1/token",
                post(|| async {
                    Json(json!({
                        "access_token": "user-token",
                        "expires_in": 3600,
                        "user": {"id": "u1", "email": "ana@example.com"}
                    }))
                }),
            )
            .route("/rest/v1/:table", get(echo));
        let client = client(serve(app).await);

        let session = client
            .sign_in("ana@example.com", &Secret::new("pw".to_string()))
            .await
            .unwrap();
        assert_eq!(session.user_id, "u1");
        assert!(client.session().await.is_some());

        let rows = client
            .select(&TableRef::parse("people"), &Query::new())
            .await
            .unwrap();
        assert_eq!(rows[0]["authorization"], "Bearer user-token");

        client.sign_out().await;
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    async fn slow_sign_in_times_out() {
        let app = Router::new().route(
            "/auth/v1/token",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({}))
            }),
        );
        let client = client(serve(app).await);

        let err = client
            .sign_in("ana@example.com", &Secret::new("pw".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::Timeout(Duration::from_millis(200)));
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(addr)
            .select(&TableRef::parse("people"), &Query::new())
            .await
            .unwrap_err();
        assert!(err.is_network(), "{:?}", err);
    }
}
