//! HTTP client for the control plane

use reqwest::Method;
use serde_json::{json, Value};

use sky_core::{ApiError, Credentials};

use crate::types::App;

/// Default control-plane host
pub const DEFAULT_HOST: &str = "https://api.skylark.cloud";

/// Authenticated client for the control-plane API
#[derive(Debug, Clone)]
pub struct ApiClient {
    host: String,
    auth: Option<(String, String)>,
    http: reqwest::Client,
}

impl ApiClient {
    /// Client authenticated with stored credentials
    pub fn new(host: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            host: host.into(),
            auth: Some((credentials.email.clone(), credentials.api_key.clone())),
            http: reqwest::Client::new(),
        }
    }

    /// Unauthenticated client, used only to obtain an API key at login
    pub fn anonymous(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auth: None,
            http: reqwest::Client::new(),
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.host, path);
        tracing::debug!(%method, %url, "api request");

        let mut request = self
            .http
            .request(method, &url)
            .header("Content-Type", "application/json");

        if let Some((user, secret)) = &self.auth {
            request = request.basic_auth(user, Some(secret));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status { status, body: text });
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Malformed(format!("invalid JSON: {}", e)))?;
        Ok(unwrap_data(value))
    }

    /// Exchange email and password for a long-lived API key
    pub async fn obtain_api_key(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/api_keys", self.host);
        let response = self
            .http
            .get(&url)
            .basic_auth(email, Some(password))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body: text });
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Malformed(format!("invalid JSON: {}", e)))?;
        unwrap_data(value)
            .get("key")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Malformed("no api key in response".to_string()))
    }

    // --- apps ---

    pub async fn apps(&self) -> Result<Vec<App>, ApiError> {
        let data = self.request(Method::GET, "/api/apps", None).await?;
        serde_json::from_value(data).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    pub async fn create_app(&self, name: Option<&str>) -> Result<Value, ApiError> {
        let body = match name {
            Some(name) => json!({ "unique_name": name }),
            None => json!({}),
        };
        self.request(Method::POST, "/api/apps", Some(body)).await
    }

    pub async fn destroy_app(&self, app: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &format!("/api/apps/{}", app), None)
            .await
    }

    pub async fn scale(
        &self,
        app: &str,
        replicas: Option<u32>,
        size: Option<f64>,
    ) -> Result<Value, ApiError> {
        let mut body = serde_json::Map::new();
        if let Some(replicas) = replicas {
            body.insert("replicas".to_string(), json!(replicas));
        }
        if let Some(size) = size {
            body.insert("size".to_string(), json!(size));
        }
        self.request(
            Method::PUT,
            &format!("/api/apps/{}/scale", app),
            Some(Value::Object(body)),
        )
        .await
    }

    // --- config vars ---

    pub async fn configs(&self, app: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("/api/apps/{}/configs", app), None)
            .await
    }

    pub async fn set_config(&self, app: &str, key: &str, value: &str) -> Result<Value, ApiError> {
        self.request(
            Method::POST,
            &format!("/api/apps/{}/configs", app),
            Some(json!({ "key": key, "value": value })),
        )
        .await
    }

    pub async fn unset_config(&self, app: &str, key: &str) -> Result<Value, ApiError> {
        self.request(
            Method::DELETE,
            &format!("/api/apps/{}/configs", app),
            Some(json!({ "key": key })),
        )
        .await
    }

    // --- domains ---

    pub async fn domains(&self, app: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("/api/apps/{}/domains", app), None)
            .await
    }

    pub async fn add_domain(&self, app: &str, fqdn: &str) -> Result<Value, ApiError> {
        self.request(
            Method::POST,
            &format!("/api/apps/{}/domains", app),
            Some(json!({ "fqdn": fqdn })),
        )
        .await
    }

    pub async fn remove_domain(&self, app: &str, fqdn: &str) -> Result<Value, ApiError> {
        self.request(
            Method::DELETE,
            &format!("/api/apps/{}/domains/{}", app, fqdn),
            None,
        )
        .await
    }

    // --- releases ---

    pub async fn releases(&self, app: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &format!("/api/apps/{}/releases", app), None)
            .await
    }

    pub async fn rollback(&self, app: &str, version: Option<&str>) -> Result<Value, ApiError> {
        let body = match version {
            Some(version) => json!({ "version": version }),
            None => json!({}),
        };
        self.request(
            Method::POST,
            &format!("/api/apps/{}/releases/rollback", app),
            Some(body),
        )
        .await
    }

    // --- ssh keys ---

    pub async fn ssh_keys(&self) -> Result<Value, ApiError> {
        self.request(Method::GET, "/api/ssh_keys", None).await
    }

    pub async fn add_ssh_key(&self, key: &str) -> Result<Value, ApiError> {
        self.request(
            Method::POST,
            "/api/ssh_keys",
            Some(json!({ "ssh_key": key })),
        )
        .await
    }

    pub async fn remove_ssh_key(&self, id: u64) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &format!("/api/ssh_keys/{}", id), None)
            .await
    }

    // --- billing ---

    pub async fn payment_method(&self) -> Result<Value, ApiError> {
        self.request(Method::GET, "/api/payment_methods", None).await
    }

    pub async fn set_payment_method(&self, token: &str) -> Result<Value, ApiError> {
        self.request(
            Method::PUT,
            "/api/payment_methods",
            Some(json!({ "stripe_token": token })),
        )
        .await
    }
}

/// Peel the `{"data": ...}` envelope; bodies without one pass through as-is
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_data_peels_envelope() {
        let value = json!({ "data": { "unique_name": "myapp" } });
        assert_eq!(unwrap_data(value), json!({ "unique_name": "myapp" }));
    }

    #[test]
    fn unwrap_data_passes_bare_bodies_through() {
        let value = json!([1, 2, 3]);
        assert_eq!(unwrap_data(value), json!([1, 2, 3]));
    }

    #[test]
    fn anonymous_client_sends_no_auth() {
        let client = ApiClient::anonymous("https://api.example.com");
        assert!(client.auth.is_none());
    }
}
