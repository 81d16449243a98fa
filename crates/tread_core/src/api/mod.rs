//! REST client for the Tread backend.
//!
//! Thin repository layer: bearer-token authenticated request/response
//! calls with every failure converted to [`ApiError`] at this boundary.
//! Business logic (scheduling, VIN decoding, auth) lives server-side.

mod error;
pub mod models;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ConfigError, CoreError, Result};
use crate::session::SessionStore;

pub use error::ApiError;
pub use models::*;

/// Result type at the repository boundary.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Client for the Tread REST backend.
///
/// The access token is read from the session store per request, so a token
/// replaced by a re-login is picked up without rebuilding the client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    /// Build a client from config. The base URL is normalized to end with
    /// a slash so endpoint paths join predictably.
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self> {
        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base_url = Url::parse(&base).map_err(|e| CoreError::Configuration {
            config_path: "(api)".to_string(),
            field: "base_url".to_string(),
            cause: ConfigError::InvalidValue {
                field: "base_url".to_string(),
                reason: e.to_string(),
            },
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CoreError::Api(ApiError::Transport(e)))?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::Decode(format!("invalid endpoint path '{}': {}", path, e)))
    }

    /// Attach the bearer token, failing fast if none is stored.
    fn authed(&self, request: RequestBuilder) -> ApiResult<RequestBuilder> {
        let token = self.session.token_now().ok_or(ApiError::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Map a non-success response to `ApiError::Status`, extracting the
    /// backend's error message when the body carries one.
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.text().await {
            Ok(body) => match serde_json::from_str::<models::ErrorBody>(&body) {
                Ok(parsed) => parsed.message,
                Err(_) if !body.is_empty() => body,
                Err(_) => default_status_message(status),
            },
            Err(_) => default_status_message(status),
        };

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        Ok(response.json::<T>().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.authed(self.http.get(self.endpoint(path)?))?;
        let response = Self::check(request.send().await?).await?;
        Self::decode(response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.authed(self.http.post(self.endpoint(path)?))?;
        let response = Self::check(request.json(body).send().await?).await?;
        Self::decode(response).await
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.authed(self.http.delete(self.endpoint(path)?))?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    // === Authentication ===

    /// Exchange credentials for a token. Unauthenticated; the caller
    /// decides whether to persist the token in the session store.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint("api/auth/login")?)
            .json(&body)
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<UserProfile> {
        let response = self
            .http
            .post(self.endpoint("api/auth/register")?)
            .json(request)
            .send()
            .await?;
        Self::decode(Self::check(response).await?).await
    }

    // === Vehicles ===

    pub async fn vehicles(&self) -> ApiResult<Vec<Vehicle>> {
        self.get_json("api/vehicles").await
    }

    pub async fn vehicle(&self, id: i64) -> ApiResult<Vehicle> {
        self.get_json(&format!("api/vehicles/{}", id)).await
    }

    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> ApiResult<Vehicle> {
        self.post_json("api/vehicles", vehicle).await
    }

    pub async fn delete_vehicle(&self, id: i64) -> ApiResult<()> {
        self.delete(&format!("api/vehicles/{}", id)).await
    }

    // === Reminders ===

    pub async fn reminders(&self, vehicle_id: i64) -> ApiResult<Vec<Reminder>> {
        self.get_json(&format!("api/vehicles/{}/reminders", vehicle_id))
            .await
    }

    pub async fn complete_reminder(&self, id: i64) -> ApiResult<Reminder> {
        self.post_json(&format!("api/reminders/{}/complete", id), &())
            .await
    }

    // === Maintenance logs ===

    pub async fn maintenance_logs(&self, vehicle_id: i64) -> ApiResult<Vec<MaintenanceLog>> {
        self.get_json(&format!("api/vehicles/{}/logs", vehicle_id))
            .await
    }

    pub async fn create_log(&self, log: &NewMaintenanceLog) -> ApiResult<MaintenanceLog> {
        self.post_json(&format!("api/vehicles/{}/logs", log.vehicle_id), log)
            .await
    }

    // === Notifications / profile / VIN ===

    pub async fn notifications(&self) -> ApiResult<Vec<NotificationItem>> {
        self.get_json("api/notifications").await
    }

    pub async fn profile(&self) -> ApiResult<UserProfile> {
        self.get_json("api/users/me").await
    }

    pub async fn decode_vin(&self, vin: &str) -> ApiResult<VinDecodeResult> {
        self.get_json(&format!("api/vin/{}", vin)).await
    }
}

fn default_status_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
