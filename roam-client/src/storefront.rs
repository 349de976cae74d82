use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use roam_core::api::{
    AdminApi, ApiError, AuthApi, AuthSession, BookingApi, BookingDraft, CatalogApi,
    CheckoutContext, Credentials, Registration, ReviewApi, ReviewDraft, ReviewPatch,
};
use roam_core::payment::PaymentProof;
use roam_shared::models::activity::ActivityLogEntry;
use roam_shared::models::review::Review;
use roam_shared::models::user::User;
use roam_shared::{Booking, BookingStatus, TravelPackage};

use crate::app_config::Config;

/// HTTP client for the storefront REST backend. One instance per process;
/// cheap to share behind an `Arc`.
pub struct StorefrontClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl StorefrontClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_seconds))
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    /// Attach (or clear) the bearer token sent with every request.
    pub fn set_session_token(&self, token: Option<String>) {
        *self.token.write().unwrap() = token;
    }

    pub fn has_session(&self) -> bool {
        self.token.read().unwrap().is_some()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("x-request-id", Uuid::new_v4().to_string());
        if let Some(token) = self.token.read().unwrap().as_deref() {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(req).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// For endpoints whose body we do not consume.
    async fn send_unit(&self, req: RequestBuilder) -> Result<(), ApiError> {
        self.execute(req).await.map(|_| ())
    }

    async fn execute(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = req
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
        tracing::error!(status = status.as_u16(), %message, "backend request failed");
        Err(ApiError::Backend {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull a human-readable message out of a backend error body. The backend
/// answers either `{"message": "..."}` or express-validator style
/// `{"errors": [{"msg": "..."}]}`.
fn extract_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct FieldError {
        msg: Option<String>,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        errors: Option<Vec<FieldError>>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    if let Some(message) = parsed.message.filter(|m| !m.is_empty()) {
        return Some(message);
    }
    parsed
        .errors?
        .into_iter()
        .find_map(|e| e.msg.filter(|m| !m.is_empty()))
}

#[derive(Serialize)]
struct VerifyPaymentRequest<'a> {
    razorpay_order_id: &'a str,
    razorpay_payment_id: &'a str,
    razorpay_signature: &'a str,
    #[serde(rename = "bookingId")]
    booking_id: &'a str,
}

#[derive(Deserialize)]
struct BookingEnvelope {
    booking: Booking,
}

#[derive(Serialize)]
struct StatusBody {
    status: BookingStatus,
}

#[async_trait]
impl CatalogApi for StorefrontClient {
    async fn list_tours(&self) -> Result<Vec<TravelPackage>, ApiError> {
        self.send(self.request(Method::GET, "/tours")).await
    }

    async fn tour(&self, id: &str) -> Result<TravelPackage, ApiError> {
        self.send(self.request(Method::GET, &format!("/tours/{id}")))
            .await
    }
}

#[async_trait]
impl BookingApi for StorefrontClient {
    async fn create_booking(&self, draft: &BookingDraft) -> Result<CheckoutContext, ApiError> {
        tracing::info!(package_id = %draft.package_id, travelers = draft.num_travelers, "creating booking");
        self.send(self.request(Method::POST, "/bookings").json(draft))
            .await
    }

    async fn verify_payment(
        &self,
        proof: &PaymentProof,
        booking_id: &str,
    ) -> Result<Booking, ApiError> {
        let body = VerifyPaymentRequest {
            razorpay_order_id: &proof.order_id,
            razorpay_payment_id: &proof.payment_id,
            razorpay_signature: &proof.signature,
            booking_id,
        };
        let envelope: BookingEnvelope = self
            .send(
                self.request(Method::POST, "/bookings/verify-payment")
                    .json(&body),
            )
            .await?;
        Ok(envelope.booking)
    }

    async fn cancel_booking(&self, booking_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::PATCH, &format!("/bookings/{booking_id}/cancel")))
            .await
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.send(self.request(Method::GET, "/bookings/my-bookings"))
            .await
    }

    async fn booking(&self, id: &str) -> Result<Booking, ApiError> {
        self.send(self.request(Method::GET, &format!("/bookings/{id}")))
            .await
    }
}

#[async_trait]
impl AuthApi for StorefrontClient {
    async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        self.send(self.request(Method::POST, "/auth/register").json(registration))
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.send(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    async fn current_user(&self) -> Result<User, ApiError> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }
}

#[async_trait]
impl ReviewApi for StorefrontClient {
    async fn submit_review(&self, draft: &ReviewDraft) -> Result<Review, ApiError> {
        self.send(self.request(Method::POST, "/reviews").json(draft))
            .await
    }

    async fn reviews_for_tour(&self, tour_id: &str) -> Result<Vec<Review>, ApiError> {
        self.send(self.request(Method::GET, &format!("/reviews/{tour_id}")))
            .await
    }

    async fn edit_review(&self, review_id: &str, patch: &ReviewPatch) -> Result<Review, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/reviews/{review_id}"))
                .json(patch),
        )
        .await
    }

    async fn delete_review(&self, review_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/reviews/{review_id}")))
            .await
    }
}

#[async_trait]
impl AdminApi for StorefrontClient {
    async fn all_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        self.send(self.request(Method::GET, "/bookings")).await
    }

    async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<Booking, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/bookings/{booking_id}/status"))
                .json(&StatusBody { status }),
        )
        .await
    }

    async fn create_tour(&self, tour: &serde_json::Value) -> Result<TravelPackage, ApiError> {
        self.send(self.request(Method::POST, "/tours").json(tour))
            .await
    }

    async fn update_tour(
        &self,
        tour_id: &str,
        tour: &serde_json::Value,
    ) -> Result<TravelPackage, ApiError> {
        self.send(
            self.request(Method::PUT, &format!("/tours/{tour_id}"))
                .json(tour),
        )
        .await
    }

    async fn delete_tour(&self, tour_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/tours/{tour_id}")))
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.send(self.request(Method::GET, "/users")).await
    }

    async fn update_user(
        &self,
        user_id: &str,
        patch: &serde_json::Value,
    ) -> Result<User, ApiError> {
        self.send(
            self.request(Method::PATCH, &format!("/users/{user_id}"))
                .json(patch),
        )
        .await
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError> {
        self.send_unit(self.request(Method::DELETE, &format!("/users/{user_id}")))
            .await
    }

    async fn recent_booking_activity(
        &self,
        limit: u32,
    ) -> Result<Vec<ActivityLogEntry>, ApiError> {
        self.send(self.request(
            Method::GET,
            &format!("/activitylog/recent-bookings?limit={limit}"),
        ))
        .await
    }
}
