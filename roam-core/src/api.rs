use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use roam_shared::models::activity::ActivityLogEntry;
use roam_shared::models::review::Review;
use roam_shared::models::user::User;
use roam_shared::pii::Sensitive;
use roam_shared::{Booking, BookingStatus, TravelPackage};

use crate::payment::{PaymentOrder, PaymentProof};

/// Draft sent once to create a booking and its payment order. Discarded as
/// soon as the backend accepts it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub package_id: String,
    pub travel_date: NaiveDate,
    pub num_travelers: u32,
}

/// Everything the payment step needs, returned by booking creation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutContext {
    pub order: PaymentOrder,
    pub booking: Booking,
    /// Public gateway key the hosted checkout is opened with.
    pub key_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: Sensitive<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: Sensitive<String>,
}

/// Bearer token plus the account it belongs to, as minted by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub package_id: String,
    /// 1 to 5.
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Failures talking to the storefront backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response arrived but did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable text for inline display: the backend's own message
    /// when it sent one, otherwise the caller's fallback.
    pub fn display_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Backend { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_tours(&self) -> Result<Vec<TravelPackage>, ApiError>;
    async fn tour(&self, id: &str) -> Result<TravelPackage, ApiError>;
}

#[async_trait]
pub trait BookingApi: Send + Sync {
    /// Create a pending booking plus its payment order.
    async fn create_booking(&self, draft: &BookingDraft) -> Result<CheckoutContext, ApiError>;

    /// Relay a payment proof for verification. Returns the booking as the
    /// backend now sees it; callers decide what its status means.
    async fn verify_payment(
        &self,
        proof: &PaymentProof,
        booking_id: &str,
    ) -> Result<Booking, ApiError>;

    async fn cancel_booking(&self, booking_id: &str) -> Result<(), ApiError>;
    async fn my_bookings(&self) -> Result<Vec<Booking>, ApiError>;
    async fn booking(&self, id: &str) -> Result<Booking, ApiError>;
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError>;
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;
    async fn current_user(&self) -> Result<User, ApiError>;
}

#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn submit_review(&self, draft: &ReviewDraft) -> Result<Review, ApiError>;
    async fn reviews_for_tour(&self, tour_id: &str) -> Result<Vec<Review>, ApiError>;
    async fn edit_review(&self, review_id: &str, patch: &ReviewPatch) -> Result<Review, ApiError>;
    async fn delete_review(&self, review_id: &str) -> Result<(), ApiError>;
}

/// Back-office surface. The backend enforces the admin role; these are thin
/// pass-throughs.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn all_bookings(&self) -> Result<Vec<Booking>, ApiError>;
    async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> Result<Booking, ApiError>;
    async fn create_tour(&self, tour: &serde_json::Value) -> Result<TravelPackage, ApiError>;
    async fn update_tour(
        &self,
        tour_id: &str,
        tour: &serde_json::Value,
    ) -> Result<TravelPackage, ApiError>;
    async fn delete_tour(&self, tour_id: &str) -> Result<(), ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn update_user(
        &self,
        user_id: &str,
        patch: &serde_json::Value,
    ) -> Result<User, ApiError>;
    async fn delete_user(&self, user_id: &str) -> Result<(), ApiError>;
    async fn recent_booking_activity(&self, limit: u32) -> Result<Vec<ActivityLogEntry>, ApiError>;
}

/// One object implementing the whole consumed surface.
pub trait StorefrontApi: CatalogApi + BookingApi + AuthApi + ReviewApi + AdminApi {}

impl<T: CatalogApi + BookingApi + AuthApi + ReviewApi + AdminApi> StorefrontApi for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_serializes_with_camel_case_keys() {
        let draft = BookingDraft {
            package_id: "665f1a2b3c4d5e6f70818283".into(),
            travel_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            num_travelers: 2,
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["packageId"], "665f1a2b3c4d5e6f70818283");
        assert_eq!(json["travelDate"], "2024-06-10");
        assert_eq!(json["numTravelers"], 2);
    }

    #[test]
    fn display_message_prefers_backend_text() {
        let err = ApiError::Backend {
            status: 400,
            message: "Package is sold out for that date".into(),
        };
        assert_eq!(
            err.display_message("Booking failed. Please try again."),
            "Package is sold out for that date"
        );

        let err = ApiError::Transport("connection reset".into());
        assert_eq!(
            err.display_message("Booking failed. Please try again."),
            "Booking failed. Please try again."
        );
    }
}
