pub mod api;
pub mod payment;

pub use api::{
    AdminApi, ApiError, AuthApi, AuthSession, BookingApi, BookingDraft, CatalogApi,
    CheckoutContext, Credentials, Registration, ReviewApi, ReviewDraft, ReviewPatch,
};
pub use payment::{
    CheckoutGateway, CheckoutOptions, CheckoutOutcome, CheckoutPrefill, CheckoutSession,
    GatewayError, PaymentOrder, PaymentProof,
};
