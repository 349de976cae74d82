use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use roam_shared::pii::Sensitive;

/// A gateway order that must be collected before the booking can confirm.
/// Issued by the backend alongside the pending booking; consumed exactly
/// once by the checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentOrder {
    pub id: String,
    /// Amount in currency subunits (paise for INR), as the gateway expects.
    pub amount: i64,
    pub currency: String,
}

/// Signed result the gateway hands back on a completed payment. Relayed
/// verbatim for server-side verification, never interpreted here: no
/// cryptographic check happens in this tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutPrefill {
    pub name: String,
    pub email: Sensitive<String>,
}

/// Everything the hosted checkout is opened with.
#[derive(Debug, Clone)]
pub struct CheckoutOptions {
    /// Public gateway key.
    pub key: String,
    pub amount: i64,
    pub currency: String,
    /// Merchant display name.
    pub name: String,
    pub description: String,
    pub order_id: String,
    pub prefill: CheckoutPrefill,
    pub theme_color: String,
}

/// What the shopper did with the hosted checkout.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Payment went through on the gateway side; the proof still has to be
    /// verified by the backend.
    Completed(PaymentProof),
    /// Closed without paying. The order is untouched and can be retried.
    Dismissed,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("checkout asset failed to load: {0}")]
    AssetLoad(String),
    #[error("checkout could not be opened: {0}")]
    Open(String),
}

/// A host-controlled checkout provider. The widget runs out of process;
/// this trait covers only what the storefront can observe of it.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Load the provider's checkout asset. Called once per mounted bridge.
    async fn attach(&self) -> Result<(), GatewayError>;

    /// Tear the asset down. Must be safe to call at any point after
    /// `attach`, including when no checkout was ever opened.
    fn detach(&self);

    /// Open the hosted checkout for one order. At most one session is live
    /// at a time; the caller owns the returned handle.
    async fn open(
        &self,
        options: CheckoutOptions,
    ) -> Result<Box<dyn CheckoutSession>, GatewayError>;
}

/// A single live checkout. The holder that opened it is the only one who
/// may close it; the handle is spent either way.
#[async_trait]
pub trait CheckoutSession: Send {
    /// Wait until the shopper completes or dismisses the checkout. The
    /// gateway delivers at most one completion per session.
    async fn outcome(&mut self) -> CheckoutOutcome;

    /// Discard the widget handle so a later open cannot reuse stale state.
    fn close(self: Box<Self>);
}
