use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use roam_core::api::{BookingApi, CheckoutContext};
use roam_core::payment::{
    CheckoutGateway, CheckoutOptions, CheckoutOutcome, CheckoutPrefill, CheckoutSession,
    GatewayError,
};
use roam_shared::BookingStatus;

use crate::flow::CustomerProfile;

const VERIFICATION_FAILED: &str = "Payment verification failed";

/// Result of one payment attempt, as the flow should react to it.
#[derive(Debug)]
pub enum PaymentOutcome {
    /// Backend verified the proof; the booking is confirmed.
    Confirmed(roam_shared::Booking),
    /// Verification was rejected or unreachable. The order stays valid for
    /// another attempt.
    Failed(String),
    /// The shopper dismissed the checkout, or a duplicate completion was
    /// ignored. No state change.
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Merchant name shown in the hosted checkout.
    pub storefront_name: String,
    pub theme_color: String,
}

/// Bridges the flow to the out-of-process checkout widget and relays its
/// result to the backend verification endpoint.
///
/// The gateway asset is acquired on `mount` and released when the bridge is
/// dropped, whatever exit path is taken. Each `collect` owns its session
/// handle and spends it before returning, so a retry can never reuse a
/// stale widget.
pub struct PaymentBridge {
    api: Arc<dyn BookingApi>,
    gateway: Arc<dyn CheckoutGateway>,
    config: BridgeConfig,
    settled: bool,
}

impl PaymentBridge {
    /// Load the gateway's checkout asset and hand back the mounted bridge.
    pub async fn mount(
        api: Arc<dyn BookingApi>,
        gateway: Arc<dyn CheckoutGateway>,
        config: BridgeConfig,
    ) -> Result<Self, GatewayError> {
        gateway.attach().await?;
        tracing::debug!("checkout asset attached");
        Ok(Self {
            api,
            gateway,
            config,
            settled: false,
        })
    }

    /// Run one payment attempt: open the hosted checkout, wait for the
    /// shopper, and verify a completion with the backend.
    ///
    /// The gateway guarantees at most one completion per session; a
    /// completion arriving after a settlement is ignored.
    pub async fn collect(
        &mut self,
        ctx: &CheckoutContext,
        customer: &CustomerProfile,
    ) -> Result<PaymentOutcome, GatewayError> {
        if self.settled {
            tracing::warn!(
                order_id = %ctx.order.id,
                "payment already settled, ignoring further attempts"
            );
            return Ok(PaymentOutcome::Abandoned);
        }

        let mut session = self
            .gateway
            .open(self.checkout_options(ctx, customer))
            .await?;
        let outcome = session.outcome().await;
        // The handle is spent either way; a retry opens a fresh one.
        session.close();

        match outcome {
            CheckoutOutcome::Dismissed => {
                tracing::debug!(order_id = %ctx.order.id, "checkout dismissed by shopper");
                Ok(PaymentOutcome::Abandoned)
            }
            CheckoutOutcome::Completed(proof) => {
                match self.api.verify_payment(&proof, &ctx.booking.id).await {
                    Ok(booking) if booking.status == BookingStatus::Confirmed => {
                        self.settled = true;
                        tracing::info!(
                            booking_id = %booking.id,
                            order_id = %proof.order_id,
                            "payment verified, booking confirmed"
                        );
                        Ok(PaymentOutcome::Confirmed(booking))
                    }
                    Ok(booking) => {
                        tracing::warn!(
                            booking_id = %booking.id,
                            status = %booking.status,
                            "verification left booking unconfirmed"
                        );
                        Ok(PaymentOutcome::Failed(VERIFICATION_FAILED.to_string()))
                    }
                    Err(err) => {
                        tracing::warn!("payment verification call failed: {err}");
                        Ok(PaymentOutcome::Failed(
                            err.display_message(VERIFICATION_FAILED),
                        ))
                    }
                }
            }
        }
    }

    fn checkout_options(
        &self,
        ctx: &CheckoutContext,
        customer: &CustomerProfile,
    ) -> CheckoutOptions {
        CheckoutOptions {
            key: ctx.key_id.clone(),
            amount: ctx.order.amount,
            currency: ctx.order.currency.clone(),
            name: self.config.storefront_name.clone(),
            description: format!("Booking for {}", ctx.booking.package_name),
            order_id: ctx.order.id.clone(),
            prefill: CheckoutPrefill {
                name: customer.name.clone(),
                email: customer.email.clone(),
            },
            theme_color: self.config.theme_color.clone(),
        }
    }
}

impl Drop for PaymentBridge {
    fn drop(&mut self) {
        self.gateway.detach();
        tracing::debug!("checkout asset detached");
    }
}

/// Scripted gateway for tests and offline rehearsal. Outcomes are served in
/// order; an unscripted open behaves as a dismissal.
#[derive(Default)]
pub struct MockGateway {
    script: Mutex<VecDeque<CheckoutOutcome>>,
    opened: Mutex<Vec<CheckoutOptions>>,
    attached: AtomicBool,
}

impl MockGateway {
    pub fn scripted(outcomes: Vec<CheckoutOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            ..Default::default()
        }
    }

    pub fn push_outcome(&self, outcome: CheckoutOutcome) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    /// Options of every checkout opened so far, oldest first.
    pub fn opened_options(&self) -> Vec<CheckoutOptions> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CheckoutGateway for MockGateway {
    async fn attach(&self) -> Result<(), GatewayError> {
        self.attached.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    async fn open(
        &self,
        options: CheckoutOptions,
    ) -> Result<Box<dyn CheckoutSession>, GatewayError> {
        self.opened.lock().unwrap().push(options);
        let outcome = self.script.lock().unwrap().pop_front();
        Ok(Box::new(MockSession { outcome }))
    }
}

struct MockSession {
    outcome: Option<CheckoutOutcome>,
}

#[async_trait::async_trait]
impl CheckoutSession for MockSession {
    async fn outcome(&mut self) -> CheckoutOutcome {
        self.outcome.take().unwrap_or(CheckoutOutcome::Dismissed)
    }

    fn close(self: Box<Self>) {}
}
