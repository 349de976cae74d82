use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use roam_core::api::{BookingApi, BookingDraft, CheckoutContext};
use roam_shared::pii::Sensitive;
use roam_shared::{Booking, TravelPackage};

use crate::bridge::{PaymentBridge, PaymentOutcome};
use crate::validation::{min_travel_date, quote, validate_travel_date};

/// Where the shopper currently is in the flow.
///
/// `Form → AwaitingPayment → Confirmed`, strictly forward. Errors never
/// transition: a failed submit leaves the form, a failed verification
/// leaves the payment screen with its order intact. `Confirmed` is
/// terminal.
#[derive(Debug)]
pub enum FlowStage {
    /// Gathering traveler count and travel date.
    Form,
    /// Booking and payment order exist; waiting on the hosted checkout.
    AwaitingPayment(CheckoutContext),
    /// Payment verified.
    Confirmed(Booking),
}

/// Shopper identity snapshotted into the checkout prefill.
#[derive(Debug, Clone)]
pub struct CustomerProfile {
    pub name: String,
    pub email: Sensitive<String>,
}

/// Programmer errors: an operation was driven in a stage it does not
/// belong to. Everything the shopper can cause lands in `error()` instead.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("operation not valid in the current flow stage")]
    InvalidStage,
}

/// The booking form and its onward flow for one package and one shopper.
pub struct BookingFlow {
    api: Arc<dyn BookingApi>,
    package: TravelPackage,
    customer: CustomerProfile,
    today: NaiveDate,
    lead_days: u32,
    num_travelers: u32,
    travel_date: Option<NaiveDate>,
    stage: FlowStage,
    error: Option<String>,
}

impl BookingFlow {
    pub fn new(
        api: Arc<dyn BookingApi>,
        package: TravelPackage,
        customer: CustomerProfile,
        lead_days: u32,
    ) -> Self {
        Self::starting_on(api, package, customer, lead_days, Utc::now().date_naive())
    }

    /// Like `new` with an explicit "today", so date rules are checkable
    /// against fixed calendars.
    pub fn starting_on(
        api: Arc<dyn BookingApi>,
        package: TravelPackage,
        customer: CustomerProfile,
        lead_days: u32,
        today: NaiveDate,
    ) -> Self {
        Self {
            api,
            package,
            customer,
            today,
            lead_days,
            num_travelers: 1,
            travel_date: None,
            stage: FlowStage::Form,
            error: None,
        }
    }

    pub fn stage(&self) -> &FlowStage {
        &self.stage
    }

    /// Inline message for the current stage, if the last action failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn package(&self) -> &TravelPackage {
        &self.package
    }

    pub fn customer(&self) -> &CustomerProfile {
        &self.customer
    }

    pub fn num_travelers(&self) -> u32 {
        self.num_travelers
    }

    pub fn travel_date(&self) -> Option<NaiveDate> {
        self.travel_date
    }

    /// Earliest date the form will accept.
    pub fn min_travel_date(&self) -> NaiveDate {
        min_travel_date(self.today, self.lead_days)
    }

    /// The form never drops below one traveler; zero is ignored.
    pub fn set_num_travelers(&mut self, n: u32) {
        if n >= 1 {
            self.num_travelers = n;
        }
    }

    pub fn set_travel_date(&mut self, date: NaiveDate) {
        self.travel_date = Some(date);
    }

    /// Party total, recomputed synchronously on every change. Display-only;
    /// the authoritative total is snapshotted by the backend at creation.
    pub fn total_price(&self) -> i64 {
        quote(self.package.price, self.num_travelers)
    }

    /// Validate locally, then ask the backend for a booking and its payment
    /// order. No network call is made if validation fails.
    ///
    /// On success the flow moves to `AwaitingPayment`; on failure it stays
    /// on the form with an inline error and can be resubmitted.
    pub async fn submit(&mut self) -> Result<(), FlowError> {
        if !matches!(self.stage, FlowStage::Form) {
            return Err(FlowError::InvalidStage);
        }

        let travel_date =
            match validate_travel_date(self.travel_date, self.today, self.lead_days) {
                Ok(date) => date,
                Err(err) => {
                    self.error = Some(err.to_string());
                    return Ok(());
                }
            };
        self.error = None;

        let draft = BookingDraft {
            package_id: self.package.id.clone(),
            travel_date,
            num_travelers: self.num_travelers,
        };

        match self.api.create_booking(&draft).await {
            Ok(ctx) => {
                tracing::info!(
                    booking_id = %ctx.booking.id,
                    order_id = %ctx.order.id,
                    "booking created, awaiting payment"
                );
                self.stage = FlowStage::AwaitingPayment(ctx);
            }
            Err(err) => {
                tracing::warn!("booking creation failed: {err}");
                self.error = Some(err.display_message("Booking failed. Please try again."));
            }
        }
        Ok(())
    }

    /// Drive one payment attempt through the bridge and fold its outcome
    /// back into the flow.
    pub async fn take_payment(&mut self, bridge: &mut PaymentBridge) -> Result<(), FlowError> {
        let ctx = match &self.stage {
            FlowStage::AwaitingPayment(ctx) => ctx.clone(),
            _ => return Err(FlowError::InvalidStage),
        };

        match bridge.collect(&ctx, &self.customer).await {
            Ok(PaymentOutcome::Confirmed(booking)) => {
                self.error = None;
                self.stage = FlowStage::Confirmed(booking);
            }
            Ok(PaymentOutcome::Failed(message)) => {
                self.error = Some(message);
            }
            Ok(PaymentOutcome::Abandoned) => {
                // Dismissal is not an error; the order stays collectable.
            }
            Err(err) => {
                tracing::warn!("checkout could not be opened: {err}");
                self.error = Some(err.to_string());
            }
        }
        Ok(())
    }
}
