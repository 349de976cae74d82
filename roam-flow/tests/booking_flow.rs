use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use roam_core::api::{ApiError, BookingApi, BookingDraft, CheckoutContext};
use roam_core::payment::{CheckoutOutcome, PaymentOrder, PaymentProof};
use roam_flow::{
    BookingFlow, BridgeConfig, CustomerProfile, FlowError, FlowStage, MockGateway,
    PaymentBridge, PaymentOutcome,
};
use roam_flow::view::{render, View};
use roam_shared::{Booking, BookingStatus, TravelPackage};

/// Scripted backend. Panics on an unscripted call so tests notice network
/// traffic that should not have happened.
#[derive(Default)]
struct ScriptedApi {
    create_results: Mutex<VecDeque<Result<CheckoutContext, ApiError>>>,
    verify_results: Mutex<VecDeque<Result<Booking, ApiError>>>,
    create_calls: AtomicUsize,
    verify_calls: AtomicUsize,
}

impl ScriptedApi {
    fn on_create(&self, result: Result<CheckoutContext, ApiError>) {
        self.create_results.lock().unwrap().push_back(result);
    }

    fn on_verify(&self, result: Result<Booking, ApiError>) {
        self.verify_results.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl BookingApi for ScriptedApi {
    async fn create_booking(&self, _draft: &BookingDraft) -> Result<CheckoutContext, ApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted create_booking call")
    }

    async fn verify_payment(
        &self,
        _proof: &PaymentProof,
        _booking_id: &str,
    ) -> Result<Booking, ApiError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.verify_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted verify_payment call")
    }

    async fn cancel_booking(&self, _booking_id: &str) -> Result<(), ApiError> {
        panic!("unexpected cancel_booking call")
    }

    async fn my_bookings(&self) -> Result<Vec<Booking>, ApiError> {
        panic!("unexpected my_bookings call")
    }

    async fn booking(&self, _id: &str) -> Result<Booking, ApiError> {
        panic!("unexpected booking call")
    }
}

fn package() -> TravelPackage {
    TravelPackage {
        id: "pkg-roots".into(),
        name: "Living Root Bridges Trek".into(),
        destination: "Meghalaya".into(),
        region: Some("Meghalaya".into()),
        duration: 5,
        price: 19500,
        description: "Five days in the wettest place on earth.".into(),
        image_url: String::new(),
        rating: 4.8,
        activities: vec!["Trekking".into()],
        whats_included: vec!["Guide".into(), "Stay".into()],
        best_time_to_visit: None,
    }
}

fn customer() -> CustomerProfile {
    CustomerProfile {
        name: "Asha Rai".into(),
        email: "asha@example.com".to_string().into(),
    }
}

fn pending_booking() -> Booking {
    booking_with_status(BookingStatus::Pending)
}

fn booking_with_status(status: BookingStatus) -> Booking {
    Booking {
        id: "bkg-1".into(),
        package_id: "pkg-roots".into(),
        package_name: "Living Root Bridges Trek".into(),
        user_id: "usr-1".into(),
        customer_name: "Asha Rai".into(),
        customer_email: "asha@example.com".to_string().into(),
        booking_date: Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()),
        travel_date: Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(),
        num_travelers: 2,
        total_price: 39000,
        status,
    }
}

fn checkout_context() -> CheckoutContext {
    CheckoutContext {
        order: PaymentOrder {
            id: "order_N9x4Qe".into(),
            amount: 3_900_000,
            currency: "INR".into(),
        },
        booking: pending_booking(),
        key_id: "rzp_test_k3y".into(),
    }
}

fn proof() -> PaymentProof {
    PaymentProof {
        order_id: "order_N9x4Qe".into(),
        payment_id: "pay_77Hh2k".into(),
        signature: "feedface".into(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn flow_on_form(api: Arc<ScriptedApi>) -> BookingFlow {
    BookingFlow::starting_on(api, package(), customer(), 7, today())
}

fn bridge_config() -> BridgeConfig {
    BridgeConfig {
        storefront_name: "North East Adventure".into(),
        theme_color: "#4F46E5".into(),
    }
}

#[tokio::test]
async fn happy_path_reaches_confirmation() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Ok(checkout_context()));
    api.on_verify(Ok(booking_with_status(BookingStatus::Confirmed)));

    let mut flow = flow_on_form(api.clone());
    flow.set_num_travelers(2);
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    assert_eq!(flow.total_price(), 39000);

    flow.submit().await.unwrap();
    assert!(flow.error().is_none());
    let ctx = match flow.stage() {
        FlowStage::AwaitingPayment(ctx) => ctx.clone(),
        other => panic!("expected AwaitingPayment, got {other:?}"),
    };
    assert_eq!(ctx, checkout_context());
    // Creation alone makes exactly one network call.
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 1);
    assert_eq!(api.verify_calls.load(Ordering::SeqCst), 0);

    let gateway = Arc::new(MockGateway::scripted(vec![CheckoutOutcome::Completed(
        proof(),
    )]));
    let mut bridge = PaymentBridge::mount(api.clone(), gateway.clone(), bridge_config())
        .await
        .unwrap();
    assert!(gateway.is_attached());

    flow.take_payment(&mut bridge).await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::Confirmed(_)));
    assert_eq!(api.verify_calls.load(Ordering::SeqCst), 1);

    // The checkout was opened with exactly the returned order and key.
    let opened = gateway.opened_options();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0].key, "rzp_test_k3y");
    assert_eq!(opened[0].order_id, "order_N9x4Qe");
    assert_eq!(opened[0].amount, 3_900_000);
    assert_eq!(opened[0].currency, "INR");
    assert_eq!(opened[0].name, "North East Adventure");
    assert_eq!(opened[0].description, "Booking for Living Root Bridges Trek");
    assert_eq!(opened[0].prefill.name, "Asha Rai");
    assert_eq!(opened[0].prefill.email.expose(), "asha@example.com");

    match render(&flow) {
        View::Confirmed(view) => {
            assert_eq!(view.customer_name, "Asha Rai");
            assert_eq!(view.package_name, "Living Root Bridges Trek");
            assert_eq!(view.travel_date, "10 June 2024");
            assert_eq!(view.num_travelers, 2);
            assert_eq!(view.total_paid, "₹39,000");
        }
        other => panic!("expected confirmation view, got {other:?}"),
    }

    drop(bridge);
    assert!(!gateway.is_attached());
}

#[tokio::test]
async fn total_tracks_traveler_count_and_never_drops_below_one() {
    let api = Arc::new(ScriptedApi::default());
    let mut flow = flow_on_form(api);

    assert_eq!(flow.num_travelers(), 1);
    assert_eq!(flow.total_price(), 19500);

    flow.set_num_travelers(2);
    assert_eq!(flow.total_price(), 39000);

    flow.set_num_travelers(5);
    assert_eq!(flow.total_price(), 97500);

    // Zero is not a party size; the last valid count stays.
    flow.set_num_travelers(0);
    assert_eq!(flow.num_travelers(), 5);
    assert_eq!(flow.total_price(), 97500);
}

#[tokio::test]
async fn too_soon_travel_date_blocks_submission_locally() {
    let api = Arc::new(ScriptedApi::default());
    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());

    flow.submit().await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::Form));
    assert_eq!(
        flow.error(),
        Some("Travel date must be at least 7 days from today.")
    );
    // The draft never left the machine.
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_travel_date_blocks_submission_locally() {
    let api = Arc::new(ScriptedApi::default());
    let mut flow = flow_on_form(api.clone());

    flow.submit().await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::Form));
    assert_eq!(flow.error(), Some("Please select a preferred travel date."));
    assert_eq!(api.create_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_creation_keeps_the_form_and_surfaces_the_backend_message() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Err(ApiError::Backend {
        status: 400,
        message: "Package is sold out for that date".into(),
    }));
    api.on_create(Ok(checkout_context()));

    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());

    flow.submit().await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::Form));
    assert_eq!(flow.error(), Some("Package is sold out for that date"));

    // The form is still live: a resubmit goes through.
    flow.submit().await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::AwaitingPayment(_)));
    assert!(flow.error().is_none());
}

#[tokio::test]
async fn transport_failure_falls_back_to_the_generic_message() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Err(ApiError::Transport("connection reset".into())));

    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());

    flow.submit().await.unwrap();
    assert_eq!(flow.error(), Some("Booking failed. Please try again."));
}

#[tokio::test]
async fn unconfirmed_verification_stays_on_payment_with_an_error() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Ok(checkout_context()));
    api.on_verify(Ok(booking_with_status(BookingStatus::Pending)));

    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    flow.submit().await.unwrap();

    let gateway = Arc::new(MockGateway::scripted(vec![CheckoutOutcome::Completed(
        proof(),
    )]));
    let mut bridge = PaymentBridge::mount(api.clone(), gateway, bridge_config())
        .await
        .unwrap();

    flow.take_payment(&mut bridge).await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::AwaitingPayment(_)));
    assert_eq!(flow.error(), Some("Payment verification failed"));
}

#[tokio::test]
async fn verification_error_prefers_the_backend_message() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Ok(checkout_context()));
    api.on_verify(Err(ApiError::Backend {
        status: 400,
        message: "Invalid payment signature".into(),
    }));

    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    flow.submit().await.unwrap();

    let gateway = Arc::new(MockGateway::scripted(vec![CheckoutOutcome::Completed(
        proof(),
    )]));
    let mut bridge = PaymentBridge::mount(api.clone(), gateway, bridge_config())
        .await
        .unwrap();

    flow.take_payment(&mut bridge).await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::AwaitingPayment(_)));
    assert_eq!(flow.error(), Some("Invalid payment signature"));
}

#[tokio::test]
async fn dismissal_is_not_an_error_and_the_order_survives_for_a_retry() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Ok(checkout_context()));
    api.on_verify(Ok(booking_with_status(BookingStatus::Confirmed)));

    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    flow.submit().await.unwrap();

    let gateway = Arc::new(MockGateway::scripted(vec![
        CheckoutOutcome::Dismissed,
        CheckoutOutcome::Completed(proof()),
    ]));
    let mut bridge = PaymentBridge::mount(api.clone(), gateway.clone(), bridge_config())
        .await
        .unwrap();

    // First attempt: the shopper walks away from the popup.
    flow.take_payment(&mut bridge).await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::AwaitingPayment(_)));
    assert!(flow.error().is_none());
    assert_eq!(api.verify_calls.load(Ordering::SeqCst), 0);

    // Second attempt reuses the same order, not a regenerated one.
    flow.take_payment(&mut bridge).await.unwrap();
    assert!(matches!(flow.stage(), FlowStage::Confirmed(_)));
    let opened = gateway.opened_options();
    assert_eq!(opened.len(), 2);
    assert_eq!(opened[0].order_id, opened[1].order_id);
}

#[tokio::test]
async fn duplicate_completion_after_settlement_is_ignored() {
    let api = Arc::new(ScriptedApi::default());
    api.on_verify(Ok(booking_with_status(BookingStatus::Confirmed)));

    let gateway = Arc::new(MockGateway::scripted(vec![
        CheckoutOutcome::Completed(proof()),
        CheckoutOutcome::Completed(proof()),
    ]));
    let mut bridge = PaymentBridge::mount(api.clone(), gateway, bridge_config())
        .await
        .unwrap();

    let ctx = checkout_context();
    let outcome = bridge.collect(&ctx, &customer()).await.unwrap();
    assert!(matches!(outcome, PaymentOutcome::Confirmed(_)));

    // The gateway contract says this cannot happen; if it ever does, the
    // bridge must not verify (or charge) twice.
    let outcome = bridge.collect(&ctx, &customer()).await.unwrap();
    assert!(matches!(outcome, PaymentOutcome::Abandoned));
    assert_eq!(api.verify_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn confirmed_is_terminal() {
    let api = Arc::new(ScriptedApi::default());
    api.on_create(Ok(checkout_context()));
    api.on_verify(Ok(booking_with_status(BookingStatus::Confirmed)));

    let mut flow = flow_on_form(api.clone());
    flow.set_travel_date(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
    flow.submit().await.unwrap();

    let gateway = Arc::new(MockGateway::scripted(vec![CheckoutOutcome::Completed(
        proof(),
    )]));
    let mut bridge = PaymentBridge::mount(api.clone(), gateway, bridge_config())
        .await
        .unwrap();
    flow.take_payment(&mut bridge).await.unwrap();

    assert!(matches!(flow.submit().await, Err(FlowError::InvalidStage)));
    assert!(matches!(
        flow.take_payment(&mut bridge).await,
        Err(FlowError::InvalidStage)
    ));
}
