use chrono::NaiveDate;

use roam_shared::money::format_inr;

use crate::flow::{BookingFlow, FlowStage};

/// What the storefront should show. Exactly one view per flow state; the
/// mapping is pure and owns no behavior.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Form(FormView),
    Payment(PaymentView),
    Confirmed(ConfirmationView),
    /// Terminal error screen: the package could not be loaded before the
    /// form ever rendered. Only navigation leads out of it.
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub package_name: String,
    pub destination: String,
    pub duration_days: u32,
    pub price_per_person: String,
    pub num_travelers: u32,
    pub total: String,
    pub min_travel_date: NaiveDate,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentView {
    pub package_name: String,
    pub travel_date: String,
    pub num_travelers: u32,
    pub total: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationView {
    pub customer_name: String,
    pub package_name: String,
    pub travel_date: String,
    pub num_travelers: u32,
    pub total_paid: String,
}

impl View {
    pub fn unavailable(message: impl Into<String>) -> Self {
        View::Unavailable {
            message: message.into(),
        }
    }
}

fn display_date(date: NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Map the flow to its one current view.
pub fn render(flow: &BookingFlow) -> View {
    match flow.stage() {
        FlowStage::Form => View::Form(FormView {
            package_name: flow.package().name.clone(),
            destination: flow.package().destination.clone(),
            duration_days: flow.package().duration,
            price_per_person: format_inr(flow.package().price),
            num_travelers: flow.num_travelers(),
            total: format_inr(flow.total_price()),
            min_travel_date: flow.min_travel_date(),
            error: flow.error().map(str::to_string),
        }),
        FlowStage::AwaitingPayment(ctx) => View::Payment(PaymentView {
            package_name: ctx.booking.package_name.clone(),
            travel_date: display_date(ctx.booking.travel_date.date_naive()),
            num_travelers: ctx.booking.num_travelers,
            total: format_inr(ctx.booking.total_price),
            error: flow.error().map(str::to_string),
        }),
        FlowStage::Confirmed(booking) => View::Confirmed(ConfirmationView {
            customer_name: booking.customer_name.clone(),
            package_name: booking.package_name.clone(),
            travel_date: display_date(booking.travel_date.date_naive()),
            num_travelers: booking.num_travelers,
            total_paid: format_inr(booking.total_price),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_render_long_form() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(display_date(date), "10 June 2024");
    }
}
