use std::sync::Arc;

use async_trait::async_trait;

use roam_core::payment::{
    CheckoutGateway, CheckoutOptions, CheckoutOutcome, CheckoutSession, GatewayError,
    PaymentProof,
};
use roam_shared::money::format_inr_subunits;

use crate::term::Prompter;

/// Hosted-checkout stand-in for the terminal. The real widget runs in the
/// gateway's own window; the desk operator relays its result by pasting the
/// payment id and signature. An empty payment id is a dismissal.
pub struct TerminalCheckout {
    prompter: Arc<Prompter>,
}

impl TerminalCheckout {
    pub fn new(prompter: Arc<Prompter>) -> Self {
        Self { prompter }
    }
}

#[async_trait]
impl CheckoutGateway for TerminalCheckout {
    async fn attach(&self) -> Result<(), GatewayError> {
        tracing::debug!("terminal checkout ready");
        Ok(())
    }

    fn detach(&self) {
        tracing::debug!("terminal checkout torn down");
    }

    async fn open(
        &self,
        options: CheckoutOptions,
    ) -> Result<Box<dyn CheckoutSession>, GatewayError> {
        println!();
        println!("--- {} · hosted checkout ---", options.name);
        println!("{}", options.description);
        println!("Order:  {}", options.order_id);
        println!(
            "Amount: {} ({})",
            format_inr_subunits(options.amount),
            options.currency
        );
        println!("Key:    {}", options.key);
        println!("Payer:  {}", options.prefill.name);
        println!("Complete the payment in the gateway window, then paste the result.");

        Ok(Box::new(TerminalSession {
            prompter: self.prompter.clone(),
            order_id: options.order_id,
        }))
    }
}

struct TerminalSession {
    prompter: Arc<Prompter>,
    order_id: String,
}

#[async_trait]
impl CheckoutSession for TerminalSession {
    async fn outcome(&mut self) -> CheckoutOutcome {
        let payment_id = match self.prompter.ask("Payment id (blank to dismiss): ").await {
            Ok(line) if !line.is_empty() => line,
            _ => return CheckoutOutcome::Dismissed,
        };
        let signature = match self.prompter.ask("Signature: ").await {
            Ok(line) if !line.is_empty() => line,
            _ => return CheckoutOutcome::Dismissed,
        };
        CheckoutOutcome::Completed(PaymentProof {
            order_id: self.order_id.clone(),
            payment_id,
            signature,
        })
    }

    fn close(self: Box<Self>) {}
}
