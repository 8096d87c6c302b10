pub mod stripe;

use async_trait::async_trait;

/// A deposit intent created with the processor. The client finishes the
/// payment with `client_secret`; the id comes back on the booking draft.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount_cents: i64,
}

/// Outcome of checking a payment id with the processor. `paid` is true only
/// when the charge succeeded for the expected amount.
#[derive(Debug, Clone)]
pub struct DepositVerification {
    pub paid: bool,
    pub status: String,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_deposit_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        description: &str,
    ) -> anyhow::Result<PaymentIntent>;

    async fn verify_deposit(
        &self,
        payment_id: &str,
        expected_cents: i64,
    ) -> anyhow::Result<DepositVerification>;
}
