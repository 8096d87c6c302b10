use anyhow::Context;
use async_trait::async_trait;

use super::{DepositVerification, PaymentIntent, PaymentProvider};

pub struct StripeProvider {
    secret_key: String,
    client: reqwest::Client,
}

impl StripeProvider {
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key,
            client: reqwest::Client::new(),
        }
    }

    /// With no key configured the provider runs in dev mode: it mints
    /// synthetic intents and verifies anything, so the whole booking flow
    /// works locally without a Stripe account.
    fn dev_mode(&self) -> bool {
        self.secret_key.is_empty()
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_deposit_intent(
        &self,
        amount_cents: i64,
        currency: &str,
        description: &str,
    ) -> anyhow::Result<PaymentIntent> {
        if self.dev_mode() {
            let id = format!("pi_test_{}", uuid::Uuid::new_v4().simple());
            tracing::warn!(intent_id = %id, "STRIPE_SECRET_KEY not set, minting dev payment intent");
            return Ok(PaymentIntent {
                client_secret: format!("{id}_secret_dev"),
                id,
                amount_cents,
            });
        }

        let resp = self
            .client
            .post("https://api.stripe.com/v1/payment_intents")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&[
                ("amount", amount_cents.to_string().as_str()),
                ("currency", currency),
                ("description", description),
                ("automatic_payment_methods[enabled]", "true"),
            ])
            .send()
            .await
            .context("failed to call Stripe API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Stripe response")?;

        if !status.is_success() {
            anyhow::bail!("Stripe API error ({}): {}", status, data);
        }

        let id = data["id"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing id in Stripe response"))?
            .to_string();
        let client_secret = data["client_secret"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("missing client_secret in Stripe response"))?
            .to_string();

        Ok(PaymentIntent {
            id,
            client_secret,
            amount_cents,
        })
    }

    async fn verify_deposit(
        &self,
        payment_id: &str,
        expected_cents: i64,
    ) -> anyhow::Result<DepositVerification> {
        if self.dev_mode() {
            tracing::warn!(payment_id = %payment_id, "STRIPE_SECRET_KEY not set, accepting payment unverified");
            return Ok(DepositVerification {
                paid: true,
                status: "succeeded".to_string(),
            });
        }

        let url = format!("https://api.stripe.com/v1/payment_intents/{payment_id}");
        let resp = self
            .client
            .get(&url)
            .basic_auth(&self.secret_key, None::<&str>)
            .send()
            .await
            .context("failed to call Stripe API")?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse Stripe response")?;

        if !status.is_success() {
            anyhow::bail!("Stripe API error ({}): {}", status, data);
        }

        let intent_status = data["status"].as_str().unwrap_or("unknown").to_string();
        let amount = data["amount"].as_i64().unwrap_or(0);

        // A succeeded charge for the wrong amount is still a failed deposit
        let paid = intent_status == "succeeded" && amount == expected_cents;
        if intent_status == "succeeded" && amount != expected_cents {
            tracing::warn!(
                payment_id = %payment_id,
                expected = expected_cents,
                actual = amount,
                "payment amount mismatch"
            );
        }

        Ok(DepositVerification {
            paid,
            status: intent_status,
        })
    }
}
