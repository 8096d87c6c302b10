use anyhow::Context;
use async_trait::async_trait;

use crate::models::{Appointment, AppointmentStatus};

/// Outbound notification boundary. Implementations deliver booking
/// confirmations and status updates; callers go through the dispatch
/// helpers below, which log failures and move on. A lost email must never
/// lose a booking.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn booking_created(&self, appointment: &Appointment) -> anyhow::Result<()>;

    async fn status_changed(
        &self,
        appointment: &Appointment,
        previous: AppointmentStatus,
    ) -> anyhow::Result<()>;
}

pub async fn dispatch_created(sink: &dyn NotificationSink, appointment: &Appointment) {
    if let Err(e) = sink.booking_created(appointment).await {
        tracing::error!(error = %e, appointment_id = %appointment.id, "failed to send booking notification");
    }
}

pub async fn dispatch_status_change(
    sink: &dyn NotificationSink,
    appointment: &Appointment,
    previous: AppointmentStatus,
) {
    if let Err(e) = sink.status_changed(appointment, previous).await {
        tracing::error!(error = %e, appointment_id = %appointment.id, "failed to send status notification");
    }
}

/// Posts notification payloads to an external webhook (typically a mail or
/// SMS relay run alongside the service).
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    async fn post(&self, event: &str, appointment: &Appointment) -> anyhow::Result<()> {
        let body = serde_json::json!({
            "event": event,
            "appointment": appointment,
        });

        self.client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .context("failed to call notification webhook")?
            .error_for_status()
            .context("notification webhook returned error")?;

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn booking_created(&self, appointment: &Appointment) -> anyhow::Result<()> {
        self.post("booking_created", appointment).await
    }

    async fn status_changed(
        &self,
        appointment: &Appointment,
        previous: AppointmentStatus,
    ) -> anyhow::Result<()> {
        let event = format!(
            "status_changed:{}->{}",
            previous.as_str(),
            appointment.status.as_str()
        );
        self.post(&event, appointment).await
    }
}

/// Used when no webhook is configured. Keeps local runs quiet but visible.
pub struct NoopNotifier;

#[async_trait]
impl NotificationSink for NoopNotifier {
    async fn booking_created(&self, appointment: &Appointment) -> anyhow::Result<()> {
        tracing::debug!(appointment_id = %appointment.id, "notification (noop): booking created");
        Ok(())
    }

    async fn status_changed(
        &self,
        appointment: &Appointment,
        previous: AppointmentStatus,
    ) -> anyhow::Result<()> {
        tracing::debug!(
            appointment_id = %appointment.id,
            from = previous.as_str(),
            to = appointment.status.as_str(),
            "notification (noop): status changed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct FailingSink;

    #[async_trait]
    impl NotificationSink for FailingSink {
        async fn booking_created(&self, _appointment: &Appointment) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }

        async fn status_changed(
            &self,
            _appointment: &Appointment,
            _previous: AppointmentStatus,
        ) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }
    }

    fn sample_appointment() -> Appointment {
        let now = chrono::Utc::now().naive_utc();
        Appointment {
            id: "appt-1".to_string(),
            customer: crate::models::Customer::Guest {
                name: "Dana".to_string(),
                email: "dana@example.com".to_string(),
                phone: "+15550001111".to_string(),
            },
            services: vec![],
            vehicle_type: crate::models::VehicleType::Small,
            date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            time_slot: "10:00 AM".to_string(),
            address: crate::models::Address {
                street: "12 Elm St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                zip_code: "62704".into(),
            },
            estimated_price_cents: 8_500,
            final_price_cents: 8_500,
            deposit_cents: 5_000,
            remaining_cents: 3_500,
            payment: crate::models::PaymentRecord {
                id: "pi_1".to_string(),
                method: "card".to_string(),
                status: "succeeded".to_string(),
            },
            status: AppointmentStatus::Approved,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_dispatch_swallows_sink_failure() {
        let appt = sample_appointment();
        // Must not panic or propagate
        dispatch_created(&FailingSink, &appt).await;
        dispatch_status_change(&FailingSink, &appt, AppointmentStatus::Pending).await;
    }

    #[tokio::test]
    async fn test_noop_sink_accepts_everything() {
        let appt = sample_appointment();
        assert!(NoopNotifier.booking_created(&appt).await.is_ok());
        assert!(NoopNotifier
            .status_changed(&appt, AppointmentStatus::Pending)
            .await
            .is_ok());
    }
}
