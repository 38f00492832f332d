//! Email transaccional (Resend)
//!
//! Envíos best-effort: un fallo se registra en el log y nunca se propaga al
//! caller ni se reintenta. Sin API key configurada, el servicio es un no-op.

use reqwest::Client;
use serde_json::json;
use tracing::{error, info};

use crate::config::environment::EnvironmentConfig;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct EmailService {
    http_client: Client,
    api_key: Option<String>,
    from: String,
    app_url: String,
}

impl EmailService {
    pub fn new(config: &EnvironmentConfig, http_client: Client) -> Self {
        Self {
            http_client,
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
            app_url: config.app_url.clone(),
        }
    }

    /// Confirmación de solicitud recibida
    pub async fn send_application_received(
        &self,
        to: &str,
        applicant_name: &str,
        company_name: &str,
    ) {
        let Some(api_key) = &self.api_key else {
            info!("RESEND_API_KEY not configured, skipping confirmation email");
            return;
        };

        let status_url = format!("{}/driver/application-status", self.app_url);
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": format!("Application received for {}", company_name),
            "html": format!(
                "<p>Hi {},</p>\
                 <p>We received your application for <strong>{}</strong>.</p>\
                 <p>You can check your application status here:</p>\
                 <p><a href=\"{}\">{}</a></p>\
                 <p>Thanks for applying!</p>",
                applicant_name, company_name, status_url, status_url
            ),
        });

        let result = self
            .http_client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(to = %to, "confirmation email sent");
            }
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                error!(%status, detail = %detail, "Resend rejected confirmation email");
            }
            Err(e) => {
                error!("Failed to reach Resend: {}", e);
            }
        }
    }
}
