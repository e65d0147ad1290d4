//! Client for the external analysis collaborator.
//!
//! The statistics report text is handed off verbatim and whatever the
//! service replies comes back unmodified. Every failure on this path is
//! returned as plain text - a dashboard request must never crash because
//! the analysis service is down or out of quota.

use crate::config::AnalysisSettings;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Instructions sent with every analysis request.
const ANALYST_PROMPT: &str = "You are a professional cold-chain monitoring analyst for a \
medical vaccine storage facility. You receive detailed sensor data reports and must provide \
a comprehensive analysis. Structure your response as follows:\n\n\
1. DATA OVERVIEW: How long was data collected, how many readings total.\n\
2. TEMPERATURE ASSESSMENT: Current temp, trend, how long above danger/caution thresholds. \
Is the storage unit maintaining safe conditions?\n\
3. DOOR SECURITY: How many times was the door opened, total open duration. Were any door \
events concerning?\n\
4. RISK SUMMARY: What percentage of time was the system in each risk level?\n\
5. OVERALL VERDICT: Rate the overall cold-chain integrity as PASS, CAUTION, or FAIL with a \
brief explanation.\n\
6. RECOMMENDATIONS: 1-2 actionable suggestions if any issues found.\n\n\
Use clear headings. Be specific with numbers and percentages. Keep total response under \
250 words.";

/// Client for the report analysis service.
pub struct AnalysisClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl AnalysisClient {
    pub fn new(settings: &AnalysisSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        }
    }

    /// Hand the report text to the analysis service and return its reply.
    ///
    /// Failures come back as plain-text messages, never as errors.
    pub async fn analyze(&self, report_text: &str) -> String {
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": ANALYST_PROMPT},
                {"role": "user", "content": report_text},
            ],
            "max_tokens": 500,
            "temperature": 0.7,
        });

        let response = match self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return format!("Error calling analysis service: {e}"),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return format!("API Error {}: {}", status.as_u16(), snippet);
        }

        match response.json::<ChatResponse>().await {
            Ok(parsed) => parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .unwrap_or_else(|| "Analysis service returned no content.".to_string()),
            Err(e) => format!("Error decoding analysis response: {e}"),
        }
    }
}
