use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::models::{NormalizedMatch, Prediction, SportDetails};

/// Confidence attached to every prediction; the model's reply is not scored.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;

const SYSTEM_PROMPT: &str =
    "You are a professional sports analyst specializing in real-time predictions.";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 200;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Prediction API error {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Prediction API returned no choices")]
    EmptyResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Extra context from the caller that the feed does not carry.
#[derive(Debug, Clone, Default)]
pub struct PromptContext<'a> {
    pub prediction_type: Option<&'a str>,
    pub recent_form: Option<&'a str>,
}

pub struct PredictionEngine {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl PredictionEngine {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(config.openai_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Ask the model for a prediction on a live match.
    pub async fn generate_prediction(
        &self,
        match_data: &NormalizedMatch,
        context: &PromptContext<'_>,
    ) -> Result<Prediction, PredictionError> {
        let api_key = self.api_key.as_ref().ok_or(PredictionError::MissingApiKey)?;
        let prompt = create_prompt(match_data, context);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user".to_string(), content: prompt },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(
            "Requesting {} prediction for {} vs {} (model: {})",
            match_data.sport(),
            match_data.home_team,
            match_data.away_team,
            self.model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Prediction API error: {} - {}", status, body);
            return Err(PredictionError::ApiError { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(PredictionError::EmptyResponse)?;

        tracing::debug!("Prediction received: {} chars", content.len());
        Ok(process_response(content))
    }
}

fn process_response(content: String) -> Prediction {
    Prediction {
        prediction: content.trim().to_string(),
        confidence: DEFAULT_CONFIDENCE,
        timestamp: Utc::now(),
    }
}

/// Sport-specific user prompt for a live match.
pub fn create_prompt(match_data: &NormalizedMatch, context: &PromptContext<'_>) -> String {
    let recent_form = context.recent_form.unwrap_or("not available");
    let focus = context.prediction_type.unwrap_or("match_outcome");

    match &match_data.details {
        SportDetails::Soccer { possession, shots_on_target } => format!(
            "Based on the following soccer match data:\n\
             - Teams: {} vs {}\n\
             - Current score: {}\n\
             - Time: {}\n\
             - Recent form: {}\n\
             - Possession: {}% - {}%\n\
             - Shots on target: {} - {}\n\
             \n\
             Requested prediction: {}\n\
             Predict:\n\
             1. The next team to score\n\
             2. The final match outcome\n\
             3. Confidence level in predictions (%)",
            match_data.home_team,
            match_data.away_team,
            match_data.score,
            match_data.time,
            recent_form,
            possession.home,
            possession.away,
            shots_on_target.home,
            shots_on_target.away,
            focus,
        ),
        SportDetails::Basketball { period, statistics } => format!(
            "Based on the following basketball game data:\n\
             - Teams: {} vs {}\n\
             - Current score: {}\n\
             - Period: {} ({} on the clock)\n\
             - Recent form: {}\n\
             - Field goals made: {} - {}\n\
             - Rebounds: {} - {}\n\
             - Assists: {} - {}\n\
             \n\
             Requested prediction: {}\n\
             Predict:\n\
             1. The team that wins the current period\n\
             2. The final game outcome\n\
             3. Confidence level in predictions (%)",
            match_data.home_team,
            match_data.away_team,
            match_data.score,
            period,
            match_data.time,
            recent_form,
            statistics.home.field_goals,
            statistics.away.field_goals,
            statistics.home.rebounds,
            statistics.away.rebounds,
            statistics.home.assists,
            statistics.away.assists,
            focus,
        ),
        SportDetails::Tennis { set, statistics } => format!(
            "Based on the following tennis match data:\n\
             - Players: {} vs {}\n\
             - Score: {}\n\
             - Set: {}\n\
             - Time: {}\n\
             - Recent form: {}\n\
             - Aces: {} - {}\n\
             - Double faults: {} - {}\n\
             - First serve %: {:.1} - {:.1}\n\
             \n\
             Requested prediction: {}\n\
             Predict:\n\
             1. The winner of the current set\n\
             2. The final match outcome\n\
             3. Confidence level in predictions (%)",
            match_data.home_team,
            match_data.away_team,
            match_data.score,
            set,
            match_data.time,
            recent_form,
            statistics.home.aces,
            statistics.away.aces,
            statistics.home.double_faults,
            statistics.away.double_faults,
            statistics.home.first_serve_pct,
            statistics.away.first_serve_pct,
            focus,
        ),
    }
}
