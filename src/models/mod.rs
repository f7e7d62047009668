use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Soccer,
    Basketball,
    Tennis,
}

impl Sport {
    #[cfg(test)]
    pub const ALL: [Sport; 3] = [Sport::Soccer, Sport::Basketball, Sport::Tennis];

    /// Lenient resolution used by the feed side: any tag other than an exact
    /// lowercase sport name becomes soccer.
    pub fn from_tag(tag: &str) -> Sport {
        tag.parse().unwrap_or(Sport::Soccer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Soccer => "soccer",
            Sport::Basketball => "basketball",
            Sport::Tennis => "tennis",
        }
    }

    /// Path segment under the feed base URL.
    pub fn feed_path(&self) -> &'static str {
        match self {
            Sport::Soccer => "soccer/all",
            Sport::Basketball => "basketball/nba",
            Sport::Tennis => "tennis",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSport(pub String);

impl fmt::Display for UnknownSport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported sport: {}", self.0)
    }
}

impl std::error::Error for UnknownSport {}

impl FromStr for Sport {
    type Err = UnknownSport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soccer" => Ok(Sport::Soccer),
            "basketball" => Ok(Sport::Basketball),
            "tennis" => Ok(Sport::Tennis),
            other => Err(UnknownSport(other.to_string())),
        }
    }
}

/// A value reported once per side of a match.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SidePair<T> {
    pub home: T,
    pub away: T,
}

impl<T> SidePair<T> {
    pub fn new(home: T, away: T) -> Self {
        Self { home, away }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BasketballStats {
    pub field_goals: u32,
    pub rebounds: u32,
    pub assists: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TennisStats {
    pub aces: u32,
    pub double_faults: u32,
    pub first_serve_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sport", rename_all = "lowercase")]
pub enum SportDetails {
    Soccer {
        possession: SidePair<u32>,
        shots_on_target: SidePair<u32>,
    },
    Basketball {
        period: u32,
        statistics: SidePair<BasketballStats>,
    },
    Tennis {
        set: u32,
        statistics: SidePair<TennisStats>,
    },
}

/// Uniform live-match record produced from any feed payload.
///
/// For tennis `home_team` / `away_team` carry the athletes' display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMatch {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    pub time: String,
    #[serde(flatten)]
    pub details: SportDetails,
}

impl NormalizedMatch {
    pub fn sport(&self) -> Sport {
        match self.details {
            SportDetails::Soccer { .. } => Sport::Soccer,
            SportDetails::Basketball { .. } => Sport::Basketball,
            SportDetails::Tennis { .. } => Sport::Tennis,
        }
    }
}

// API request/response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub match_id: String,
    pub prediction_type: String, // "next_score", "match_outcome", etc.
    #[serde(default)]
    pub recent_form: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub prediction: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub match_id: String,
    pub prediction: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub match_data: NormalizedMatch,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}
