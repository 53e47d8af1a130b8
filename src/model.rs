use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelVariant {
    #[default]
    Single,
    Multi,
}

impl ModelVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVariant::Single => "single",
            ModelVariant::Multi => "multi",
        }
    }

    /// Badge text shown next to the switch and in the result panel.
    pub fn label(&self) -> &'static str {
        match self {
            ModelVariant::Single => "Single Season",
            ModelVariant::Multi => "Multi Season",
        }
    }
}

impl FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(ModelVariant::Single),
            "multi" => Ok(ModelVariant::Multi),
            other => Err(format!("unknown model variant: {}", other)),
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /predict`. Field names are the wire keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub driver: String,
    pub race_name: String,
    pub position: i64,
    pub stint: i64,
    pub tyre_life: i64,
    pub compound: String,
    pub fresh_tyre: i64,
    pub speed_fl: f64,
    pub lap_time_seconds: f64,
    pub race_round: i64,
    pub year: i64,
    pub has_safety_car: u8,
    pub has_vsc: u8,
    pub has_red_flag: u8,
    pub has_yellow: u8,
    pub model_type: ModelVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub lap: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advantage: Option<String>,
}

impl Alternative {
    pub fn at(lap: f64) -> Self {
        Self { lap, kind: None, risk_level: None, advantage: None }
    }
}

/// Body of a successful `POST /predict` response.
///
/// Lap numbers are kept as `f64`: the service rounds to one decimal and may
/// send `34.0` as well as `34`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub optimal_lap: f64,
    pub confidence: f64,
    pub mae: f64,
    pub prediction_lower: f64,
    pub prediction_upper: f64,
    /// Echoed as sent; only `"single"` is special-cased for display.
    pub model_used: String,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_summary: Option<serde_json::Value>,
}

impl PredictionResult {
    /// Display label for `model_used`. Anything but `"single"` reads as multi.
    pub fn model_label(&self) -> &'static str {
        if self.model_used == ModelVariant::Single.as_str() {
            ModelVariant::Single.label()
        } else {
            ModelVariant::Multi.label()
        }
    }

    /// Shape checks the renderer relies on. Returns the offending field.
    pub fn check_renderable(&self) -> Result<(), String> {
        let numbers = [
            ("optimal_lap", self.optimal_lap),
            ("confidence", self.confidence),
            ("mae", self.mae),
            ("prediction_lower", self.prediction_lower),
            ("prediction_upper", self.prediction_upper),
        ];
        for (name, value) in numbers {
            if !value.is_finite() {
                return Err(format!("{} is not a finite number", name));
            }
        }
        if let Some(pos) = self.alternatives.iter().position(|a| !a.lap.is_finite()) {
            return Err(format!("alternatives[{}].lap is not a finite number", pos));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub const HEALTHY: &'static str = "healthy";

    pub fn is_healthy(&self) -> bool {
        self.status == Self::HEALTHY
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub models_loaded: serde_json::Map<String, serde_json::Value>,
}

/// One successful round-trip. Serialized with the keys of the export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "input")]
    pub request: PredictionRequest,
    #[serde(rename = "data")]
    pub result: PredictionResult,
}
