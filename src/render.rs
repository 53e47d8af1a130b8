//! Result -> display state. Everything here is a pure function of one
//! `PredictionResult`; applying the output to a screen is the job of a
//! [`crate::ui::RenderTarget`].

use serde::Serialize;

use crate::logging::{log, obj, v_num, Domain, Level};
use crate::model::PredictionResult;
use serde_json::json;

pub const STRATEGY_LABELS: [&str; 3] = ["Aggressive", "Optimal", "Conservative"];
pub const CONFIDENCE_LABELS: [&str; 2] = ["Confidence", "Uncertainty"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimaryPanel {
    pub optimal_lap: String,
    pub confidence: String,
    /// Width of the confidence bar in percent, unrounded.
    pub confidence_fill: f64,
    pub mae: String,
    pub range: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyChart {
    pub labels: [&'static str; 3],
    /// `alternatives[i].lap` in received order; `None` when the service sent fewer.
    pub values: [Option<f64>; 3],
    /// Alternatives past the third slot, not charted.
    pub overflow: usize,
}

impl Default for StrategyChart {
    fn default() -> Self {
        Self { labels: STRATEGY_LABELS, values: [Some(0.0); 3], overflow: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceChart {
    pub confidence: f64,
    pub uncertainty: f64,
}

impl Default for ConfidenceChart {
    fn default() -> Self {
        Self { confidence: 0.0, uncertainty: 100.0 }
    }
}

impl ConfidenceChart {
    pub fn values(&self) -> [f64; 2] {
        [self.confidence, self.uncertainty]
    }
}

/// The three coordinated updates for one result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub panel: PrimaryPanel,
    pub strategy: StrategyChart,
    pub confidence: ConfidenceChart,
}

/// Number as a dashboard would print it: `34.0` reads `34`, `1.2` reads `1.2`.
pub fn display_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    format!("{}", n)
}

/// One decimal place, halves rounded away from zero.
pub fn round1(n: f64) -> f64 {
    (n * 10.0).round() / 10.0
}

pub fn confidence_percent(fraction: f64) -> f64 {
    round1(fraction * 100.0)
}

pub fn primary_panel(result: &PredictionResult) -> PrimaryPanel {
    PrimaryPanel {
        optimal_lap: display_number(result.optimal_lap),
        confidence: format!("{:.1}%", confidence_percent(result.confidence)),
        confidence_fill: result.confidence * 100.0,
        mae: format!("±{} laps", display_number(result.mae)),
        range: format!(
            "Lap {} - {}",
            display_number(result.prediction_lower),
            display_number(result.prediction_upper)
        ),
        model: result.model_label().to_string(),
    }
}

pub fn strategy_chart(result: &PredictionResult) -> StrategyChart {
    let mut values = [None; 3];
    for (slot, alt) in values.iter_mut().zip(result.alternatives.iter()) {
        *slot = Some(alt.lap);
    }
    StrategyChart {
        labels: STRATEGY_LABELS,
        values,
        overflow: result.alternatives.len().saturating_sub(STRATEGY_LABELS.len()),
    }
}

pub fn confidence_chart(result: &PredictionResult) -> ConfidenceChart {
    let confidence = confidence_percent(result.confidence);
    ConfidenceChart { confidence, uncertainty: round1(100.0 - confidence) }
}

pub fn render(result: &PredictionResult) -> RenderFrame {
    RenderFrame {
        panel: primary_panel(result),
        strategy: strategy_chart(result),
        confidence: confidence_chart(result),
    }
}

/// Holds the chart datasets currently on screen.
#[derive(Debug, Clone, Default)]
pub struct VisualizationSynchronizer {
    panel: Option<PrimaryPanel>,
    strategy: StrategyChart,
    confidence: ConfidenceChart,
}

impl VisualizationSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Redraws all three views from `result`. Prior state is discarded.
    pub fn apply(&mut self, result: &PredictionResult) -> RenderFrame {
        let frame = render(result);
        if frame.strategy.values.iter().any(Option::is_none) || frame.strategy.overflow > 0 {
            log(
                Level::Warn,
                Domain::Render,
                "alternatives_mismatch",
                obj(&[
                    ("received", json!(result.alternatives.len())),
                    ("slots", json!(STRATEGY_LABELS.len())),
                ]),
            );
        }
        log(
            Level::Debug,
            Domain::Render,
            "frame",
            obj(&[
                ("confidence", v_num(frame.confidence.confidence)),
                ("uncertainty", v_num(frame.confidence.uncertainty)),
            ]),
        );
        self.panel = Some(frame.panel.clone());
        self.strategy = frame.strategy.clone();
        self.confidence = frame.confidence;
        frame
    }

    pub fn panel(&self) -> Option<&PrimaryPanel> {
        self.panel.as_ref()
    }

    pub fn strategy(&self) -> &StrategyChart {
        &self.strategy
    }

    pub fn confidence(&self) -> &ConfidenceChart {
        &self.confidence
    }
}
