//! Terminal adapter for render instructions.

use std::io::Write;

use crate::model::Alternative;
use crate::render::{ConfidenceChart, RenderFrame, StrategyChart, CONFIDENCE_LABELS};
use crate::status::StatusIndicator;

/// Applies render instructions to a concrete surface.
pub trait RenderTarget {
    fn status(&mut self, indicator: &StatusIndicator);
    fn model_badge(&mut self, label: &str);
    fn busy(&mut self, busy: bool);
    fn frame(&mut self, frame: &RenderFrame, alternatives: &[Alternative]);
    fn notice(&mut self, message: &str);
    fn line(&mut self, text: &str);
    /// Ready for input. `notice` is the request notice still visible, if any.
    fn prompt(&mut self, notice: Option<&str>);
}

const BAR_WIDTH: usize = 40;

pub struct TerminalDisplay<W: Write> {
    out: W,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    // Write errors on a terminal have nowhere useful to go.
    fn put(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let filled = ((value / max).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(filled)
}

pub fn strategy_lines(chart: &StrategyChart) -> Vec<String> {
    let max = chart.values.iter().flatten().cloned().fold(0.0_f64, f64::max);
    let mut lines: Vec<String> = chart
        .labels
        .iter()
        .zip(chart.values.iter())
        .map(|(label, value)| match value {
            Some(lap) => format!("  {:<13}{:>6}  {}", label, lap, bar(*lap, max)),
            None => format!("  {:<13}{:>6}", label, "-"),
        })
        .collect();
    if chart.overflow > 0 {
        lines.push(format!("  (+{} more not charted)", chart.overflow));
    }
    lines
}

pub fn confidence_lines(chart: &ConfidenceChart) -> Vec<String> {
    chart
        .values()
        .iter()
        .zip(CONFIDENCE_LABELS.iter())
        .map(|(value, label)| format!("  {:<13}{:>5.1}%  {}", label, value, bar(*value, 100.0)))
        .collect()
}

impl<W: Write> RenderTarget for TerminalDisplay<W> {
    fn status(&mut self, indicator: &StatusIndicator) {
        let dot = match indicator.state {
            crate::status::ConnectivityState::Reachable => "●",
            crate::status::ConnectivityState::Unreachable => "○",
        };
        self.put(&format!("{} {}", dot, indicator.label));
    }

    fn model_badge(&mut self, label: &str) {
        self.put(&format!("[model: {}]", label));
    }

    fn busy(&mut self, busy: bool) {
        if busy {
            self.put("Predicting...");
        }
    }

    fn frame(&mut self, frame: &RenderFrame, alternatives: &[Alternative]) {
        let p = &frame.panel;
        self.put("");
        self.put(&format!("  Optimal Pit Lap  {}", p.optimal_lap));
        self.put(&format!("  [{:<width$}]", bar(p.confidence_fill, 100.0), width = BAR_WIDTH));
        self.put(&format!("  Confidence       {}", p.confidence));
        self.put(&format!("  Model MAE        {}", p.mae));
        self.put(&format!("  Range            {}", p.range));
        self.put(&format!("  Model            {}", p.model));
        self.put("");
        self.put("Strategy comparison (lap)");
        for l in strategy_lines(&frame.strategy) {
            self.put(&l);
        }
        self.put("Confidence split");
        for l in confidence_lines(&frame.confidence) {
            self.put(&l);
        }
        let described: Vec<&Alternative> = alternatives.iter().filter(|a| a.kind.is_some()).collect();
        if !described.is_empty() {
            self.put("Alternatives");
            for alt in described {
                self.put(&format!(
                    "  {:<13} lap {:>4}  risk {:<7} {}",
                    alt.kind.as_deref().unwrap_or_default(),
                    alt.lap,
                    alt.risk_level.as_deref().unwrap_or("-"),
                    alt.advantage.as_deref().unwrap_or(""),
                ));
            }
        }
    }

    fn notice(&mut self, message: &str) {
        self.put(&format!("! {}", message));
    }

    fn line(&mut self, text: &str) {
        self.put(text);
    }

    fn prompt(&mut self, notice: Option<&str>) {
        let _ = match notice {
            Some(message) => write!(self.out, "pitwall (! {})> ", message),
            None => write!(self.out, "pitwall> "),
        };
        let _ = self.out.flush();
    }
}
