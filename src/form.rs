//! Raw form values and the constraints the input widgets enforce.
//!
//! `set` plays the role of the widgets (range and choice limits); `assemble`
//! is what happens on submit and only requires every number to parse.

use crate::error::FormError;
use crate::model::{ModelVariant, PredictionRequest};
use crate::reference::{COMPOUNDS, DRIVER_CODES, RACE_NAMES};

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Int { min: i64, max: i64 },
    Float { min: f64, max: f64 },
    Choice(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
}

const FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "driver", kind: FieldKind::Choice(DRIVER_CODES) },
    FieldSpec { name: "race_name", kind: FieldKind::Choice(RACE_NAMES) },
    FieldSpec { name: "position", kind: FieldKind::Int { min: 1, max: 20 } },
    FieldSpec { name: "stint", kind: FieldKind::Int { min: 1, max: 5 } },
    FieldSpec { name: "tyre_life", kind: FieldKind::Int { min: 1, max: 50 } },
    FieldSpec { name: "compound", kind: FieldKind::Choice(COMPOUNDS) },
    FieldSpec { name: "fresh_tyre", kind: FieldKind::Int { min: 0, max: 1 } },
    FieldSpec { name: "speed_fl", kind: FieldKind::Float { min: 0.0, max: 400.0 } },
    FieldSpec { name: "lap_time_seconds", kind: FieldKind::Float { min: 60.0, max: 200.0 } },
    FieldSpec { name: "race_round", kind: FieldKind::Int { min: 1, max: 24 } },
    FieldSpec { name: "year", kind: FieldKind::Int { min: 2020, max: 2025 } },
];

pub fn field_names() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|f| f.name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: Vec<(&'static str, String)>,
}

impl Default for FormState {
    fn default() -> Self {
        let defaults = [
            ("driver", "VER"),
            ("race_name", "Monaco Grand Prix"),
            ("position", "1"),
            ("stint", "2"),
            ("tyre_life", "10"),
            ("compound", "SOFT"),
            ("fresh_tyre", "1"),
            ("speed_fl", "310.5"),
            ("lap_time_seconds", "78.234"),
            ("race_round", "8"),
            ("year", "2024"),
        ];
        Self { values: defaults.iter().map(|(k, v)| (*k, v.to_string())).collect() }
    }
}

impl FormState {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.iter().find(|(k, _)| *k == field).map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Stores `value` if it passes the widget constraints of `field`.
    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let spec = FIELDS
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        let value = value.trim();
        match spec.kind {
            FieldKind::Int { min, max } => {
                let n = parse_int(spec.name, value)?;
                if n < min || n > max {
                    return Err(FormError::OutOfRange { field: spec.name, min: min as f64, max: max as f64, value: n as f64 });
                }
            }
            FieldKind::Float { min, max } => {
                let n = parse_float(spec.name, value)?;
                if n < min || n > max {
                    return Err(FormError::OutOfRange { field: spec.name, min, max, value: n });
                }
            }
            FieldKind::Choice(allowed) => {
                if !allowed.contains(&value) {
                    return Err(FormError::NotAllowed {
                        field: spec.name,
                        allowed: allowed.join(", "),
                        value: value.to_string(),
                    });
                }
            }
        }
        self.put(spec.name, value);
        Ok(())
    }

    /// Writes a raw value with no constraint check, as a script could.
    pub fn set_raw(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let spec = FIELDS
            .iter()
            .find(|f| f.name == field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;
        self.put(spec.name, value);
        Ok(())
    }

    fn put(&mut self, name: &'static str, value: &str) {
        match self.values.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.values.push((name, value.to_string())),
        }
    }

    fn text(&self, field: &'static str) -> String {
        self.get(field).unwrap_or_default().to_string()
    }

    fn int(&self, field: &'static str) -> Result<i64, FormError> {
        parse_int(field, self.get(field).unwrap_or_default())
    }

    fn float(&self, field: &'static str) -> Result<f64, FormError> {
        parse_float(field, self.get(field).unwrap_or_default())
    }

    /// Builds the request body. Incident flags are always sent unset.
    pub fn assemble(&self, model_type: ModelVariant) -> Result<PredictionRequest, FormError> {
        Ok(PredictionRequest {
            driver: self.text("driver"),
            race_name: self.text("race_name"),
            position: self.int("position")?,
            stint: self.int("stint")?,
            tyre_life: self.int("tyre_life")?,
            compound: self.text("compound"),
            fresh_tyre: self.int("fresh_tyre")?,
            speed_fl: self.float("speed_fl")?,
            lap_time_seconds: self.float("lap_time_seconds")?,
            race_round: self.int("race_round")?,
            year: self.int("year")?,
            has_safety_car: 0,
            has_vsc: 0,
            has_red_flag: 0,
            has_yellow: 0,
            model_type,
        })
    }
}

fn parse_int(field: &'static str, raw: &str) -> Result<i64, FormError> {
    raw.trim().parse().map_err(|_| FormError::NotANumber { field, value: raw.to_string() })
}

fn parse_float(field: &'static str, raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormError::NotANumber { field, value: raw.to_string() })
}
