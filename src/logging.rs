//! Structured JSON-lines logging for the dashboard.
//!
//! Every record carries a run id, a sequence number and a domain so a session
//! can be filtered and replayed from the log alone. Console copies go to
//! stderr; `LOG_DIR` additionally persists them per run.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use crate::model::{PredictionRequest, PredictionResult};

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            Ok("fatal") => Level::Fatal,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Status,  // Health probe, connectivity indicator
    Request, // Prediction submit/outcome
    History, // Session log, export
    Render,  // Panel and chart updates
    Notice,  // Transient error notices
    System,  // Startup, shutdown
    Profile, // Timings
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Status => "status",
            Domain::Request => "request",
            Domain::History => "history",
            Domain::Render => "render",
            Domain::Notice => "notice",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    pub fn is_enabled(&self) -> bool {
        // LOG_DOMAINS: comma-separated list or "all"
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

#[derive(Debug)]
struct RunSink {
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

#[derive(Debug)]
struct RunContext {
    run_id: String,
    sink: Option<RunSink>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let sink = std::env::var("LOG_DIR").ok().and_then(|base| open_sink(&base, &run_id));
        RunContext { run_id, sink }
    })
}

fn open_sink(base: &str, run_id: &str) -> Option<RunSink> {
    let mut run_dir = PathBuf::from(base);
    run_dir.push(run_id);
    if let Err(err) = create_dir_all(&run_dir) {
        eprintln!("[log] failed to create run dir: {}", err);
        return None;
    }
    let _ = std::fs::write(
        run_dir.join("manifest.json"),
        json!({
            "run_id": run_id,
            "ts": ts_now(),
            "pid": process::id(),
            "log_dir": run_dir.to_string_lossy(),
        })
        .to_string(),
    );
    let open = |name: &str| match File::create(run_dir.join(name)) {
        Ok(f) => Some(Mutex::new(BufWriter::new(f))),
        Err(err) => {
            eprintln!("[log] failed to create {}: {}", name, err);
            None
        }
    };
    Some(RunSink { events: open("events.jsonl")?, trace: open("trace.jsonl")? })
}

fn write_line(writer: &Mutex<BufWriter<File>>, line: &str) {
    if let Ok(mut w) = writer.lock() {
        let _ = writeln!(w, "{}", line);
        let _ = w.flush();
    }
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Epoch milliseconds
pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }
    emit_record(level, domain.as_str(), event, fields);
}

fn build_record(level: Level, component: &str, event: &str, mut fields: Map<String, Value>) -> Value {
    let ctx = ensure_run_context();
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(component));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry)
}

fn emit_record(level: Level, component: &str, event: &str, fields: Map<String, Value>) {
    let line = build_record(level, component, event, fields).to_string();
    if let Some(sink) = &ensure_run_context().sink {
        match level {
            Level::Trace | Level::Debug => write_line(&sink.trace, &line),
            _ => write_line(&sink.events, &line),
        }
    }
    eprintln!("{}", line);
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_health(reachable: bool, detail: &str) {
    let level = if reachable { Level::Info } else { Level::Error };
    log(
        level,
        Domain::Status,
        "health",
        obj(&[
            ("reachable", json!(reachable)),
            ("msg", v_str(if reachable { "API Connected" } else { "API Connection Failed" })),
            ("detail", v_str(detail)),
        ]),
    );
}

pub fn log_submit(request: &PredictionRequest) {
    log(
        Level::Info,
        Domain::Request,
        "submit",
        obj(&[
            ("msg", v_str("Sending prediction request")),
            ("request", serde_json::to_value(request).unwrap_or(Value::Null)),
        ]),
    );
}

pub fn log_prediction(result: &PredictionResult) {
    log(
        Level::Info,
        Domain::Request,
        "prediction",
        obj(&[
            ("msg", v_str("Prediction received")),
            ("optimal_lap", v_num(result.optimal_lap)),
            ("confidence", v_num(result.confidence)),
            ("model_used", v_str(&result.model_used)),
        ]),
    );
}

pub fn log_request_failed(error: &str) {
    log(
        Level::Error,
        Domain::Request,
        "prediction_failed",
        obj(&[("msg", v_str("Prediction failed")), ("error", v_str(error))]),
    );
}

pub fn log_notice(message: &str, visible: bool) {
    log(
        Level::Debug,
        Domain::Notice,
        if visible { "notice_shown" } else { "notice_dismissed" },
        obj(&[("text", v_str(message))]),
    );
}

pub fn log_export(path: &str, entries: usize) {
    log(
        Level::Info,
        Domain::History,
        "export",
        obj(&[("path", v_str(path)), ("entries", json!(entries))]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits the elapsed time of a scope on drop.
pub struct ProfileScope {
    label: &'static str,
    context: Map<String, Value>,
    started: Instant,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        Self { label, context: obj(fields), started: Instant::now() }
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut fields = std::mem::take(&mut self.context);
        fields.insert("label".to_string(), v_str(self.label));
        fields.insert("elapsed_ms".to_string(), v_num(elapsed_ms));
        log(Level::Trace, Domain::Profile, "profile", fields);
    }
}

// =============================================================================
// Tests
// =============================================================================
