//! Submit-to-result lifecycle.
//!
//! ```text
//!  submit ──► acquire busy ──► assemble ──► POST /predict ──┬─► history + redraw
//!                                             (timeout,     │
//!                                              cancel)      └─► notice
//!                              release busy ◄───────────────┘
//! ```
//!
//! Every failure is caught here and turned into one notice; nothing escapes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::time::timeout;

use crate::config::Config;
use crate::error::RequestError;
use crate::form::FormState;
use crate::history::{ExportSink, HistoryLog, HistorySnapshot};
use crate::lifecycle::{CancelToken, SubmitControl};
use crate::logging::{log_prediction, log_request_failed, log_submit, v_str, ProfileScope};
use crate::model::{ModelVariant, PredictionRequest, PredictionResult};
use crate::notice::Notifier;
use crate::render::{ConfidenceChart, RenderFrame, StrategyChart, VisualizationSynchronizer};
use crate::service::PredictionService;

#[derive(Debug)]
pub enum SubmitOutcome {
    Rendered(RenderFrame),
    Failed(RequestError),
    /// A request was already in flight; nothing was sent.
    Busy,
}

/// Snapshot of the transient dashboard state.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub model: ModelVariant,
    pub busy: bool,
    pub strategy: StrategyChart,
    pub confidence: ConfidenceChart,
    pub notice: Option<String>,
}

pub struct RequestOrchestrator {
    service: Arc<dyn PredictionService + Send + Sync>,
    control: SubmitControl,
    history: HistoryLog,
    sync: VisualizationSynchronizer,
    notifier: Notifier,
    model: ModelVariant,
    request_timeout: Duration,
}

impl RequestOrchestrator {
    pub fn new(service: Arc<dyn PredictionService + Send + Sync>, cfg: &Config) -> Self {
        Self {
            service,
            control: SubmitControl::new(),
            history: HistoryLog::new(),
            sync: VisualizationSynchronizer::new(),
            notifier: Notifier::new(Duration::from_millis(cfg.notice_dismiss_ms), cfg.notice_policy),
            model: cfg.default_model,
            request_timeout: Duration::from_millis(cfg.request_timeout_ms),
        }
    }

    pub fn model(&self) -> ModelVariant {
        self.model
    }

    pub fn select_model(&mut self, model: ModelVariant) {
        self.model = model;
    }

    /// Handle on the busy flag, for whatever draws the submit button.
    pub fn submit_control(&self) -> SubmitControl {
        self.control.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.control.is_busy()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn visuals(&self) -> &VisualizationSynchronizer {
        &self.sync
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            model: self.model,
            busy: self.control.is_busy(),
            strategy: self.sync.strategy().clone(),
            confidence: *self.sync.confidence(),
            notice: self.notifier.message(),
        }
    }

    pub async fn submit(&mut self, form: &FormState, cancel: &CancelToken) -> SubmitOutcome {
        let Some(_busy) = self.control.try_acquire() else {
            return SubmitOutcome::Busy;
        };

        match self.round_trip(form, cancel).await {
            Ok((request, result)) => {
                self.history.record(request, result.clone(), Utc::now());
                SubmitOutcome::Rendered(self.sync.apply(&result))
            }
            Err(err) => {
                log_request_failed(&err.to_string());
                self.notifier.notify(err.to_string());
                SubmitOutcome::Failed(err)
            }
        }
    }

    async fn round_trip(
        &self,
        form: &FormState,
        cancel: &CancelToken,
    ) -> Result<(PredictionRequest, PredictionResult), RequestError> {
        let request = form.assemble(self.model)?;
        log_submit(&request);

        let result = {
            let _profile = ProfileScope::with_context(
                "predict",
                &[("model_type", v_str(request.model_type.as_str())), ("driver", json!(request.driver))],
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(RequestError::Cancelled),
                res = timeout(self.request_timeout, self.service.predict(&request)) => {
                    res.map_err(|_| RequestError::Timeout(self.request_timeout))??
                }
            }
        };

        result.check_renderable().map_err(RequestError::InvalidResult)?;
        log_prediction(&result);
        Ok((request, result))
    }

    pub fn export(&self) -> HistorySnapshot {
        self.history.export()
    }

    pub fn export_to(&self, sink: &dyn ExportSink) -> Result<std::path::PathBuf, crate::error::ExportError> {
        sink.save(&self.history.export(), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectivityError;
    use crate::model::{Alternative, HealthStatus, ServiceInfo};
    use std::sync::Mutex;

    /// Replays canned replies and records what the busy flag read during each call.
    struct Scripted {
        replies: Mutex<Vec<Result<PredictionResult, RequestError>>>,
        sent: Mutex<Vec<PredictionRequest>>,
        busy_seen: Mutex<Vec<bool>>,
        control: Mutex<Option<SubmitControl>>,
        delay: Duration,
    }

    impl Scripted {
        fn new(replies: Vec<Result<PredictionResult, RequestError>>) -> Arc<Self> {
            Self::slow(replies, Duration::ZERO)
        }

        fn slow(mut replies: Vec<Result<PredictionResult, RequestError>>, delay: Duration) -> Arc<Self> {
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                sent: Mutex::new(Vec::new()),
                busy_seen: Mutex::new(Vec::new()),
                control: Mutex::new(None),
                delay,
            })
        }
    }

    #[async_trait::async_trait]
    impl PredictionService for Scripted {
        async fn health(&self) -> Result<HealthStatus, ConnectivityError> {
            Ok(HealthStatus { status: "healthy".into() })
        }

        async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, RequestError> {
            self.sent.lock().unwrap().push(request.clone());
            let busy = self.control.lock().unwrap().as_ref().map(|c| c.is_busy()).unwrap_or(false);
            self.busy_seen.lock().unwrap().push(busy);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.replies.lock().unwrap().pop().unwrap_or(Err(RequestError::Transport("no reply scripted".into())))
        }

        async fn info(&self) -> anyhow::Result<ServiceInfo> {
            anyhow::bail!("unused")
        }
    }

    fn monaco() -> PredictionResult {
        PredictionResult {
            optimal_lap: 34.0,
            confidence: 0.87,
            mae: 1.2,
            prediction_lower: 32.0,
            prediction_upper: 36.0,
            model_used: "single".into(),
            alternatives: vec![Alternative::at(30.0), Alternative::at(34.0), Alternative::at(38.0)],
            input_summary: None,
        }
    }

    fn orchestrator(svc: &Arc<Scripted>) -> RequestOrchestrator {
        let cfg = Config::with_base("http://127.0.0.1:9").unwrap();
        let orch = RequestOrchestrator::new(svc.clone(), &cfg);
        *svc.control.lock().unwrap() = Some(orch.submit_control());
        orch
    }

    #[tokio::test]
    async fn success_records_and_renders() {
        let svc = Scripted::new(vec![Ok(monaco())]);
        let mut orch = orchestrator(&svc);
        let form = FormState::default();

        let outcome = orch.submit(&form, &CancelToken::new()).await;
        let SubmitOutcome::Rendered(frame) = outcome else { panic!("expected a rendered frame") };

        assert_eq!(frame.panel.optimal_lap, "34");
        assert_eq!(frame.panel.confidence, "87.0%");
        assert_eq!(frame.strategy.values, [Some(30.0), Some(34.0), Some(38.0)]);
        assert_eq!(frame.confidence.values(), [87.0, 13.0]);

        assert_eq!(orch.history().len(), 1);
        let entry = &orch.history().entries()[0];
        assert_eq!(entry.request, svc.sent.lock().unwrap()[0]);
        assert_eq!(entry.result, monaco());
        assert!(!orch.is_busy());
        assert_eq!(*svc.busy_seen.lock().unwrap(), vec![true]);
    }

    #[tokio::test]
    async fn status_failure_notifies_without_history() {
        let svc = Scripted::new(vec![Err(RequestError::Status("Internal Server Error".into()))]);
        let mut orch = orchestrator(&svc);

        let outcome = orch.submit(&FormState::default(), &CancelToken::new()).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(RequestError::Status(_))));
        assert_eq!(orch.history().len(), 0);
        assert!(!orch.is_busy());
        assert_eq!(orch.ui_state().notice.as_deref(), Some("API Error: Internal Server Error"));
    }

    #[tokio::test]
    async fn unparseable_form_never_reaches_service() {
        let svc = Scripted::new(vec![Ok(monaco())]);
        let mut orch = orchestrator(&svc);
        let mut form = FormState::default();
        form.set_raw("tyre_life", "ten").unwrap();

        let outcome = orch.submit(&form, &CancelToken::new()).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(RequestError::Form(_))));
        assert!(svc.sent.lock().unwrap().is_empty());
        assert!(!orch.is_busy());
    }

    #[tokio::test]
    async fn invalid_result_is_a_request_error() {
        let mut bad = monaco();
        bad.mae = f64::INFINITY;
        let svc = Scripted::new(vec![Err(RequestError::Decode("expected value".into())), Ok(bad)]);
        let mut orch = orchestrator(&svc);

        let first = orch.submit(&FormState::default(), &CancelToken::new()).await;
        assert!(matches!(first, SubmitOutcome::Failed(RequestError::Decode(_))));
        let second = orch.submit(&FormState::default(), &CancelToken::new()).await;
        assert!(matches!(second, SubmitOutcome::Failed(RequestError::InvalidResult(_))));
        assert_eq!(orch.history().len(), 0);
        // charts untouched by failures
        assert_eq!(orch.ui_state().confidence.values(), [0.0, 100.0]);
    }

    #[tokio::test]
    async fn out_of_range_confidence_still_renders() {
        let mut odd = monaco();
        odd.confidence = 1.02;
        odd.model_used = "multi-year".into();
        let svc = Scripted::new(vec![Ok(odd)]);
        let mut orch = orchestrator(&svc);

        let SubmitOutcome::Rendered(frame) = orch.submit(&FormState::default(), &CancelToken::new()).await else {
            panic!("expected a rendered frame")
        };
        assert_eq!(frame.panel.confidence, "102.0%");
        assert_eq!(frame.panel.model, "Multi Season");
        assert_eq!(frame.confidence.values(), [102.0, -2.0]);
        assert_eq!(orch.history().len(), 1);
        assert!(orch.ui_state().notice.is_none());
    }

    #[tokio::test]
    async fn selected_model_is_sent() {
        let svc = Scripted::new(vec![Ok(monaco())]);
        let mut orch = orchestrator(&svc);
        orch.select_model(ModelVariant::Multi);
        orch.submit(&FormState::default(), &CancelToken::new()).await;
        assert_eq!(svc.sent.lock().unwrap()[0].model_type, ModelVariant::Multi);
        assert_eq!(orch.ui_state().model, ModelVariant::Multi);
    }

    #[tokio::test]
    async fn busy_control_rejects_submit() {
        let svc = Scripted::new(vec![Ok(monaco())]);
        let mut orch = orchestrator(&svc);
        let held = orch.submit_control().try_acquire().unwrap();
        assert!(matches!(orch.submit(&FormState::default(), &CancelToken::new()).await, SubmitOutcome::Busy));
        drop(held);
        assert!(svc.sent.lock().unwrap().is_empty());
        assert!(matches!(orch.submit(&FormState::default(), &CancelToken::new()).await, SubmitOutcome::Rendered(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_times_out_and_goes_idle() {
        let svc = Scripted::slow(vec![Ok(monaco())], Duration::from_secs(3600));
        let mut orch = orchestrator(&svc);

        let outcome = orch.submit(&FormState::default(), &CancelToken::new()).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(RequestError::Timeout(_))));
        assert!(!orch.is_busy());
        assert_eq!(orch.history().len(), 0);
        assert!(orch.ui_state().notice.unwrap().starts_with("Request timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_releases_busy() {
        let svc = Scripted::slow(vec![Ok(monaco())], Duration::from_secs(10));
        let mut orch = orchestrator(&svc);
        let token = CancelToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let outcome = orch.submit(&FormState::default(), &token).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(RequestError::Cancelled)));
        assert!(!orch.is_busy());
        assert_eq!(orch.history().len(), 0);
    }

    #[tokio::test]
    async fn history_grows_once_per_success() {
        let svc = Scripted::new(vec![
            Ok(monaco()),
            Err(RequestError::Transport("connection refused".into())),
            Ok(monaco()),
        ]);
        let mut orch = orchestrator(&svc);
        let form = FormState::default();
        let mut lens = Vec::new();
        for _ in 0..3 {
            orch.submit(&form, &CancelToken::new()).await;
            lens.push(orch.history().len());
        }
        assert_eq!(lens, vec![1, 1, 2]);
        assert_eq!(orch.export().entries.len(), 2);
    }
}
