use std::time::Duration;

use tokio::time::timeout;

use crate::error::ConnectivityError;
use crate::logging::log_health;
use crate::service::PredictionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Reachable,
    Unreachable,
}

/// What the status dot and its label should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    pub state: ConnectivityState,
    pub color: &'static str,
    pub label: &'static str,
}

impl StatusIndicator {
    pub fn for_state(state: ConnectivityState) -> Self {
        match state {
            ConnectivityState::Reachable => Self { state, color: "#27ae60", label: "API Connected" },
            ConnectivityState::Unreachable => Self { state, color: "#e74c3c", label: "API Disconnected" },
        }
    }
}

/// One-shot liveness check. The first `run` probes; later calls return the
/// recorded state without touching the network.
#[derive(Debug)]
pub struct StatusMonitor {
    timeout: Duration,
    state: Option<ConnectivityState>,
    last_error: Option<ConnectivityError>,
}

impl StatusMonitor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, state: None, last_error: None }
    }

    pub fn state(&self) -> Option<ConnectivityState> {
        self.state
    }

    pub fn error(&self) -> Option<&ConnectivityError> {
        self.last_error.as_ref()
    }

    pub fn indicator(&self) -> Option<StatusIndicator> {
        self.state.map(StatusIndicator::for_state)
    }

    pub async fn run(&mut self, service: &(dyn PredictionService + Send + Sync)) -> ConnectivityState {
        if let Some(state) = self.state {
            return state;
        }
        let outcome = match timeout(self.timeout, service.health()).await {
            Ok(res) => res,
            Err(_) => Err(ConnectivityError::Timeout(self.timeout)),
        };
        let state = match outcome {
            Ok(health) => {
                log_health(true, &health.status);
                ConnectivityState::Reachable
            }
            Err(err) => {
                log_health(false, &err.to_string());
                self.last_error = Some(err);
                ConnectivityState::Unreachable
            }
        };
        self.state = Some(state);
        state
    }
}
