use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::logging::log_notice;

/// What happens to a pending dismissal when a newer notice replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DismissPolicy {
    /// Abort the pending timer and start a fresh one for the new notice.
    #[default]
    Reschedule,
    /// Every notice's timer fires on its own; an older timer may dismiss a
    /// newer notice early.
    Independent,
}

impl FromStr for DismissPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reschedule" => Ok(DismissPolicy::Reschedule),
            "independent" => Ok(DismissPolicy::Independent),
            other => Err(format!("unknown notice policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub message: String,
}

/// Single-slot transient notice. A new notice pre-empts the visible one.
#[derive(Debug)]
pub struct Notifier {
    visible: Arc<Mutex<Option<Notice>>>,
    pending: Option<JoinHandle<()>>,
    dismiss_after: Duration,
    policy: DismissPolicy,
    next_id: u64,
}

impl Notifier {
    pub fn new(dismiss_after: Duration, policy: DismissPolicy) -> Self {
        Self {
            visible: Arc::new(Mutex::new(None)),
            pending: None,
            dismiss_after,
            policy,
            next_id: 0,
        }
    }

    /// Shows `message` now and schedules its dismissal. Must run inside a
    /// tokio runtime.
    pub fn notify(&mut self, message: impl Into<String>) {
        let notice = Notice { id: self.next_id, message: message.into() };
        self.next_id += 1;
        log_notice(&notice.message, true);

        if let Ok(mut slot) = self.visible.lock() {
            *slot = Some(notice.clone());
        }

        if self.policy == DismissPolicy::Reschedule {
            if let Some(handle) = self.pending.take() {
                handle.abort();
            }
        }

        let visible = Arc::clone(&self.visible);
        let delay = self.dismiss_after;
        let policy = self.policy;
        // Under Independent a replaced handle is dropped, which detaches the task.
        self.pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            if let Ok(mut slot) = visible.lock() {
                let owned = match policy {
                    DismissPolicy::Reschedule => slot.as_ref().map(|n| n.id) == Some(notice.id),
                    DismissPolicy::Independent => slot.is_some(),
                };
                if owned {
                    if let Some(gone) = slot.take() {
                        log_notice(&gone.message, false);
                    }
                }
            }
        }));
    }

    pub fn visible(&self) -> Option<Notice> {
        self.visible.lock().ok().and_then(|slot| slot.clone())
    }

    pub fn message(&self) -> Option<String> {
        self.visible().map(|n| n.message)
    }

    pub fn dismiss(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        if let Ok(mut slot) = self.visible.lock() {
            slot.take();
        }
    }
}
