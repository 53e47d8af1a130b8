//! Session context: one status monitor, one orchestrator, one form, driven
//! by line commands.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::config::Config;
use crate::form::{field_names, FormState};
use crate::history::{ExportSink, FileExport};
use crate::lifecycle::CancelToken;
use crate::model::ModelVariant;
use crate::orchestrator::{RequestOrchestrator, SubmitOutcome};
use crate::reference::{DRIVER_CODES, RACE_NAMES};
use crate::render::display_number;
use crate::service::PredictionService;
use crate::status::{ConnectivityState, StatusMonitor};
use crate::ui::RenderTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { field: String, value: String },
    Model(ModelVariant),
    Form,
    Submit,
    History,
    Export,
    Drivers,
    Races,
    Info,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((h, r)) => (h, r.trim()),
            None => (line, ""),
        };
        match head {
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "usage: set <field> <value>".to_string())?;
                Ok(Command::Set { field: field.to_string(), value: value.trim().to_string() })
            }
            "model" => rest.parse().map(Command::Model),
            "form" => Ok(Command::Form),
            "submit" | "predict" => Ok(Command::Submit),
            "history" => Ok(Command::History),
            "export" => Ok(Command::Export),
            "drivers" => Ok(Command::Drivers),
            "races" => Ok(Command::Races),
            "info" => Ok(Command::Info),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command: {} (try help)", other)),
        }
    }
}

const HELP: &str = "\
commands:
  set <field> <value>   change a form field
  model single|multi    switch model variant
  form                  show form values
  submit                request a prediction (Ctrl-C cancels)
  history               list this session's predictions
  export                save history as JSON
  drivers | races       list valid values
  info                  service model status
  quit";

pub struct Dashboard {
    service: Arc<dyn PredictionService + Send + Sync>,
    status: StatusMonitor,
    orchestrator: RequestOrchestrator,
    form: FormState,
    export: Box<dyn ExportSink + Send + Sync>,
}

impl Dashboard {
    pub fn new(service: Arc<dyn PredictionService + Send + Sync>, cfg: &Config) -> Self {
        Self {
            status: StatusMonitor::new(Duration::from_millis(cfg.health_timeout_ms)),
            orchestrator: RequestOrchestrator::new(Arc::clone(&service), cfg),
            form: FormState::default(),
            export: Box::new(FileExport::new(&cfg.export_dir)),
            service,
        }
    }

    pub fn with_export(mut self, sink: Box<dyn ExportSink + Send + Sync>) -> Self {
        self.export = sink;
        self
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    pub fn connectivity(&self) -> Option<ConnectivityState> {
        self.status.state()
    }

    /// Startup: one health probe, then the initial badge.
    pub async fn start(&mut self, target: &mut dyn RenderTarget) {
        self.status.run(self.service.as_ref()).await;
        if let Some(indicator) = self.status.indicator() {
            target.status(&indicator);
        }
        if let Some(err) = self.status.error() {
            target.line(&format!("  ({})", err));
        }
        target.model_badge(self.orchestrator.model().label());
    }

    /// Hands the prompt to `target` along with whatever request notice has not
    /// been dismissed yet.
    pub fn prompt(&self, target: &mut dyn RenderTarget) {
        target.prompt(self.orchestrator.notifier().message().as_deref());
    }

    /// Reads commands from `input` until `quit`, end of input, or an
    /// interrupt at the prompt. An interrupt while a command runs cancels
    /// that command's request and the session continues.
    pub async fn run_session<R, F, Fut>(
        &mut self,
        input: R,
        target: &mut dyn RenderTarget,
        mut interrupt: F,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut lines = input.lines();
        loop {
            self.prompt(target);
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = interrupt() => None,
            };
            let Some(line) = line else { break };

            let cmd = match Command::parse(&line) {
                Ok(cmd) => cmd,
                Err(err) => {
                    if !line.trim().is_empty() {
                        target.notice(&err);
                    }
                    continue;
                }
            };

            let cancel = CancelToken::new();
            let keep_going = {
                let run = self.execute(cmd, &cancel, target);
                tokio::pin!(run);
                loop {
                    tokio::select! {
                        keep = &mut run => break keep,
                        _ = interrupt() => cancel.cancel(),
                    }
                }
            };
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Runs one command. Returns `false` when the session should end.
    pub async fn execute(&mut self, cmd: Command, cancel: &CancelToken, target: &mut dyn RenderTarget) -> bool {
        match cmd {
            Command::Set { field, value } => match self.form.set(&field, &value) {
                Ok(()) => target.line(&format!("{} = {}", field, value)),
                Err(err) => target.notice(&err.to_string()),
            },
            Command::Model(model) => {
                self.orchestrator.select_model(model);
                target.model_badge(model.label());
            }
            Command::Form => {
                for (field, value) in self.form.fields() {
                    target.line(&format!("  {:<17}{}", field, value));
                }
                target.line(&format!("  {:<17}{}", "model_type", self.orchestrator.model()));
            }
            Command::Submit => {
                target.busy(true);
                let outcome = self.orchestrator.submit(&self.form, cancel).await;
                target.busy(self.orchestrator.is_busy());
                match outcome {
                    SubmitOutcome::Rendered(frame) => {
                        let alternatives = self
                            .orchestrator
                            .history()
                            .entries()
                            .last()
                            .map(|e| e.result.alternatives.clone())
                            .unwrap_or_default();
                        target.frame(&frame, &alternatives);
                    }
                    SubmitOutcome::Failed(_) => {
                        if let Some(message) = self.orchestrator.notifier().message() {
                            target.notice(&message);
                        }
                    }
                    SubmitOutcome::Busy => target.notice("a prediction is already in flight"),
                }
            }
            Command::History => {
                let history = self.orchestrator.history();
                if history.is_empty() {
                    target.line("no predictions yet");
                }
                for (i, e) in history.entries().iter().enumerate() {
                    target.line(&format!(
                        "  {:>3}  {}  {} {} {} lap {} -> pit lap {} ({:.1}%)",
                        i + 1,
                        e.timestamp.format("%b %d %H:%M"),
                        e.request.driver,
                        e.request.race_name,
                        e.request.compound,
                        e.request.tyre_life,
                        display_number(e.result.optimal_lap),
                        crate::render::confidence_percent(e.result.confidence),
                    ));
                }
            }
            Command::Export => {
                match self.orchestrator.export_to(self.export.as_ref()) {
                    Ok(path) => target.line(&format!(
                        "exported {} predictions to {}",
                        self.orchestrator.history().len(),
                        path.display()
                    )),
                    Err(err) => target.notice(&err.to_string()),
                }
            }
            Command::Drivers => target.line(&DRIVER_CODES.join(" ")),
            Command::Races => {
                for (i, race) in RACE_NAMES.iter().enumerate() {
                    target.line(&format!("  {:>2}  {}", i + 1, race));
                }
            }
            Command::Info => match self.service.info().await {
                Ok(info) => {
                    target.line(&format!("{}: {}", info.status, info.message));
                    for (model, loaded) in &info.models_loaded {
                        target.line(&format!("  {:<12}{}", model, loaded));
                    }
                }
                Err(err) => target.notice(&err.to_string()),
            },
            Command::Help => {
                target.line(HELP);
                target.line(&format!("fields: {}", field_names().collect::<Vec<_>>().join(", ")));
            }
            Command::Quit => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(
            Command::parse("set race_name  Monaco Grand Prix").unwrap(),
            Command::Set { field: "race_name".into(), value: "Monaco Grand Prix".into() }
        );
        assert_eq!(Command::parse("model multi").unwrap(), Command::Model(ModelVariant::Multi));
        assert_eq!(Command::parse("  submit ").unwrap(), Command::Submit);
        assert!(Command::parse("set position").is_err());
        assert!(Command::parse("model both").is_err());
        assert!(Command::parse("fly").unwrap_err().contains("unknown command"));
    }
}
