//! Command dispatcher - resolves, runs and flushes every line

use super::handlers::{self, Builtin, BuiltinCommand, HandlerContext, TagScheduler};
use super::registry::{CommandHandler, CommandRegistry};
use super::CommandError;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use joycontrol_shared::{codec, defaults, Command, DeviceError, DeviceState};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Where a command name leads
#[derive(Clone)]
enum Route {
    Builtin(Builtin),
    Extension(Arc<dyn CommandHandler>),
}

/// Turns protocol lines into device state changes
///
/// Built-in commands and registry extensions are merged into one route
/// table at construction. A built-in always wins over an extension of the
/// same name.
pub struct CommandDispatcher {
    ctx: HandlerContext,
    routes: HashMap<String, Route>,
    sink: Arc<dyn DiagnosticSink>,
}

impl CommandDispatcher {
    /// Create a dispatcher over a device, the host's extensions and a sink
    pub fn new(
        device: Arc<dyn DeviceState>,
        registry: CommandRegistry,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let mut routes: HashMap<String, Route> = HashMap::new();

        for name in registry.names() {
            if let Some(handler) = registry.lookup(name) {
                routes.insert(name.to_string(), Route::Extension(handler));
            }
        }
        for builtin in Builtin::ALL {
            if routes
                .insert(builtin.name().to_string(), Route::Builtin(builtin))
                .is_some()
            {
                warn!(
                    "Extension command \"{}\" is shadowed by the built-in",
                    builtin.name()
                );
            }
        }

        Self {
            ctx: HandlerContext {
                device,
                tags: Arc::new(TagScheduler::new()),
                nfc_clear_delay: defaults::NFC_CLEAR_DELAY,
            },
            routes,
            sink,
        }
    }

    /// Set the default NFC auto-clear delay
    pub fn with_nfc_clear_delay(mut self, delay: Duration) -> Self {
        self.ctx.nfc_clear_delay = delay;
        self
    }

    pub fn device(&self) -> &Arc<dyn DeviceState> {
        &self.ctx.device
    }

    /// Handle one protocol line
    ///
    /// Empty lines are ignored. Everything else is parsed, run and followed
    /// by a flush; only a lost device link is returned as an error.
    pub async fn handle_line(&self, line: &str) -> Result<(), DeviceError> {
        if line.is_empty() {
            return Ok(());
        }

        match codec::parse_line(line) {
            Ok(command) => self.dispatch(&command).await,
            Err(e) => {
                self.sink.report(Diagnostic::Failed {
                    command: String::new(),
                    message: CommandError::from(e).to_string(),
                });
                self.flush().await
            }
        }
    }

    /// Run a parsed command, report its outcome and flush
    pub async fn dispatch(&self, command: &Command) -> Result<(), DeviceError> {
        debug!("Dispatching {:?} {:?}", command.name, command.args);

        let diagnostic = match self.routes.get(&command.name) {
            Some(route) => match self.execute(route, command).await {
                Ok(Some(message)) if !message.is_empty() => Some(Diagnostic::Completed {
                    command: command.name.clone(),
                    message,
                }),
                Ok(_) => None,
                Err(e) => Some(Diagnostic::Failed {
                    command: command.name.clone(),
                    message: e.to_string(),
                }),
            },
            None => Some(Diagnostic::NotFound {
                command: command.name.clone(),
            }),
        };

        if let Some(diagnostic) = diagnostic {
            self.sink.report(diagnostic);
        }

        self.flush().await
    }

    async fn execute(&self, route: &Route, command: &Command) -> Result<Option<String>, CommandError> {
        match route {
            Route::Builtin(kind) => {
                let decoded = BuiltinCommand::decode(*kind, &command.args)?;
                handlers::execute(&self.ctx, &decoded).await
            }
            Route::Extension(handler) => Ok(handler.call(command.args.clone()).await?),
        }
    }

    async fn flush(&self) -> Result<(), DeviceError> {
        match self.ctx.device.send().await {
            Ok(()) => Ok(()),
            Err(DeviceError::NotConnected) => {
                self.sink.report(Diagnostic::ConnectionLost);
                Err(DeviceError::NotConnected)
            }
            Err(e) => {
                self.sink.report(Diagnostic::Failed {
                    command: "send".into(),
                    message: e.to_string(),
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;
    use async_trait::async_trait;
    use joycontrol_shared::{Button, Controller, ControllerState, StickSide};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Setup {
        dispatcher: CommandDispatcher,
        state: Arc<ControllerState>,
        sink: Arc<MemorySink>,
        link: tokio::sync::watch::Receiver<joycontrol_shared::InputReport>,
    }

    fn setup(controller: Controller, registry: CommandRegistry) -> Setup {
        let (state, link) = ControllerState::new(controller);
        let state = Arc::new(state);
        let sink = Arc::new(MemorySink::new());
        let dispatcher = CommandDispatcher::new(state.clone(), registry, sink.clone());
        Setup {
            dispatcher,
            state,
            sink,
            link,
        }
    }

    #[tokio::test]
    async fn test_hold_and_release_lines() {
        let s = setup(Controller::ProController, CommandRegistry::new());

        s.dispatcher.handle_line("btn:a:true").await.unwrap();
        assert!(s.state.is_pressed(Button::A));
        assert_eq!(s.state.reports_sent(), 1);

        s.dispatcher.handle_line("btn:a:false").await.unwrap();
        assert!(!s.state.is_pressed(Button::A));
        assert_eq!(s.state.reports_sent(), 2);
        assert!(s.sink.entries().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_line_is_not_found_and_flushed() {
        let s = setup(Controller::ProController, CommandRegistry::new());

        s.dispatcher.handle_line("foo:bar").await.unwrap();

        assert_eq!(
            s.sink.entries(),
            vec![Diagnostic::NotFound { command: String::new() }]
        );
        assert_eq!(s.state.reports_sent(), 1);
    }

    #[tokio::test]
    async fn test_empty_line_is_ignored() {
        let s = setup(Controller::ProController, CommandRegistry::new());

        s.dispatcher.handle_line("").await.unwrap();

        assert!(s.sink.entries().is_empty());
        assert_eq!(s.state.reports_sent(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_reported_and_flushed() {
        let s = setup(Controller::JoyconL, CommandRegistry::new());

        s.dispatcher.handle_line("btn:a:true").await.unwrap();
        s.dispatcher.handle_line("nfc:/tmp/whatever.bin").await.unwrap();
        s.dispatcher.handle_line("btn:a").await.unwrap();

        let entries = s.sink.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            Diagnostic::Failed {
                command: "hold".into(),
                message: "Button a does not exist on JOYCON_L".into(),
            }
        );
        assert_eq!(
            entries[1],
            Diagnostic::Failed {
                command: "nfc".into(),
                message: "NFC content cannot be set for JOYCON_L".into(),
            }
        );
        assert!(matches!(&entries[2], Diagnostic::Failed { command, .. } if command.is_empty()));
        assert_eq!(s.state.reports_sent(), 3);
    }

    #[tokio::test]
    async fn test_stick_result_is_reported() {
        let s = setup(Controller::ProController, CommandRegistry::new());

        s.dispatcher.handle_line("stick:r:up:true").await.unwrap();
        s.dispatcher.handle_line("cmd:stick r h 500").await.unwrap();

        assert_eq!(s.state.stick(StickSide::Right).h(), 500);
        assert_eq!(
            s.sink.entries()[1],
            Diagnostic::Completed {
                command: "stick".into(),
                message: "Right stick was set to (500, 3584).".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_lost_link_is_fatal() {
        let s = setup(Controller::ProController, CommandRegistry::new());
        drop(s.link);

        let result = s.dispatcher.handle_line("foo").await;

        assert_eq!(result, Err(DeviceError::NotConnected));
        let entries = s.sink.entries();
        assert_eq!(entries.last(), Some(&Diagnostic::ConnectionLost));
    }

    #[tokio::test]
    async fn test_other_send_errors_are_contained() {
        struct FlakyLink {
            inner: ControllerState,
        }

        #[async_trait]
        impl DeviceState for FlakyLink {
            fn controller(&self) -> Controller {
                self.inner.controller()
            }
            fn set_buttons(&self, buttons: &[Button], pressed: bool) {
                self.inner.set_buttons(buttons, pressed)
            }
            fn is_pressed(&self, button: Button) -> bool {
                self.inner.is_pressed(button)
            }
            fn stick(&self, side: StickSide) -> joycontrol_shared::StickState {
                self.inner.stick(side)
            }
            fn set_stick(&self, side: StickSide, stick: joycontrol_shared::StickState) {
                self.inner.set_stick(side, stick)
            }
            fn nfc(&self) -> Option<bytes::Bytes> {
                self.inner.nfc()
            }
            fn set_nfc(&self, payload: Option<bytes::Bytes>) {
                self.inner.set_nfc(payload)
            }
            async fn connect(&self) -> Result<(), DeviceError> {
                Ok(())
            }
            async fn send(&self) -> Result<(), DeviceError> {
                Err(DeviceError::Link("report queue full".into()))
            }
        }

        let (inner, _link) = ControllerState::new(Controller::ProController);
        let sink = Arc::new(MemorySink::new());
        let dispatcher = CommandDispatcher::new(
            Arc::new(FlakyLink { inner }),
            CommandRegistry::new(),
            sink.clone(),
        );

        assert!(dispatcher.handle_line("btn:b:true").await.is_ok());
        assert!(dispatcher.device().is_pressed(Button::B));
        assert_eq!(
            sink.entries(),
            vec![Diagnostic::Failed {
                command: "send".into(),
                message: "Device link error: report queue full".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_extension_commands() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut registry = CommandRegistry::new();
        registry
            .register("count", move |args: Vec<String>| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok::<_, anyhow::Error>(Some(format!("{} call(s), args {:?}", n, args)))
                }
            })
            .unwrap();
        registry
            .register("broken", |_args: Vec<String>| async {
                Err::<Option<String>, _>(anyhow::anyhow!("broken on purpose"))
            })
            .unwrap();

        let s = setup(Controller::ProController, registry);
        s.dispatcher.handle_line("cmd:count x").await.unwrap();
        s.dispatcher.handle_line("cmd:broken").await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            s.sink.entries(),
            vec![
                Diagnostic::Completed {
                    command: "count".into(),
                    message: "1 call(s), args [\"x\"]".into(),
                },
                Diagnostic::Failed {
                    command: "broken".into(),
                    message: "broken on purpose".into(),
                },
            ]
        );
        assert_eq!(s.state.reports_sent(), 2);
    }

    #[tokio::test]
    async fn test_builtin_wins_over_extension() {
        let mut registry = CommandRegistry::new();
        registry
            .register("hold", |_args: Vec<String>| async {
                Ok::<_, anyhow::Error>(Some("extension hold".to_string()))
            })
            .unwrap();

        let s = setup(Controller::ProController, registry);
        s.dispatcher.handle_line("btn:x:true").await.unwrap();

        assert!(s.state.is_pressed(Button::X));
        assert!(s.sink.entries().is_empty());
    }
}
