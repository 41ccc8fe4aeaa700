//! Async host that owns the desktop state and runs reducer effects.
//!
//! Every mutation funnels through [`DesktopRuntime::dispatch`], which reduces one action under a
//! single mutex and executes the returned effects only after the lock is released. App commands
//! arrive on a queue so lifecycle callbacks running inside a transition never re-enter it.

use std::{sync::Arc, time::Duration};

use desktop_app_contract::{AppCommandEnvelope, AppCommandSender, Credentials};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    boot::BootPhase,
    config::DesktopConfig,
    host::{route_app_command, CommandRoute, DesktopHostContext, ProfileWriter},
    reducer::{
        reduce_desktop, DesktopAction, DesktopEvent, DesktopState, ReducerContext, RuntimeEffect,
    },
    session::{credentials::CredentialHasher, AuthError, Authenticator},
};

/// Buffered events per subscriber before the slowest one starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("the desktop runtime must be created inside a tokio runtime")]
    NoAsyncRuntime,
    #[error(transparent)]
    Credentials(#[from] AuthError),
}

/// Cloneable handle to one desktop session host.
#[derive(Clone)]
pub struct DesktopRuntime {
    inner: Arc<RuntimeInner>,
}

struct RuntimeInner {
    config: DesktopConfig,
    tasks: Handle,
    host: DesktopHostContext,
    state: Mutex<DesktopState>,
    authenticator: Authenticator,
    events: broadcast::Sender<DesktopEvent>,
    profile_writer: ProfileWriter,
    commands: AppCommandSender,
    command_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<AppCommandEnvelope>>,
}

impl DesktopRuntime {
    /// Builds a runtime over `host`'s collaborators. Timers and write-through run on the tokio
    /// runtime this is called from.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NoAsyncRuntime`] outside a tokio runtime and
    /// [`RuntimeError::Credentials`] when the configured hashing parameters are rejected.
    pub fn new(config: DesktopConfig, host: DesktopHostContext) -> Result<Self, RuntimeError> {
        let tasks = Handle::try_current().map_err(|_| RuntimeError::NoAsyncRuntime)?;
        let hasher = CredentialHasher::new(config.credentials)?;
        let authenticator =
            Authenticator::new(host.account_store(), hasher, config.login_latency());
        let state = DesktopState::new(&config, host.viewport());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let profile_writer = ProfileWriter::spawn(&tasks, host.account_store(), events.clone());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let commands: AppCommandSender = Arc::new(move |envelope: AppCommandEnvelope| {
            if command_tx.send(envelope).is_err() {
                debug!("app command dropped: runtime gone");
            }
        });

        Ok(Self {
            inner: Arc::new(RuntimeInner {
                config,
                tasks,
                host,
                state: Mutex::new(state),
                authenticator,
                events,
                profile_writer,
                commands,
                command_rx: tokio::sync::Mutex::new(command_rx),
            }),
        })
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.inner.config
    }

    pub fn host(&self) -> &DesktopHostContext {
        &self.inner.host
    }

    /// Applies `action` atomically, then runs the resulting effects.
    pub fn dispatch(&self, action: DesktopAction) {
        let effects = {
            let mut state = self.inner.state.lock();
            let context = ReducerContext {
                viewport: self.inner.host.viewport(),
                wallpapers: &self.inner.config.wallpapers,
                command_sender: &self.inner.commands,
            };
            reduce_desktop(&mut state, &context, action)
        };
        for effect in effects {
            self.run_effect(effect);
        }
    }

    /// Reads the state under the lock. `f` must not dispatch.
    pub fn with_state<R>(&self, f: impl FnOnce(&DesktopState) -> R) -> R {
        f(&self.inner.state.lock())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DesktopEvent> {
        self.inner.events.subscribe()
    }

    /// Queue that app services write their commands into.
    pub fn app_command_sender(&self) -> AppCommandSender {
        self.inner.commands.clone()
    }

    /// Verifies `credentials` and, on success, replaces the current session.
    ///
    /// A failed attempt leaves the current session and its windows untouched and publishes
    /// [`DesktopEvent::LoginFailed`] with the user-facing message.
    pub async fn login(&self, credentials: Credentials) -> Result<(), AuthError> {
        match self.inner.authenticator.login(&credentials).await {
            Ok(session) => {
                self.dispatch(DesktopAction::CompleteLogin(session));
                Ok(())
            }
            Err(error) => {
                self.publish(DesktopEvent::LoginFailed {
                    username: credentials.username,
                    message: error.user_message().to_string(),
                });
                Err(error)
            }
        }
    }

    pub fn login_guest(&self) {
        self.dispatch(DesktopAction::LoginGuest);
    }

    pub fn sign_out(&self) {
        self.dispatch(DesktopAction::SignOut);
    }

    /// Registers an account seeded with the default profile. The current session is unchanged.
    pub async fn create_account(&self, credentials: Credentials) -> Result<(), AuthError> {
        let seed = self.with_state(|state| state.session.default_profile().clone());
        let result = self
            .inner
            .authenticator
            .create_account(&credentials, &seed)
            .await;
        let username = credentials.username;
        match &result {
            Ok(()) => self.publish(DesktopEvent::AccountCreated { username }),
            Err(error) => self.publish(DesktopEvent::AccountCreationFailed {
                username,
                message: error.user_message().to_string(),
            }),
        }
        result
    }

    /// Handles every queued app command. Returns how many were drained; zero while a pump task
    /// owns the queue.
    pub fn flush_app_commands(&self) -> usize {
        let Ok(mut queue) = self.inner.command_rx.try_lock() else {
            return 0;
        };
        let mut handled = 0;
        while let Ok(envelope) = queue.try_recv() {
            self.handle_app_command(envelope);
            handled += 1;
        }
        handled
    }

    /// Drains app commands as they arrive. The task runs until aborted.
    pub fn spawn_app_command_pump(&self) -> JoinHandle<()> {
        let runtime = self.clone();
        self.inner.tasks.spawn(async move {
            let mut queue = runtime.inner.command_rx.lock().await;
            while let Some(envelope) = queue.recv().await {
                runtime.handle_app_command(envelope);
            }
        })
    }

    /// Drives the startup progress to ready on the configured tick and settle delay.
    pub fn spawn_boot_sequence(&self) -> JoinHandle<()> {
        let runtime = self.clone();
        let tick = Duration::from_millis(self.inner.config.boot_tick_ms);
        let settle = Duration::from_millis(self.inner.config.boot_settle_ms);
        self.inner.tasks.spawn(async move {
            let mut interval = tokio::time::interval(tick);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                runtime.dispatch(DesktopAction::BootTick);
                if runtime.with_state(|state| state.boot.phase()) != BootPhase::Loading {
                    break;
                }
            }
            tokio::time::sleep(settle).await;
            runtime.dispatch(DesktopAction::BootSettled);
        })
    }

    fn handle_app_command(&self, envelope: AppCommandEnvelope) {
        match route_app_command(envelope) {
            CommandRoute::Dispatch(action) => self.dispatch(action),
            CommandRoute::CreateAccount(credentials) => {
                let runtime = self.clone();
                self.inner.tasks.spawn(async move {
                    // Outcome is published on the event stream.
                    let _ = runtime.create_account(credentials).await;
                });
            }
            CommandRoute::Rejected => {}
        }
    }

    fn run_effect(&self, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::ScheduleToastExpiry { id } => {
                let runtime = self.clone();
                let ttl = self.inner.config.toast_ttl();
                self.inner.tasks.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    runtime.dispatch(DesktopAction::ExpireToast { id });
                });
            }
            RuntimeEffect::PersistProfile(write) => self.inner.profile_writer.enqueue(write),
            RuntimeEffect::Publish(event) => self.publish(event),
        }
    }

    fn publish(&self, event: DesktopEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}

impl std::fmt::Debug for DesktopRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopRuntime")
            .field("config", &self.inner.config)
            .field("host", &self.inner.host)
            .finish_non_exhaustive()
    }
}
