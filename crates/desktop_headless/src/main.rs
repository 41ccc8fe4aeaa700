//! Headless desktop session driver.
//!
//! Boots a runtime against in-memory collaborators, signs in (guest, or a named account that is
//! created on demand), drives a short scripted session, and prints the resulting desktop as JSON.

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use desktop_app_contract::{AppCommand, AppCommandEnvelope, ApplicationId, Credentials};
use desktop_runtime::{
    AuthError, DesktopAction, DesktopConfig, DesktopEvent, DesktopHostContext, DesktopRuntime,
    Overlay, SessionStatus,
};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "desktop-headless", version, about = "Drive a scripted desktop session")]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sign in as this user instead of a guest.
    #[arg(long, requires = "password")]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Apps to open, in order.
    #[arg(long = "open", value_delimiter = ',', default_values_t = default_apps())]
    apps: Vec<String>,
    /// Skip the startup progress sequence.
    #[arg(long)]
    skip_boot: bool,
    /// Wait for posted toasts to expire before printing.
    #[arg(long)]
    wait_toasts: bool,
}

fn default_apps() -> Vec<String> {
    ["pages", "houston", "calculator"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DesktopConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => DesktopConfig::default(),
    };

    let host = DesktopHostContext::in_memory(config.default_viewport);
    let runtime = DesktopRuntime::new(config, host).context("failed to build runtime")?;
    let log_task = tokio::spawn(log_events(runtime.subscribe()));
    let pump = runtime.spawn_app_command_pump();

    if !args.skip_boot {
        runtime
            .spawn_boot_sequence()
            .await
            .context("boot sequence aborted")?;
    }

    sign_in(&runtime, &args).await?;
    run_script(&runtime, &args.apps);
    // Let queued app commands and write-throughs land.
    tokio::time::sleep(Duration::from_millis(50)).await;
    if args.wait_toasts {
        tokio::time::sleep(runtime.config().toast_ttl()).await;
    }

    let summary = serde_json::to_string_pretty(&summarize(&runtime))?;
    println!("{summary}");

    pump.abort();
    log_task.abort();
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn sign_in(runtime: &DesktopRuntime, args: &Args) -> Result<()> {
    let (Some(username), Some(password)) = (&args.username, &args.password) else {
        runtime.login_guest();
        return Ok(());
    };
    let credentials = Credentials::new(username.clone(), password.clone());
    match runtime.create_account(credentials.clone()).await {
        Ok(()) | Err(AuthError::UsernameTaken) => {}
        Err(error) => return Err(error).context("account creation failed"),
    }
    runtime
        .login(credentials)
        .await
        .with_context(|| format!("login failed for {username}"))
}

fn run_script(runtime: &DesktopRuntime, apps: &[String]) {
    for app_id in apps {
        runtime.dispatch(DesktopAction::OpenApp {
            app_id: app_id.clone(),
            initial_props: Value::Null,
        });
    }

    let sender = runtime.app_command_sender();
    let houston = ApplicationId::trusted("houston");
    if runtime.with_state(|state| state.windows.is_open(houston.as_str())) {
        sender(AppCommandEnvelope {
            source: houston.clone(),
            command: AppCommand::RecordApiCall,
        });
        sender(AppCommandEnvelope {
            source: houston,
            command: AppCommand::Notify {
                title: "Houston".to_string(),
                message: "Session script finished.".to_string(),
            },
        });
    }

    runtime.dispatch(DesktopAction::ToggleOverlay(Overlay::ControlCenter));
    runtime.dispatch(DesktopAction::SetBrightness { percent: 70 });
    runtime.dispatch(DesktopAction::ToggleTheme);
    runtime.dispatch(DesktopAction::DismissLightweightOverlays);
}

fn summarize(runtime: &DesktopRuntime) -> Value {
    runtime.with_state(|state| {
        let session = match SessionStatus::from(state.session.state()) {
            SessionStatus::LoggedOut => json!("logged-out"),
            SessionStatus::Guest => json!("guest"),
            SessionStatus::Authenticated { username } => json!({ "user": username }),
        };
        let windows: Vec<Value> = state
            .windows
            .windows()
            .iter()
            .map(|window| {
                json!({
                    "app_id": window.app_id.as_str(),
                    "title": window.title,
                    "rect": [window.rect.x, window.rect.y, window.rect.w, window.rect.h],
                    "z_index": window.z_index,
                    "minimized": window.minimized,
                    "maximized": window.maximized,
                })
            })
            .collect();
        let notifications: Vec<Value> = state
            .notifications
            .history()
            .map(|notification| {
                json!({
                    "id": notification.id,
                    "app_id": notification.app_id.as_str(),
                    "title": notification.title,
                    "message": notification.message,
                })
            })
            .collect();

        json!({
            "session": session,
            "boot_ready": state.boot.is_ready(),
            "active_app": state.windows.active_app_title(),
            "windows": windows,
            "notifications": notifications,
            "toasts": state.notifications.toasts().len(),
            "api_calls": state.api_usage.count,
            "theme": state.session.profile().settings.theme,
            "control_center": state.control_center,
            "dock": state.dock.apps(),
        })
    })
}

async fn log_events(mut events: broadcast::Receiver<DesktopEvent>) {
    loop {
        match events.recv().await {
            Ok(DesktopEvent::BootProgress { .. }) => {}
            Ok(event) => info!(?event, "desktop event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event log lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
