//! Resolution of declared app capabilities into injected service bundles.

use desktop_app_contract::{
    AccountService, ApiCallService, AppCapability, AppCommand, AppCommandSender, AppServices,
    AppearanceService, ApplicationId, CommandSender, LauncherService, NotificationSink,
    ProfileSliceService,
};

use crate::{apps::AppDescriptor, model::SessionProfile};

/// Runtime state visible to capability resolution.
pub struct CapabilityContext<'a> {
    pub profile: &'a SessionProfile,
    pub wallpapers: &'a [String],
    pub current_user: Option<&'a str>,
    pub sender: &'a AppCommandSender,
}

/// Builds the service bundle for `descriptor`. Apps only receive services for the capabilities the
/// catalog declares for them.
pub fn resolve_app_services(
    app_id: &ApplicationId,
    descriptor: &AppDescriptor,
    context: &CapabilityContext<'_>,
) -> AppServices {
    let sender = CommandSender::new(app_id.clone(), context.sender.clone());
    let mut services = AppServices::new(sender.clone());
    for capability in descriptor.capabilities {
        match *capability {
            AppCapability::ProfileSlice(slice) => {
                services.profile = Some(ProfileSliceService::new(
                    context.profile.slice(slice),
                    sender.clone(),
                ));
            }
            AppCapability::ApiCallCounter => {
                services.api_calls = Some(ApiCallService::new(sender.clone()));
            }
            AppCapability::Notifications => {
                services.notifications = Some(NotificationSink::new(sender.clone()));
            }
            AppCapability::Appearance => {
                services.appearance = Some(AppearanceService::new(
                    context.wallpapers.to_vec(),
                    context.profile.settings.theme,
                    sender.clone(),
                ));
            }
            AppCapability::Launcher => {
                services.launcher = Some(LauncherService::new(sender.clone()));
            }
            AppCapability::Accounts => {
                services.accounts = Some(AccountService::new(
                    context.current_user.map(str::to_string),
                    sender.clone(),
                ));
            }
        }
    }
    services
}

/// Capability a command requires from its source app. `None` means the command is always allowed.
pub fn required_capability(command: &AppCommand) -> Option<AppCapability> {
    match command {
        AppCommand::SaveProfileSlice { value } => Some(AppCapability::ProfileSlice(value.slice())),
        AppCommand::RecordApiCall => Some(AppCapability::ApiCallCounter),
        AppCommand::Notify { .. } => Some(AppCapability::Notifications),
        AppCommand::OpenApp { .. } => Some(AppCapability::Launcher),
        AppCommand::SetWallpaper { .. } | AppCommand::ToggleTheme => {
            Some(AppCapability::Appearance)
        }
        AppCommand::CreateAccount { .. } => Some(AppCapability::Accounts),
        AppCommand::PermissionDenied { .. } => None,
    }
}
