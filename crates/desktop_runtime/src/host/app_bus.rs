//! Routing of app-issued commands into reducer actions.

use desktop_app_contract::{AppCommand, AppCommandEnvelope, Credentials};
use tracing::warn;

use crate::{
    apps::app_descriptor, capabilities::required_capability, model::NotificationDraft,
    overlays::BlockingAlert, reducer::DesktopAction,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CommandRoute {
    Dispatch(DesktopAction),
    CreateAccount(Credentials),
    Rejected,
}

/// Translates `envelope` after checking the source app was granted the capability the command
/// needs.
pub(crate) fn route_app_command(envelope: AppCommandEnvelope) -> CommandRoute {
    let AppCommandEnvelope { source, command } = envelope;
    let Some(descriptor) = app_descriptor(source.as_str()) else {
        warn!(app_id = %source, "command from unknown app rejected");
        return CommandRoute::Rejected;
    };
    if let Some(capability) = required_capability(&command) {
        if !descriptor.has_capability(capability) {
            warn!(app_id = %source, ?capability, "command rejected: capability not granted");
            return CommandRoute::Rejected;
        }
    }

    let action = match command {
        AppCommand::SaveProfileSlice { value } => DesktopAction::UpdateProfile(value.into()),
        AppCommand::RecordApiCall => DesktopAction::RecordApiCall,
        AppCommand::Notify { title, message } => {
            DesktopAction::PostNotification(NotificationDraft::new(source, title, message))
        }
        AppCommand::OpenApp {
            app_id,
            initial_props,
        } => DesktopAction::OpenApp {
            app_id: app_id.to_string(),
            initial_props,
        },
        AppCommand::SetWallpaper { url } => DesktopAction::SetWallpaper { url },
        AppCommand::ToggleTheme => DesktopAction::ToggleTheme,
        AppCommand::CreateAccount { credentials } => {
            return CommandRoute::CreateAccount(credentials)
        }
        AppCommand::PermissionDenied { resource, message } => {
            DesktopAction::ShowPermissionAlert(BlockingAlert {
                app_id: source,
                resource,
                message,
            })
        }
    };
    CommandRoute::Dispatch(action)
}

#[cfg(test)]
mod tests {
    use desktop_app_contract::{ApplicationId, ProfileSliceValue};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::ProfileUpdate;

    fn envelope(source: &str, command: AppCommand) -> AppCommandEnvelope {
        AppCommandEnvelope {
            source: ApplicationId::trusted(source),
            command,
        }
    }

    #[test]
    fn granted_slice_write_becomes_profile_update() {
        let route = route_app_command(envelope(
            "photo-booth",
            AppCommand::SaveProfileSlice {
                value: ProfileSliceValue::Photos(vec!["data:a".to_string()]),
            },
        ));
        assert_eq!(
            route,
            CommandRoute::Dispatch(DesktopAction::UpdateProfile(ProfileUpdate {
                photos: Some(vec!["data:a".to_string()]),
                ..ProfileUpdate::default()
            }))
        );
    }

    #[test]
    fn foreign_slice_write_is_rejected() {
        let route = route_app_command(envelope(
            "photo-booth",
            AppCommand::SaveProfileSlice {
                value: ProfileSliceValue::BrowserUrl("https://evil.example".to_string()),
            },
        ));
        assert_eq!(route, CommandRoute::Rejected);
    }

    #[test]
    fn notify_is_attributed_to_source() {
        let route = route_app_command(envelope(
            "houston",
            AppCommand::Notify {
                title: "Houston".to_string(),
                message: "Done".to_string(),
            },
        ));
        assert_eq!(
            route,
            CommandRoute::Dispatch(DesktopAction::PostNotification(NotificationDraft::new(
                ApplicationId::trusted("houston"),
                "Houston",
                "Done",
            )))
        );
        let denied = route_app_command(envelope(
            "calculator",
            AppCommand::Notify {
                title: "x".to_string(),
                message: "y".to_string(),
            },
        ));
        assert_eq!(denied, CommandRoute::Rejected);
    }

    #[test]
    fn launcher_opens_with_props() {
        let route = route_app_command(envelope(
            "my-docs",
            AppCommand::OpenApp {
                app_id: ApplicationId::trusted("pages"),
                initial_props: json!({ "document_id": 1 }),
            },
        ));
        assert_eq!(
            route,
            CommandRoute::Dispatch(DesktopAction::OpenApp {
                app_id: "pages".to_string(),
                initial_props: json!({ "document_id": 1 }),
            })
        );
    }

    #[test]
    fn permission_reports_are_always_routed() {
        let route = route_app_command(envelope(
            "calculator",
            AppCommand::PermissionDenied {
                resource: "clipboard".to_string(),
                message: "Clipboard access was denied.".to_string(),
            },
        ));
        assert!(matches!(
            route,
            CommandRoute::Dispatch(DesktopAction::ShowPermissionAlert(_))
        ));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let route = route_app_command(envelope("ghost", AppCommand::RecordApiCall));
        assert_eq!(route, CommandRoute::Rejected);
    }
}
