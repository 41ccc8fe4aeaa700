//! Reducer helpers for profile merges and their write-through effects.

use crate::{
    reducer::{DesktopAction, DesktopEvent, DesktopState, RuntimeEffect},
    session::ProfileWrite,
};

pub(super) fn reduce_profile_action(
    state: &mut DesktopState,
    action: &DesktopAction,
    effects: &mut Vec<RuntimeEffect>,
) -> bool {
    let write = match action {
        DesktopAction::UpdateProfile(update) if update.is_empty() => return true,
        DesktopAction::UpdateProfile(update) => state.session.update_profile(update.clone()),
        DesktopAction::MoveDesktopIcon { app_id, position } => {
            let Some(update) = state.session.desktop_icon_update(app_id, *position) else {
                return true;
            };
            state.session.update_profile(update)
        }
        DesktopAction::SetWallpaper { url } => state.session.set_wallpaper(url.clone()),
        DesktopAction::ToggleTheme => state.session.toggle_theme(),
        _ => return false,
    };
    push_profile_effects(write, effects);
    true
}

fn push_profile_effects(write: Option<ProfileWrite>, effects: &mut Vec<RuntimeEffect>) {
    effects.push(RuntimeEffect::Publish(DesktopEvent::ProfileUpdated));
    if let Some(write) = write {
        effects.push(RuntimeEffect::PersistProfile(write));
    }
}
