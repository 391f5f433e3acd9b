use bevy::{prelude::*, window::CursorGrabMode};
use leafwing_input_manager::prelude::*;

#[derive(Debug)]
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(InputManagerPlugin::<Actions>::default())
            .add_startup_system(capture_on_start)
            .add_system(toggle_mouse_capture);
    }
}

#[derive(Actionlike, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actions {
    Forward,
    Backwards,
    StrafeLeft,
    StrafeRight,
    Aim,
    ToggleNoclip,
    FirePortalA,
    FirePortalB,
}

pub fn default_input_map() -> InputMap<Actions> {
    let mut map = InputMap::new([
        (KeyCode::W, Actions::Forward),
        (KeyCode::S, Actions::Backwards),
        (KeyCode::A, Actions::StrafeLeft),
        (KeyCode::D, Actions::StrafeRight),
        (KeyCode::N, Actions::ToggleNoclip),
    ]);
    map.insert(DualAxis::mouse_motion(), Actions::Aim)
        .insert(MouseButton::Left, Actions::FirePortalA)
        .insert(MouseButton::Right, Actions::FirePortalB);
    map
}

fn capture_on_start(mut windows: ResMut<Windows>) {
    let window = windows.get_primary_mut().unwrap();
    window.set_cursor_visibility(false);
    window.set_cursor_grab_mode(CursorGrabMode::Locked);
}

fn toggle_mouse_capture(mut windows: ResMut<Windows>, tab_input: Res<Input<KeyCode>>) {
    let window = windows.get_primary_mut().unwrap();
    let locked = window.cursor_grab_mode() == CursorGrabMode::Locked;
    if tab_input.just_pressed(KeyCode::Tab) {
        window.set_cursor_visibility(locked);
        window.set_cursor_grab_mode(if locked {
            CursorGrabMode::None
        } else {
            CursorGrabMode::Locked
        });
    }
}
