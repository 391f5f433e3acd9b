//! This module contains the first person camera rig.
//!
//! The rig keeps the camera pose in spherical coordinates (`theta` around
//! the vertical axis, `phi` for pitch) and proposes a new position every
//! frame from the movement inputs. The collision gate and the teleport
//! engine may overwrite the proposal before it is pushed to the render
//! camera at the end of the frame.

use bevy::{prelude::*, render::camera::Projection};
use euclid::Angle;
use iyes_loopless::prelude::*;
use leafwing_input_manager::prelude::*;

use super::game::{ChamberConfig, GameState};
use super::input::{default_input_map, Actions};
use super::physics::PhysicsLabels;
use super::prop::PropLabels;

#[derive(Debug)]
pub struct FirstPersonControllerPlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemLabel)]
pub enum FirstPersonLabels {
    ProcessInputs,
    SyncCamera,
}

impl Plugin for FirstPersonControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_startup_system(spawn_controller)
            .add_system(
                process_controller_inputs
                    .run_in_state(GameState::Running)
                    .label(FirstPersonLabels::ProcessInputs)
                    .after(PropLabels::Animate),
            )
            .add_system(
                sync_camera_transform
                    .label(FirstPersonLabels::SyncCamera)
                    .after(PhysicsLabels::ApplyBlock),
            );
    }
}

/// First person camera rig component.
#[derive(Debug, Component)]
pub struct CameraRig {
    pub position: Vec3,
    /// Position at the start of the frame, restored on a blocked move.
    pub last_position: Vec3,
    pub theta: Angle<f32>,
    pub phi: Angle<f32>,
    /// Magnitude of the view vector (folded into the aim-ray reach).
    pub distance: f32,
    pub noclip: bool,
}

impl CameraRig {
    pub fn new(position: Vec3, distance: f32) -> CameraRig {
        CameraRig {
            position,
            last_position: position,
            theta: Angle::zero(),
            phi: Angle::zero(),
            distance,
            noclip: false,
        }
    }

    /// View vector from the spherical coordinates, deliberately left
    /// unnormalized: its magnitude is the rig distance.
    pub fn view_vector(&self) -> Vec3 {
        let (sin_theta, cos_theta) = self.theta.radians.sin_cos();
        let (sin_phi, cos_phi) = self.phi.radians.sin_cos();
        Vec3::new(
            -self.distance * cos_phi * sin_theta,
            -self.distance * sin_phi,
            -self.distance * cos_phi * cos_theta,
        )
    }
}

const MOUSE_SENSITIVITY: f32 = 0.004;
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

fn spawn_controller(mut commands: Commands, config: Res<ChamberConfig>) {
    let eye = Vec3::new(0., config.height / 2., config.width / 2.);
    commands.spawn((
        Camera3dBundle {
            projection: Projection::Perspective(PerspectiveProjection {
                fov: std::f32::consts::FRAC_PI_3,
                near: 0.1,
                far: 1000.,
                ..default()
            }),
            ..default()
        },
        CameraRig::new(eye, config.width / 2.),
        InputManagerBundle {
            action_state: ActionState::default(),
            input_map: default_input_map(),
        },
        Name::from("Player camera"),
    ));
}

fn process_controller_inputs(
    time: Res<Time>,
    config: Res<ChamberConfig>,
    mut player_query: Query<(&ActionState<Actions>, &mut CameraRig)>,
) {
    for (input_state, mut rig) in &mut player_query {
        rig.last_position = rig.position;

        if let Some(mouse_movement) = input_state.axis_pair(Actions::Aim) {
            rig.theta -= Angle::radians(mouse_movement.x() * MOUSE_SENSITIVITY);
            rig.phi += Angle::radians(mouse_movement.y() * MOUSE_SENSITIVITY);
            rig.phi.radians = rig.phi.radians.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        if input_state.just_pressed(Actions::ToggleNoclip) {
            rig.noclip = !rig.noclip;
        }

        let mut forward = rig.view_vector();
        if !rig.noclip {
            forward.y = 0.;
        }
        let forward = forward.normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();

        let mut displacement = Vec3::ZERO;
        match (
            input_state.pressed(Actions::Forward),
            input_state.pressed(Actions::Backwards),
        ) {
            (true, false) => displacement += forward,
            (false, true) => displacement -= forward,
            _ => {}
        }
        match (
            input_state.pressed(Actions::StrafeLeft),
            input_state.pressed(Actions::StrafeRight),
        ) {
            (true, false) => displacement -= right,
            (false, true) => displacement += right,
            _ => {}
        }

        rig.position += displacement * config.player_speed * time.delta_seconds();
    }
}

/// Pushes the final rig pose of the frame to the render camera.
fn sync_camera_transform(mut camera_query: Query<(&CameraRig, &mut Transform)>) {
    for (rig, mut transform) in &mut camera_query {
        *transform = Transform::from_translation(rig.position)
            .looking_at(rig.position + rig.view_vector(), Vec3::Y);
    }
}
