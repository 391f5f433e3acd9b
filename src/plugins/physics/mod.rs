//! The collision gate: a coarse point-vs-inflated-box test of the camera
//! against the chamber obstacles, producing a single blocked flag per frame.
//! Not swept collision; a camera fast enough could tunnel through a thin
//! obstacle, which is acceptable at the movement speeds used here.

use bevy::prelude::*;
use iyes_loopless::prelude::*;

use super::first_person_controller::{CameraRig, FirstPersonLabels};
use super::game::GameState;
use super::portal::geometry::Aabb;
use super::portal::PortalLabels;
use crate::util::scenes::ChamberGeometry;

/// Padding applied to obstacles on X and Z, giving the point camera a
/// non-zero effective radius.
pub const OBSTACLE_PADDING: f32 = 1.;

#[derive(Debug)]
pub struct PhysicsPlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemLabel)]
pub enum PhysicsLabels {
    CollisionGate,
    ApplyBlock,
}

/// Whether this frame's proposed camera position must be reverted. Written
/// by the gate, possibly cleared by a teleport, applied at end of frame.
#[derive(Debug, Default, Resource)]
pub struct MovementBlocked(pub bool);

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MovementBlocked>()
            .add_system(
                collision_gate
                    .run_in_state(GameState::Running)
                    .label(PhysicsLabels::CollisionGate)
                    .after(FirstPersonLabels::ProcessInputs),
            )
            .add_system(
                apply_block
                    .run_in_state(GameState::Running)
                    .label(PhysicsLabels::ApplyBlock)
                    .after(PortalLabels::TeleportEntities),
            );

        #[cfg(feature = "devel")]
        app.add_system(draw_obstacles);
    }
}

/// Inclusive point test against every obstacle, each inflated by the camera
/// padding on X and Z. Noclip disables the gate entirely, not just the
/// XZ-plane movement restriction.
pub fn movement_blocked(position: Vec3, noclip: bool, obstacles: &[Aabb]) -> bool {
    !noclip
        && obstacles
            .iter()
            .any(|obstacle| obstacle.inflated(OBSTACLE_PADDING, 0., OBSTACLE_PADDING).contains(position))
}

fn collision_gate(
    chamber: Res<ChamberGeometry>,
    mut blocked: ResMut<MovementBlocked>,
    player_query: Query<&CameraRig>,
) {
    blocked.0 = false;
    if let Ok(rig) = player_query.get_single() {
        blocked.0 = movement_blocked(rig.position, rig.noclip, &chamber.collision);
    }
}

/// Reverts the camera to its pre-frame position when the gate flagged the
/// move and no teleport cleared the flag.
fn apply_block(blocked: Res<MovementBlocked>, mut player_query: Query<&mut CameraRig>) {
    if blocked.0 {
        if let Ok(mut rig) = player_query.get_single_mut() {
            rig.position = rig.last_position;
        }
    }
}

#[cfg(feature = "devel")]
fn draw_obstacles(
    chamber: Res<ChamberGeometry>,
    mut lines: ResMut<bevy_prototype_debug_lines::DebugLines>,
) {
    use crate::plugins::debug::draw::draw_aabb;
    for obstacle in &chamber.collision {
        draw_aabb(
            &mut lines,
            &obstacle.inflated(OBSTACLE_PADDING, 0., OBSTACLE_PADDING),
            Color::RED,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_inside_inflated_obstacle_is_blocked() {
        // Degenerate wall at z = -50: the padding turns it into a slab the
        // camera cannot stand inside.
        let wall = Aabb::new(Vec3::new(-50., 0., -50.), Vec3::new(50., 5., -50.));
        assert!(movement_blocked(Vec3::new(0., 2.5, -49.5), false, &[wall]));
        assert!(!movement_blocked(Vec3::new(0., 2.5, -48.5), false, &[wall]));
    }

    #[test]
    fn gate_boundary_is_inclusive() {
        let wall = Aabb::new(Vec3::new(-50., 0., -50.), Vec3::new(50., 5., -50.));
        // Exactly on the inflated face still counts as blocked.
        assert!(movement_blocked(Vec3::new(0., 2.5, -49.), false, &[wall]));
        assert!(movement_blocked(Vec3::new(51., 2.5, -50.), false, &[wall]));
    }

    #[test]
    fn any_obstacle_blocks() {
        let near = Aabb::new(Vec3::new(-1., 0., -1.), Vec3::new(1., 5., 1.));
        let far = Aabb::new(Vec3::new(40., 0., 40.), Vec3::new(41., 5., 41.));
        let position = Vec3::new(40.5, 2.5, 40.5);
        assert!(!movement_blocked(position, false, &[near]));
        assert!(movement_blocked(position, false, &[near, far]));
    }

    #[test]
    fn noclip_bypasses_gate() {
        // A position that would be blocked passes the gate under noclip,
        // including positions inside solid geometry.
        let wall = Aabb::new(Vec3::new(-50., 0., -50.), Vec3::new(50., 5., -50.));
        let inside = Vec3::new(0., 2.5, -50.);
        assert!(movement_blocked(inside, false, &[wall]));
        assert!(!movement_blocked(inside, true, &[wall]));
    }
}
