//! The portal subsystem: shooting portals onto candidate surfaces, keeping
//! prop-anchored portals glued to the moving cube, teleporting the camera
//! between armed portals and animating the decals.

use bevy::prelude::*;
use euclid::Angle;
use iyes_loopless::prelude::*;
use leafwing_input_manager::prelude::ActionState;

pub mod geometry;
pub mod placement;
pub mod teleport;

use geometry::Aabb;
use placement::{resolve_placement, Candidate};
use teleport::{transition, trigger_volume};

use super::first_person_controller::CameraRig;
use super::game::{ChamberConfig, GameState};
use super::input::Actions;
use super::physics::{MovementBlocked, PhysicsLabels};
use super::prop::{Prop, PropLabels};
use crate::util::scenes::ChamberGeometry;

/// Surfaces whose |cos(angle)| exceeds this face the Z axis; the rest face X.
pub const SURFACE_FACING_EPSILON: f32 = 0.01;
/// Raw surface angles below this magnitude snap to exactly zero.
pub const ANGLE_SNAP_THRESHOLD: f32 = 0.1;
/// How far a decal box sits off its surface plane.
pub const DECAL_SURFACE_OFFSET: f32 = 0.01;
/// Trigger slab half-extent along the portal surface.
pub const PORTAL_TRIGGER_HALF_WIDTH: f32 = 5.;
/// Trigger slab half-extent along the portal normal.
pub const PORTAL_TRIGGER_HALF_DEPTH: f32 = 1.;
/// How far off the destination decal the camera emerges.
pub const PORTAL_EXIT_STANDOFF: f32 = 5.;
/// Offset gluing a prop-anchored decal to the prop front face.
pub const PROP_FACE_OFFSET: f32 = 1.01;
/// Reach of the aim ray (the view vector's magnitude folds into it).
pub const RAY_MAX_DISTANCE: f32 = 500.;
/// Minimum simulated-time gap between two placements of the same portal.
pub const PORTAL_COOLDOWN_SECONDS: f64 = 0.5;
/// Decal grow-in speed, in scale units per second.
pub const PORTAL_ANIMATION_SPEED: f64 = 15.;
/// Decal scale cap.
pub const PORTAL_MAX_SCALE: f64 = 5.;

#[derive(Debug)]
pub struct PortalPlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemLabel)]
pub enum PortalLabels {
    ShootPortals,
    AnchorPortals,
    TeleportEntities,
    SyncDecals,
}

/// One portal's armed state. Two slots exist, asymmetric only by which
/// trigger fires them.
#[derive(Debug, Clone)]
pub struct PortalSlot {
    pub created: bool,
    pub anchored_to_prop: bool,
    pub aabb: Aabb,
    pub angle: f32,
    pub placed_at: f64,
}

impl Default for PortalSlot {
    fn default() -> Self {
        PortalSlot {
            created: false,
            anchored_to_prop: false,
            aabb: Aabb::new(Vec3::ZERO, Vec3::ZERO),
            angle: 0.,
            placed_at: 0.,
        }
    }
}

impl PortalSlot {
    /// Whether the placement cooldown has elapsed at simulated time `now`.
    pub fn ready(&self, now: f64) -> bool {
        now - self.placed_at > PORTAL_COOLDOWN_SECONDS
    }

    const fn fire_action(index: usize) -> Actions {
        match index {
            0 => Actions::FirePortalA,
            1 => Actions::FirePortalB,
            _ => panic!("no such portal"),
        }
    }
}

/// The pair of portal slots; index 0 is the primary-trigger portal.
#[derive(Debug, Default, Resource)]
pub struct Portals(pub [PortalSlot; 2]);

/// Arms `slot` from the first candidate surface the aim ray hits, if the
/// cooldown allows it. Returns whether a placement happened.
pub(crate) fn try_place(
    slot: &mut PortalSlot,
    now: f64,
    candidates: &[Candidate],
    origin: Vec3,
    view: Vec3,
) -> bool {
    if !slot.ready(now) {
        return false;
    }
    if let Some(placement) = resolve_placement(candidates, origin, view) {
        slot.created = true;
        slot.anchored_to_prop = placement.on_prop;
        slot.aabb = placement.aabb;
        slot.angle = placement.angle;
        slot.placed_at = now;
        true
    } else {
        false
    }
}

impl Plugin for PortalPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Portals>()
            .add_startup_system(spawn_decals)
            .add_system(
                shoot_portal::<0>
                    .run_in_state(GameState::Running)
                    .label(PortalLabels::ShootPortals)
                    .after(PhysicsLabels::CollisionGate),
            )
            .add_system(
                shoot_portal::<1>
                    .run_in_state(GameState::Running)
                    .label(PortalLabels::ShootPortals)
                    .after(PhysicsLabels::CollisionGate),
            )
            .add_system(
                anchor_portals_to_prop
                    .run_in_state(GameState::Running)
                    .label(PortalLabels::AnchorPortals)
                    .after(PortalLabels::ShootPortals)
                    .after(PropLabels::Animate),
            )
            .add_system(
                teleport_camera
                    .run_in_state(GameState::Running)
                    .label(PortalLabels::TeleportEntities)
                    .after(PortalLabels::AnchorPortals),
            )
            .add_system(
                sync_decals
                    .label(PortalLabels::SyncDecals)
                    .after(PhysicsLabels::ApplyBlock),
            );

        #[cfg(feature = "devel")]
        app.add_system(draw_portal_volumes.after(PortalLabels::TeleportEntities));
    }
}

/// On left/right trigger, cast the aim ray against the prop faces and the
/// static wall surfaces and arm the portal on the first hit.
fn shoot_portal<const N: usize>(
    mut portals: ResMut<Portals>,
    time: Res<Time>,
    chamber: Res<ChamberGeometry>,
    prop: Res<Prop>,
    config: Res<ChamberConfig>,
    player_query: Query<(&ActionState<Actions>, &CameraRig)>,
) {
    let (input_state, rig) = match player_query.get_single() {
        Ok(player) => player,
        Err(_) => return,
    };
    if !input_state.pressed(PortalSlot::fire_action(N)) {
        return;
    }

    let mut candidates = Vec::with_capacity(chamber.portal_surfaces.len() + 1);
    candidates.push(Candidate {
        surface: prop.faces(config.height),
        on_prop: true,
    });
    candidates.extend(chamber.portal_surfaces.iter().map(|surface| Candidate {
        surface: surface.clone(),
        on_prop: false,
    }));

    let now = time.elapsed_seconds_f64();
    if try_place(
        &mut portals.0[N],
        now,
        &candidates,
        rig.position,
        rig.view_vector(),
    ) {
        let slot = &portals.0[N];
        info!(
            "portal {} placed at {} (angle {:.3}, anchored: {})",
            N, slot.aabb.min, slot.angle, slot.anchored_to_prop
        );
    }
}

/// Keeps prop-anchored decals glued to the prop's front face. The decal box
/// collapses to a point tracking the face; the trigger volume re-inflates it.
fn anchor_portals_to_prop(prop: Res<Prop>, mut portals: ResMut<Portals>) {
    let anchor = prop.position + Vec3::Z * PROP_FACE_OFFSET;
    for slot in portals.0.iter_mut() {
        if slot.created && slot.anchored_to_prop {
            slot.aabb = Aabb::new(anchor, anchor);
        }
    }
}

/// Checks both trigger volumes against the camera and applies the transition
/// when the paired portal is armed. A teleport overrides this frame's
/// collision block. Both checks run in order; overlapping triggers let the
/// second overwrite the first, which is accepted nondeterminism.
fn teleport_camera(
    portals: Res<Portals>,
    config: Res<ChamberConfig>,
    mut blocked: ResMut<MovementBlocked>,
    mut player_query: Query<&mut CameraRig>,
) {
    let mut rig = match player_query.get_single_mut() {
        Ok(rig) => rig,
        Err(_) => return,
    };
    for (enter_index, exit_index) in [(0, 1), (1, 0)] {
        let enter = &portals.0[enter_index];
        let exit = &portals.0[exit_index];
        if !enter.created || !exit.created {
            continue;
        }
        if trigger_volume(enter, config.height).contains_strict(rig.position) {
            let t = transition(enter, exit);
            rig.position.x = t.exit_x;
            rig.position.z = t.exit_z;
            rig.theta += Angle::radians(t.yaw_correction);
            blocked.0 = false;
            info!(
                "teleporting through portal {} (yaw correction {:.3})",
                enter_index, t.yaw_correction
            );
        }
    }
}

#[derive(Debug, Component)]
struct PortalDecal(usize);

fn spawn_decals(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(shape::Quad::new(Vec2::splat(2.)).into());
    let colors = [Color::rgb(0.2, 0.5, 1.), Color::rgb(1., 0.6, 0.1)];
    for (index, color) in colors.into_iter().enumerate() {
        let material = materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            double_sided: true,
            cull_mode: None,
            ..default()
        });
        commands.spawn((
            PbrBundle {
                mesh: mesh.clone(),
                material,
                visibility: Visibility { is_visible: false },
                ..default()
            },
            PortalDecal(index),
            Name::from(format!("Portal decal {}", index)),
        ));
    }
}

/// Drives the decal transforms: position and yaw from the slot, scale from
/// the grow-in animation.
fn sync_decals(
    portals: Res<Portals>,
    time: Res<Time>,
    mut decal_query: Query<(&PortalDecal, &mut Transform, &mut Visibility)>,
) {
    let now = time.elapsed_seconds_f64();
    for (decal, mut transform, mut visibility) in &mut decal_query {
        let slot = &portals.0[decal.0];
        visibility.is_visible = slot.created;
        if slot.created {
            let scale =
                ((now - slot.placed_at) * PORTAL_ANIMATION_SPEED).min(PORTAL_MAX_SCALE) as f32;
            *transform = Transform {
                translation: slot.aabb.min,
                rotation: Quat::from_rotation_y(slot.angle),
                scale: Vec3::new(scale, scale, 1.),
            };
        }
    }
}

#[cfg(feature = "devel")]
fn draw_portal_volumes(
    portals: Res<Portals>,
    config: Res<ChamberConfig>,
    mut lines: ResMut<bevy_prototype_debug_lines::DebugLines>,
) {
    use crate::plugins::debug::draw::draw_aabb;
    for slot in portals.0.iter() {
        if slot.created {
            draw_aabb(&mut lines, &trigger_volume(slot, config.height), Color::CYAN);
        }
    }
}
