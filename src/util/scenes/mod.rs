use bevy::prelude::*;

use crate::plugins::{
    game::ChamberConfig,
    portal::geometry::{Aabb, Surface},
};

/// Static chamber geometry: the axis-aligned collision set and the subset of
/// walls that accept portals.
#[derive(Debug, Clone, Resource)]
pub struct ChamberGeometry {
    pub collision: Vec<Aabb>,
    pub portal_surfaces: Vec<Surface>,
}

/// Build the chamber collision set from the configured dimensions.
///
/// The chamber is a square of half-extent `width`, split by an open corridor
/// of half-depth `gap_distance` running along the X axis. Walls are stored as
/// degenerate (zero-thickness) boxes on their planes; the two corridor mouths
/// get slightly oversized slabs so the player cannot slip out sideways.
pub fn chamber_geometry(config: &ChamberConfig) -> ChamberGeometry {
    let w = config.width;
    let h = config.height;
    let gap = config.gap_distance;

    let back = Aabb::new(Vec3::new(-w, 0., -w), Vec3::new(w, h, -w));
    let left_front = Aabb::new(Vec3::new(-w, 0., gap), Vec3::new(-w, h, w));
    let front = Aabb::new(Vec3::new(-w, 0., w), Vec3::new(w, h, w));
    let right_front = Aabb::new(Vec3::new(w, 0., gap), Vec3::new(w, h, w));
    let left_back = Aabb::new(Vec3::new(-w, 0., -w), Vec3::new(-w, h, -gap));
    let right_back = Aabb::new(Vec3::new(w, 0., -w), Vec3::new(w, h, -gap));
    let corridor_in = Aabb::new(Vec3::new(-w - 1., 0., -gap), Vec3::new(w + 1., h, -gap));
    let corridor_out = Aabb::new(Vec3::new(-w - 1., 0., gap), Vec3::new(w + 1., h, gap));

    let portal_surfaces = vec![
        Surface::from_aabb(left_front),
        Surface::from_aabb(front),
        Surface::from_aabb(right_front),
    ];

    ChamberGeometry {
        collision: vec![
            back,
            left_front,
            front,
            right_front,
            left_back,
            right_back,
            corridor_in,
            corridor_out,
        ],
        portal_surfaces,
    }
}

/// Spawn the chamber visuals and insert the matching [`ChamberGeometry`]
/// resource. Visual walls are thin boxes centered on the collision planes.
pub fn make_chamber(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
    config: &ChamberConfig,
) {
    const WALL_THICKNESS: f32 = 1.;

    let geometry = chamber_geometry(config);

    let wall_materials = [
        materials.add(StandardMaterial::from(Color::RED)),
        materials.add(StandardMaterial::from(Color::GREEN)),
        materials.add(StandardMaterial::from(Color::BLUE)),
        materials.add(StandardMaterial::from(Color::ANTIQUE_WHITE)),
        materials.add(StandardMaterial::from(Color::ORANGE_RED)),
        materials.add(StandardMaterial::from(Color::SEA_GREEN)),
    ];
    let ground_material = materials.add(StandardMaterial::from(Color::DARK_GRAY));

    let w = config.width;
    let h = config.height;
    let ground_mesh = meshes.add(
        shape::Box {
            min_x: -w * 1.1,
            max_x: w * 1.1,
            min_y: -WALL_THICKNESS / 2.,
            max_y: WALL_THICKNESS / 2.,
            min_z: -w * 1.1,
            max_z: w * 1.1,
        }
        .into(),
    );

    commands.spawn((
        PbrBundle {
            mesh: ground_mesh,
            material: ground_material,
            transform: Transform::from_xyz(0., -WALL_THICKNESS / 2., 0.),
            ..default()
        },
        Name::from("Ground"),
    ));

    // The first six collision boxes are the walls; the corridor slabs are
    // collision-only and get no visual.
    for (i, (wall, material)) in geometry
        .collision
        .iter()
        .take(6)
        .zip(wall_materials)
        .enumerate()
    {
        let center = (wall.min + wall.max) / 2.;
        let half = (wall.max - wall.min) / 2.;
        // Inflate the degenerate axis to the visual thickness.
        let half_x = half.x.max(WALL_THICKNESS / 2.);
        let half_z = half.z.max(WALL_THICKNESS / 2.);
        let mesh = meshes.add(
            shape::Box {
                min_x: -half_x,
                max_x: half_x,
                min_y: -h / 2.,
                max_y: h / 2.,
                min_z: -half_z,
                max_z: half_z,
            }
            .into(),
        );
        commands.spawn((
            PbrBundle {
                mesh,
                material,
                transform: Transform::from_translation(center),
                ..default()
            },
            Name::from(format!("Wall_{}", i)),
        ));
    }

    commands.insert_resource(geometry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn chamber_has_eight_collision_boxes() {
        let geometry = chamber_geometry(&ChamberConfig::default());
        assert_eq!(geometry.collision.len(), 8);
    }

    #[test]
    fn three_walls_accept_portals() {
        let geometry = chamber_geometry(&ChamberConfig::default());
        assert_eq!(geometry.portal_surfaces.len(), 3);
    }

    #[test]
    fn side_walls_face_along_x() {
        let geometry = chamber_geometry(&ChamberConfig::default());
        assert_abs_diff_eq!(geometry.portal_surfaces[0].angle, FRAC_PI_2);
        assert_abs_diff_eq!(geometry.portal_surfaces[2].angle, FRAC_PI_2);
    }

    #[test]
    fn front_wall_angle_is_below_snap_threshold() {
        let geometry = chamber_geometry(&ChamberConfig::default());
        let config = ChamberConfig::default();
        let expected = config.height.atan2(2. * config.width);
        assert_abs_diff_eq!(geometry.portal_surfaces[1].angle, expected);
        assert!(geometry.portal_surfaces[1].angle < crate::plugins::portal::ANGLE_SNAP_THRESHOLD);
    }

    #[test]
    fn corridor_slabs_span_past_the_walls() {
        let config = ChamberConfig::default();
        let geometry = chamber_geometry(&config);
        let corridor_in = &geometry.collision[6];
        assert_abs_diff_eq!(corridor_in.min.x, -config.width - 1.);
        assert_abs_diff_eq!(corridor_in.max.x, config.width + 1.);
        assert_abs_diff_eq!(corridor_in.min.z, corridor_in.max.z);
    }
}
