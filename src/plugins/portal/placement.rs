//! Portal placement: resolving the camera's aim ray against the candidate
//! surfaces and deriving the decal box for the hit.

use bevy::prelude::*;

use super::geometry::{ray_box_intersection, Aabb, Surface};
use super::{ANGLE_SNAP_THRESHOLD, DECAL_SURFACE_OFFSET, RAY_MAX_DISTANCE, SURFACE_FACING_EPSILON};

/// A surface the aim ray is tested against. Candidates anchored on the prop
/// produce portals that track its motion.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub surface: Surface,
    pub on_prop: bool,
}

/// A resolved placement: the decal box, its final yaw and whether it must be
/// re-anchored to the prop every frame.
#[derive(Debug, Clone)]
pub struct Placement {
    pub aabb: Aabb,
    pub angle: f32,
    pub on_prop: bool,
}

/// Tests the aim ray against the candidates in order; the first surface hit
/// wins and later candidates are skipped.
pub fn resolve_placement(candidates: &[Candidate], origin: Vec3, view: Vec3) -> Option<Placement> {
    for candidate in candidates {
        if let Some(hit) = ray_box_intersection(&candidate.surface.aabb, origin, view, RAY_MAX_DISTANCE)
        {
            return Some(decal_for_hit(&candidate.surface, hit, candidate.on_prop));
        }
    }
    None
}

/// Builds the decal box for a surface hit.
///
/// The decal stays thin but is nudged `DECAL_SURFACE_OFFSET` off the surface
/// plane, on the side facing the chamber interior, so it never z-fights with
/// the wall. Writing `min = hit + offset, max = hit - offset` makes the
/// corner with the larger coordinate encode which way the decal front faces.
/// Surfaces on the negative side of their axis get a pi turn instead of a
/// flipped offset so the decal mesh faces the right way.
fn decal_for_hit(surface: &Surface, hit: Vec3, on_prop: bool) -> Placement {
    let mut angle = surface.angle;
    if angle.abs() < ANGLE_SNAP_THRESHOLD {
        angle = 0.;
    }

    let mut dx = 0.;
    let mut dz = 0.;
    if angle.cos().abs() > SURFACE_FACING_EPSILON {
        // Z-facing surface.
        dz = DECAL_SURFACE_OFFSET;
        if surface.aabb.min.z > 0. {
            dz = -dz;
        } else {
            angle += std::f32::consts::PI;
        }
    } else {
        // X-facing surface.
        dx = DECAL_SURFACE_OFFSET;
        if surface.aabb.min.x > 0. {
            dx = -dx;
        } else {
            angle += std::f32::consts::PI;
        }
    }

    let offset = Vec3::new(dx, 0., dz);
    Placement {
        aabb: Aabb::new(hit + offset, hit - offset),
        angle,
        on_prop,
    }
}
