//! Portal teleport: trigger volumes around placed decals, and the rigid
//! transition applied to the camera when it walks into one.

use std::f32::consts::PI;

use super::geometry::Aabb;
use super::{
    PortalSlot, PORTAL_EXIT_STANDOFF, PORTAL_TRIGGER_HALF_DEPTH, PORTAL_TRIGGER_HALF_WIDTH,
    SURFACE_FACING_EPSILON,
};

/// The slab the camera must walk through to trigger a teleport: wide along
/// the portal surface, shallow along its normal, spanning the full chamber
/// height.
pub fn trigger_volume(slot: &PortalSlot, room_height: f32) -> Aabb {
    let (dx, dz) = if slot.angle.cos().abs() > SURFACE_FACING_EPSILON {
        (PORTAL_TRIGGER_HALF_WIDTH, PORTAL_TRIGGER_HALF_DEPTH)
    } else {
        (PORTAL_TRIGGER_HALF_DEPTH, PORTAL_TRIGGER_HALF_WIDTH)
    };
    let mut aabb = slot.aabb.inflated(dx, 0., dz);
    aabb.min.y = 0.;
    aabb.max.y = room_height;
    aabb
}

/// Where the camera lands when entering `enter` and exiting through `exit`.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub exit_x: f32,
    pub exit_z: f32,
    pub yaw_correction: f32,
}

/// Computes the camera transition between two armed portals.
///
/// The yaw correction `(delta) + pi * cos(delta)` turns the camera to face
/// away from the destination surface. Not an exact rotation composition for
/// arbitrary angle pairs, but play behavior depends on the exact values it
/// produces for the axis-aligned surfaces here, so it stays as written. The
/// exit point stands `PORTAL_EXIT_STANDOFF` off the destination decal, on
/// the side facing the chamber interior.
pub fn transition(enter: &PortalSlot, exit: &PortalSlot) -> Transition {
    let delta = enter.angle - exit.angle;
    let mut yaw_correction = delta + PI * delta.cos();
    if yaw_correction == 0. {
        // Collapse IEEE negative zero from the subtraction.
        yaw_correction = 0.;
    }

    let mut dx = 0.;
    let mut dz = 0.;
    if exit.angle.cos().abs() > SURFACE_FACING_EPSILON {
        dz = PORTAL_EXIT_STANDOFF;
        if exit.aabb.min.z > 0. {
            dz = -dz;
        }
    } else {
        dx = PORTAL_EXIT_STANDOFF;
        if exit.aabb.min.x > 0. {
            dx = -dx;
        }
    }

    Transition {
        exit_x: exit.aabb.min.x + dx,
        exit_z: exit.aabb.min.z + dz,
        yaw_correction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::portal::geometry::Aabb;
    use approx::assert_abs_diff_eq;
    use bevy::prelude::Vec3;
    use std::f32::consts::FRAC_PI_2;

    fn slot(min: Vec3, max: Vec3, angle: f32) -> PortalSlot {
        PortalSlot {
            created: true,
            anchored_to_prop: false,
            aabb: Aabb::new(min, max),
            angle,
            placed_at: 0.,
        }
    }

    #[test]
    fn z_facing_trigger_is_wide_on_x() {
        let slot = slot(Vec3::new(0., 2.5, 49.99), Vec3::new(0., 2.5, 50.01), 0.);
        let trigger = trigger_volume(&slot, 5.);
        assert_abs_diff_eq!(trigger.min.x, -5.);
        assert_abs_diff_eq!(trigger.max.x, 5.);
        assert_abs_diff_eq!(trigger.min.z, 48.99);
        assert_abs_diff_eq!(trigger.max.z, 51.01);
        assert_abs_diff_eq!(trigger.min.y, 0.);
        assert_abs_diff_eq!(trigger.max.y, 5.);
    }

    #[test]
    fn x_facing_trigger_is_wide_on_z() {
        let slot = slot(
            Vec3::new(-49.99, 2.5, 25.),
            Vec3::new(-50.01, 2.5, 25.),
            FRAC_PI_2,
        );
        let trigger = trigger_volume(&slot, 5.);
        assert_abs_diff_eq!(trigger.min.z, 20.);
        assert_abs_diff_eq!(trigger.max.z, 30.);
        assert_abs_diff_eq!(trigger.min.x, -50.99);
        assert_abs_diff_eq!(trigger.max.x, -49.01);
    }

    #[test]
    fn worked_transition_example() {
        // Portal A on a Z-facing wall with angle 0, portal B on an X-facing
        // wall with angle pi/2: the correction is (0 - pi/2) + pi*cos(-pi/2)
        // = -pi/2, and the exit stands off B on X with the sign negated by
        // B's positive min-X.
        let a = slot(Vec3::new(0., 2.5, 49.99), Vec3::new(0., 2.5, 50.01), 0.);
        let b = slot(
            Vec3::new(50., 2.5, 25.),
            Vec3::new(50., 2.5, 25.),
            FRAC_PI_2,
        );
        let t = transition(&a, &b);
        assert_abs_diff_eq!(t.yaw_correction, -FRAC_PI_2, epsilon = 1e-5);
        assert_abs_diff_eq!(t.exit_x, 45.);
        assert_abs_diff_eq!(t.exit_z, 25.);
    }

    #[test]
    fn exit_offset_sign_follows_destination_side() {
        let enter = slot(Vec3::new(0., 2.5, 49.99), Vec3::new(0., 2.5, 50.01), 0.);
        // Z-facing exit on the negative side: standoff stays positive.
        let exit_neg = slot(Vec3::new(0., 2.5, -49.99), Vec3::new(0., 2.5, -50.01), 0.);
        let t = transition(&enter, &exit_neg);
        assert_abs_diff_eq!(t.exit_z, -44.99);
        // Z-facing exit on the positive side: standoff is negated.
        let exit_pos = slot(Vec3::new(0., 2.5, 49.99), Vec3::new(0., 2.5, 50.01), 0.);
        let t = transition(&enter, &exit_pos);
        assert_abs_diff_eq!(t.exit_z, 44.99);
    }

    #[test]
    fn parallel_portals_flip_by_pi() {
        let a = slot(Vec3::new(0., 2.5, 49.99), Vec3::new(0., 2.5, 50.01), 0.);
        let b = slot(Vec3::new(0., 2.5, -49.99), Vec3::new(0., 2.5, -50.01), 0.);
        let t = transition(&a, &b);
        assert_abs_diff_eq!(t.yaw_correction, std::f32::consts::PI);
    }
}
