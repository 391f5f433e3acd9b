//! Axis-aligned geometry primitives shared by the collision gate, the portal
//! placement engine and the teleport engine.
//!
//! Everything in the chamber is axis-aligned: walls and prop faces are
//! degenerate (zero-thickness) boxes, portal decals are thin boxes offset a
//! hair off their surface, and trigger volumes are inflated slabs. The only
//! nontrivial operation is the segment/box intersection used to aim portals.

use bevy::prelude::*;

/// An axis-aligned box. The thin axis of a wall or decal may be degenerate
/// (`min == max` on that axis). Portal decal boxes deliberately *invert*
/// `min`/`max` on their thin axis when they face the negative direction;
/// which corner carries the larger coordinate is what encodes the decal's
/// facing for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const fn new(min: Vec3, max: Vec3) -> Aabb {
        Aabb { min, max }
    }

    /// Inclusive containment on every axis. This is the collision-gate
    /// semantics: a camera sitting exactly on an obstacle face counts as
    /// blocked.
    pub fn contains(&self, p: Vec3) -> bool {
        if p.x < self.min.x || p.x > self.max.x {
            return false;
        }
        if p.y < self.min.y || p.y > self.max.y {
            return false;
        }
        if p.z < self.min.z || p.z > self.max.z {
            return false;
        }
        true
    }

    /// Strict containment on every axis, used by the teleport trigger checks
    /// and by the ray test below: boundary points do not count.
    pub fn contains_strict(&self, p: Vec3) -> bool {
        p.x > self.min.x
            && p.x < self.max.x
            && p.y > self.min.y
            && p.y < self.max.y
            && p.z > self.min.z
            && p.z < self.max.z
    }

    /// Grow the box by the given half-extents on each axis.
    pub fn inflated(&self, dx: f32, dy: f32, dz: f32) -> Aabb {
        let d = Vec3::new(dx, dy, dz);
        Aabb::new(self.min - d, self.max + d)
    }
}

/// A flat, portal-eligible surface: a degenerate box plus its derived
/// horizontal orientation angle.
#[derive(Debug, Clone)]
pub struct Surface {
    pub aabb: Aabb,
    pub angle: f32,
}

impl Surface {
    pub fn from_aabb(aabb: Aabb) -> Surface {
        Surface {
            angle: surface_angle(&aabb),
            aabb,
        }
    }
}

/// Orientation angle of a thin box, from its vertical vs. horizontal
/// extents. A pure function of the box shape: translating the box does not
/// change it. A full-span Z-facing wall yields a small angle (snapped to 0
/// at placement time), an X-facing wall segment yields pi/2.
pub fn surface_angle(aabb: &Aabb) -> f32 {
    (aabb.max.y - aabb.min.y).atan2(aabb.max.x - aabb.min.x)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Crossing point of the segment `[origin, end]` with an axis plane, given
/// the signed distances of both endpoints to the plane. No crossing when
/// both endpoints are on the same side.
fn plane_crossing(d1: f32, d2: f32, origin: Vec3, end: Vec3) -> Option<Vec3> {
    if d1 * d2 >= 0. {
        return None;
    }
    Some(origin + (end - origin) * (-d1 / (d2 - d1)))
}

/// Whether a plane-crossing point falls strictly within the box's face
/// extents on the two off-plane axes.
fn in_face(aabb: &Aabb, hit: Vec3, axis: Axis) -> bool {
    match axis {
        Axis::X => {
            hit.z > aabb.min.z && hit.z < aabb.max.z && hit.y > aabb.min.y && hit.y < aabb.max.y
        }
        Axis::Y => {
            hit.z > aabb.min.z && hit.z < aabb.max.z && hit.x > aabb.min.x && hit.x < aabb.max.x
        }
        Axis::Z => {
            hit.x > aabb.min.x && hit.x < aabb.max.x && hit.y > aabb.min.y && hit.y < aabb.max.y
        }
    }
}

/// Intersects the finite segment `origin + t * direction, t in [0,
/// max_distance]` with an axis-aligned box.
///
/// The direction need not be normalized; its magnitude is absorbed into the
/// reach of the segment. An origin already inside the box hits at the origin
/// itself. Otherwise the six bounding planes are tested in turn (min planes
/// before max planes) and the first crossing landing strictly inside its
/// face wins; the convex boxes used here admit at most one meaningful entry
/// point, so any accepted hit is the right one.
pub fn ray_box_intersection(
    aabb: &Aabb,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<Vec3> {
    let end = origin + direction * max_distance;

    // Segment entirely outside the box on a single axis: no hit.
    if end.x < aabb.min.x && origin.x < aabb.min.x {
        return None;
    }
    if end.x > aabb.max.x && origin.x > aabb.max.x {
        return None;
    }
    if end.y < aabb.min.y && origin.y < aabb.min.y {
        return None;
    }
    if end.y > aabb.max.y && origin.y > aabb.max.y {
        return None;
    }
    if end.z < aabb.min.z && origin.z < aabb.min.z {
        return None;
    }
    if end.z > aabb.max.z && origin.z > aabb.max.z {
        return None;
    }

    if aabb.contains_strict(origin) {
        return Some(origin);
    }

    let plane_tests = [
        (origin.x - aabb.min.x, end.x - aabb.min.x, Axis::X),
        (origin.y - aabb.min.y, end.y - aabb.min.y, Axis::Y),
        (origin.z - aabb.min.z, end.z - aabb.min.z, Axis::Z),
        (origin.x - aabb.max.x, end.x - aabb.max.x, Axis::X),
        (origin.y - aabb.max.y, end.y - aabb.max.y, Axis::Y),
        (origin.z - aabb.max.z, end.z - aabb.max.z, Axis::Z),
    ];
    for (d1, d2, axis) in plane_tests {
        if let Some(hit) = plane_crossing(d1, d2, origin, end) {
            if in_face(aabb, hit, axis) {
                return Some(hit);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(-1., -1., -1.), Vec3::new(1., 1., 1.))
    }

    #[test]
    fn contains_is_inclusive_on_boundaries() {
        let aabb = unit_box();
        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::new(1., 0., 0.)));
        assert!(aabb.contains(Vec3::new(-1., -1., -1.)));
        assert!(!aabb.contains(Vec3::new(1.0001, 0., 0.)));
        assert!(!aabb.contains(Vec3::new(0., -1.1, 0.)));
    }

    #[test]
    fn contains_strict_excludes_boundaries() {
        let aabb = unit_box();
        assert!(aabb.contains_strict(Vec3::ZERO));
        assert!(!aabb.contains_strict(Vec3::new(1., 0., 0.)));
        assert!(!aabb.contains_strict(Vec3::new(0., 0., -1.)));
    }

    #[test]
    fn inflated_grows_both_corners() {
        let aabb = unit_box().inflated(1., 0., 2.);
        assert_eq!(aabb.min, Vec3::new(-2., -1., -3.));
        assert_eq!(aabb.max, Vec3::new(2., 1., 3.));
    }

    #[test]
    fn surface_angle_is_translation_invariant() {
        let wall = Aabb::new(Vec3::new(-50., 0., 50.), Vec3::new(50., 5., 50.));
        let moved = Aabb::new(wall.min + Vec3::new(7., 3., -20.), wall.max + Vec3::new(7., 3., -20.));
        assert_abs_diff_eq!(surface_angle(&wall), surface_angle(&moved));
        assert_abs_diff_eq!(surface_angle(&wall), (5f32).atan2(100.));
    }

    #[test]
    fn surface_angle_of_side_wall_is_half_pi() {
        let wall = Aabb::new(Vec3::new(-50., 0., 10.), Vec3::new(-50., 5., 50.));
        assert_abs_diff_eq!(surface_angle(&wall), std::f32::consts::FRAC_PI_2);
    }

    #[test]
    fn ray_from_inside_hits_at_origin() {
        let aabb = unit_box();
        let origin = Vec3::new(0.2, -0.3, 0.);
        let hit = ray_box_intersection(&aabb, origin, Vec3::X, 500.).unwrap();
        assert_eq!(hit, origin);
    }

    #[test]
    fn ray_hits_face_from_outside() {
        // Min planes are tested first, so for a thick box the reported
        // crossing lands on the min-Z face.
        let aabb = unit_box();
        let hit = ray_box_intersection(&aabb, Vec3::new(0., 0., 5.), Vec3::NEG_Z, 500.).unwrap();
        assert_abs_diff_eq!(hit.z, -1.);
        assert_abs_diff_eq!(hit.x, 0.);
        assert_abs_diff_eq!(hit.y, 0.);
    }

    #[test]
    fn ray_hits_degenerate_wall() {
        // Zero-thickness Z-facing wall, aimed at head on.
        let wall = Aabb::new(Vec3::new(-50., 0., 50.), Vec3::new(50., 5., 50.));
        let hit =
            ray_box_intersection(&wall, Vec3::new(0., 2.5, 25.), Vec3::new(0., 0., 1.), 500.)
                .unwrap();
        assert_abs_diff_eq!(hit.z, 50.);
        assert_abs_diff_eq!(hit.y, 2.5);
    }

    #[test]
    fn ray_aimed_away_misses() {
        let aabb = unit_box();
        assert!(ray_box_intersection(&aabb, Vec3::new(0., 0., 5.), Vec3::Z, 500.).is_none());
    }

    #[test]
    fn ray_out_of_reach_misses() {
        let aabb = unit_box();
        assert!(ray_box_intersection(&aabb, Vec3::new(0., 0., 5.), Vec3::NEG_Z, 3.).is_none());
    }

    #[test]
    fn ray_grazing_past_face_extent_misses() {
        // Crosses the box's Z plane but outside the face on X.
        let aabb = unit_box();
        assert!(
            ray_box_intersection(&aabb, Vec3::new(3., 0., 5.), Vec3::NEG_Z, 500.).is_none()
        );
    }
}
