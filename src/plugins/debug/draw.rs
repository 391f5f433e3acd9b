use bevy::prelude::*;
use bevy_prototype_debug_lines::DebugLines;

use crate::plugins::portal::geometry::Aabb;

/// Draw the 12 edges of an axis-aligned box. Degenerate boxes come out as a
/// rectangle or a single line.
pub fn draw_aabb(lines: &mut ResMut<DebugLines>, aabb: &Aabb, color: Color) {
    let (lo, hi) = (aabb.min.min(aabb.max), aabb.min.max(aabb.max));
    let corners = [
        Vec3::new(lo.x, lo.y, lo.z),
        Vec3::new(hi.x, lo.y, lo.z),
        Vec3::new(lo.x, hi.y, lo.z),
        Vec3::new(hi.x, hi.y, lo.z),
        Vec3::new(lo.x, lo.y, hi.z),
        Vec3::new(hi.x, lo.y, hi.z),
        Vec3::new(lo.x, hi.y, hi.z),
        Vec3::new(hi.x, hi.y, hi.z),
    ];

    // Edges along X
    lines.line_colored(corners[0], corners[1], 0., color);
    lines.line_colored(corners[2], corners[3], 0., color);
    lines.line_colored(corners[4], corners[5], 0., color);
    lines.line_colored(corners[6], corners[7], 0., color);

    // Edges along Y
    lines.line_colored(corners[0], corners[2], 0., color);
    lines.line_colored(corners[1], corners[3], 0., color);
    lines.line_colored(corners[4], corners[6], 0., color);
    lines.line_colored(corners[5], corners[7], 0., color);

    // Edges along Z
    lines.line_colored(corners[0], corners[4], 0., color);
    lines.line_colored(corners[1], corners[5], 0., color);
    lines.line_colored(corners[2], corners[6], 0., color);
    lines.line_colored(corners[3], corners[7], 0., color);
}
