//! Collision tests between circles and axis-aligned boxes
//!
//! Boxes are anchored at their top-left corner, matching how enemies store
//! their position. Edge contact counts as a hit for circle tests and as a
//! miss for box-box tests.

use glam::Vec2;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Check overlap between two boxes (touching edges do not overlap)
pub fn rect_overlap(a: Rect, b: Rect) -> bool {
    a.pos.x < b.pos.x + b.size.x
        && a.pos.x + a.size.x > b.pos.x
        && a.pos.y < b.pos.y + b.size.y
        && a.pos.y + a.size.y > b.pos.y
}

/// Check whether a circle touches a box
pub fn circle_rect(center: Vec2, radius: f32, rect: Rect) -> bool {
    let half = rect.size / 2.0;
    let d = (center - rect.center()).abs();

    if d.x > half.x + radius || d.y > half.y + radius {
        return false;
    }

    if d.x <= half.x || d.y <= half.y {
        return true;
    }

    // Closest point is a corner
    (d - half).length_squared() <= radius * radius
}

/// Check whether two circles touch
pub fn circle_circle(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    let r = radius_a + radius_b;
    a.distance_squared(b) <= r * r
}

/// Damage dealt by an explosion of radius `size` to a target whose center is
/// `distance` away. Falls off linearly to zero at the edge.
pub fn splash_damage(damage: i32, distance: f32, size: f32) -> i32 {
    if size <= 0.0 {
        return 0;
    }
    let falloff = (1.0 - distance / size).clamp(0.0, 1.0);
    (damage as f32 * falloff) as i32
}
