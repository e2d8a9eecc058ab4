//! Collision detection and response for balls against pins and board walls
//!
//! Contacts are resolved one at a time: there is no multi-contact solver and
//! no continuous detection, so very fast balls may tunnel through a pin.

use glam::DVec2;

use super::layout::Pin;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Surface normal at collision (pointing toward ball center)
    pub normal: DVec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: DVec2::ZERO,
        }
    }
}

/// Check a ball against a single pin
pub fn ball_pin_collision(ball_pos: DVec2, ball_radius: f64, pin: &Pin) -> CollisionResult {
    let min_dist = ball_radius + pin.radius;
    let offset = ball_pos - pin.pos;
    let dist = offset.length();

    if dist >= min_dist {
        return CollisionResult::miss();
    }

    // Dead-center hit has no direction; push straight up
    let normal = if dist > f64::EPSILON {
        offset / dist
    } else {
        DVec2::Y
    };

    CollisionResult { hit: true, normal }
}

/// Reflect the normal component of `velocity`, keeping `restitution` of it
///
/// v' = v - (1 + e)(v·n)n
#[inline]
pub fn reflect_with_restitution(velocity: DVec2, normal: DVec2, restitution: f64) -> DVec2 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Resolve a ball/pin overlap in place
///
/// The ball is moved to `min_dist + epsilon` from the pin center along the
/// contact normal. Velocity is reflected only when moving into the pin.
/// Returns true if the velocity was reflected.
pub fn resolve_pin_contact(
    pos: &mut DVec2,
    vel: &mut DVec2,
    pin: &Pin,
    contact: &CollisionResult,
    ball_radius: f64,
    restitution: f64,
    epsilon: f64,
) -> bool {
    *pos = pin.pos + contact.normal * (ball_radius + pin.radius + epsilon);

    if vel.dot(contact.normal) < 0.0 {
        *vel = reflect_with_restitution(*vel, contact.normal, restitution);
        true
    } else {
        false
    }
}

/// Clamp a ball between the side walls and under the ceiling
///
/// Velocity on the contact axis is inverted and scaled by `restitution`.
/// Returns true if any wall was touched.
pub fn resolve_board_bounds(
    pos: &mut DVec2,
    vel: &mut DVec2,
    ball_radius: f64,
    half_width: f64,
    top_y: f64,
    restitution: f64,
) -> bool {
    let mut touched = false;
    let left = -half_width + ball_radius;
    let right = half_width - ball_radius;

    if left > right {
        // Narrower than a ball: hold it on the center line
        touched = pos.x != 0.0;
        pos.x = 0.0;
        vel.x = 0.0;
    } else if pos.x < left {
        pos.x = left;
        vel.x *= -restitution;
        touched = true;
    } else if pos.x > right {
        pos.x = right;
        vel.x *= -restitution;
        touched = true;
    }

    if pos.y > top_y {
        pos.y = top_y;
        vel.y *= -restitution;
        touched = true;
    }

    touched
}
