//! Sphere-sphere contact resolution.
//!
//! Contacts are resolved pairwise with no broad phase. Overlapping balls are
//! first pushed apart along the contact normal by half the overlap each, then
//! the normal components of their velocities are replaced by the solution of
//! the one-dimensional restitution problem. Tangential velocity is untouched.

use bevy::math::Vec3;

use crate::config::{CollisionMode, TankConfig};
use crate::constants::MIN_SEPARATION;

use super::ball::BallBody;

/// Resolves a contact between `this` and `other` using `restitution`.
///
/// Returns `true` when the balls were overlapping and got resolved. Balls
/// whose centers coincide have no defined normal and are left alone.
pub fn resolve_pair(this: &mut BallBody, other: &mut BallBody, restitution: f32) -> bool {
    let separation = other.position - this.position;
    let distance = separation.length();
    let min_distance = this.radius() + other.radius();

    if distance >= min_distance || distance < MIN_SEPARATION {
        return false;
    }

    let normal = separation / distance;

    let correction = (min_distance - distance) * 0.5;
    this.position -= normal * correction;
    other.position += normal * correction;

    let v1 = this.velocity.dot(normal);
    let v2 = other.velocity.dot(normal);
    let m1 = this.mass();
    let m2 = other.mass();
    let e = restitution;

    let momentum = m1 * v1 + m2 * v2;
    let new_v1 = (momentum - m2 * (v1 - v2) * e) / (m1 + m2);
    let new_v2 = (momentum - m1 * (v2 - v1) * e) / (m1 + m2);

    this.velocity += normal * (new_v1 - v1);
    other.velocity += normal * (new_v2 - v2);

    true
}

/// Drives ball integration and contacts for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResolver {
    pub mode: CollisionMode,
}

impl CollisionResolver {
    pub fn new(mode: CollisionMode) -> Self {
        Self { mode }
    }

    /// Integrates every ball and resolves contacts in the configured order.
    ///
    /// Returns the number of contacts resolved.
    pub fn integrate_and_resolve(
        &self,
        balls: &mut [BallBody],
        dt: f32,
        gravity: Vec3,
        tank: &TankConfig,
    ) -> usize {
        match self.mode {
            CollisionMode::Sequential => {
                let mut contacts = 0;
                for i in 0..balls.len() {
                    balls[i].integrate(dt, gravity, tank);

                    let (earlier, rest) = balls.split_at_mut(i);
                    let current = &mut rest[0];
                    for other in earlier.iter_mut() {
                        let restitution = current.restitution();
                        if resolve_pair(current, other, restitution) {
                            contacts += 1;
                        }
                    }
                }
                contacts
            }
            CollisionMode::Symmetric => {
                for ball in balls.iter_mut() {
                    ball.integrate(dt, gravity, tank);
                }
                self.resolve_all_pairs(balls)
            }
        }
    }

    /// Resolves every pair once, combining both restitutions.
    pub fn resolve_all_pairs(&self, balls: &mut [BallBody]) -> usize {
        let mut contacts = 0;
        for j in 1..balls.len() {
            let (head, tail) = balls.split_at_mut(j);
            let second = &mut tail[0];
            for first in head.iter_mut() {
                let restitution = 0.5 * (first.restitution() + second.restitution());
                if resolve_pair(first, second, restitution) {
                    contacts += 1;
                }
            }
        }
        contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(x: f32, restitution: f32) -> BallBody {
        BallBody::new(Vec3::new(x, 1.0, 0.0), 0.5, 1.0)
            .unwrap()
            .with_restitution(restitution)
    }

    fn open_tank() -> TankConfig {
        TankConfig {
            size: Vec3::new(100.0, 10.0, 100.0),
            border: 0.0,
        }
    }

    #[test]
    fn test_separated_balls_are_untouched() {
        let mut a = ball_at(0.0, 1.0);
        let mut b = ball_at(1.5, 1.0);
        a.velocity = Vec3::X;

        assert!(!resolve_pair(&mut a, &mut b, 1.0));
        assert_eq!(a.position.x, 0.0);
        assert_eq!(a.velocity, Vec3::X);
    }

    #[test]
    fn test_equal_mass_elastic_exchange() {
        let mut a = ball_at(0.0, 1.0);
        let mut b = ball_at(0.9, 1.0);
        a.velocity = Vec3::new(2.0, 0.0, 0.0);
        b.velocity = Vec3::new(-2.0, 0.0, 0.0);

        assert!(resolve_pair(&mut a, &mut b, 1.0));

        assert!((a.velocity.x + 2.0).abs() < 1e-5);
        assert!((b.velocity.x - 2.0).abs() < 1e-5);
        // De-penetrated symmetrically
        assert!((a.position.x + 0.05).abs() < 1e-5);
        assert!((b.position.x - 0.95).abs() < 1e-5);
    }

    #[test]
    fn test_tangential_velocity_is_preserved() {
        let mut a = ball_at(0.0, 1.0);
        let mut b = ball_at(0.9, 1.0);
        a.velocity = Vec3::new(1.0, 0.0, 3.0);

        resolve_pair(&mut a, &mut b, 1.0);

        assert!((a.velocity.z - 3.0).abs() < 1e-6);
        assert!(a.velocity.x.abs() < 1e-6);
        assert!((b.velocity.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inelastic_contact_conserves_momentum() {
        let mut a = BallBody::new(Vec3::ZERO, 0.5, 3.0).unwrap();
        let mut b = BallBody::new(Vec3::new(0.0, 0.8, 0.0), 0.5, 1.0).unwrap();
        a.velocity = Vec3::new(0.0, 1.0, 0.0);
        b.velocity = Vec3::new(0.0, -1.0, 0.0);
        let before = a.velocity * a.mass() + b.velocity * b.mass();

        resolve_pair(&mut a, &mut b, 0.0);

        let after = a.velocity * a.mass() + b.velocity * b.mass();
        assert!((before - after).length() < 1e-4);
        // Perfectly inelastic: equal normal velocities afterwards
        assert!((a.velocity.y - b.velocity.y).abs() < 1e-5);
    }

    #[test]
    fn test_coincident_centers_are_skipped() {
        let mut a = ball_at(0.0, 1.0);
        let mut b = ball_at(0.0, 1.0);
        a.velocity = Vec3::X;

        assert!(!resolve_pair(&mut a, &mut b, 1.0));
        assert_eq!(a.position, b.position);
        assert!(a.velocity.is_finite());
        assert_eq!(a.velocity, Vec3::X);
    }

    #[test]
    fn test_sequential_uses_later_ball_restitution() {
        let resolver = CollisionResolver::new(CollisionMode::Sequential);
        let mut balls = vec![ball_at(0.0, 1.0), ball_at(0.9, 0.0)];
        balls[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        balls[1].velocity = Vec3::new(-1.0, 0.0, 0.0);

        let contacts = resolver.integrate_and_resolve(&mut balls, 1e-6, Vec3::ZERO, &open_tank());

        assert_eq!(contacts, 1);
        // Ball 1 resolves against ball 0 with its own restitution of zero
        assert!((balls[0].velocity.x - balls[1].velocity.x).abs() < 1e-4);
    }

    #[test]
    fn test_symmetric_uses_mean_restitution() {
        let resolver = CollisionResolver::new(CollisionMode::Symmetric);
        let mut balls = vec![ball_at(0.0, 1.0), ball_at(0.9, 0.0)];
        balls[0].velocity = Vec3::new(1.0, 0.0, 0.0);
        balls[1].velocity = Vec3::new(-1.0, 0.0, 0.0);

        let contacts = resolver.integrate_and_resolve(&mut balls, 1e-6, Vec3::ZERO, &open_tank());

        assert_eq!(contacts, 1);
        // Closing speed 2 leaves at 0.5 * 2
        let separating = balls[1].velocity.x - balls[0].velocity.x;
        assert!((separating - 1.0).abs() < 1e-3);
    }
}
