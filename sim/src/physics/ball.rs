use bevy::math::{Ray3d, Vec3};
use std::f32::consts::PI;

use crate::config::{validate_ball, BallSpec, TankConfig};
use crate::constants::{DEFAULT_RESTITUTION, FORCE_VELOCITY_DAMPING};
use crate::error::ConfigError;

/// A rigid sphere floating in (or falling into) the tank.
///
/// Rotation is not modelled; a ball is a point mass with a radius.
#[derive(Clone, Debug, PartialEq)]
pub struct BallBody {
    pub position: Vec3,
    pub velocity: Vec3,
    radius: f32,
    mass: f32,
    restitution: f32,
    is_grabbed: bool,
    material: String,
}

impl BallBody {
    /// Creates a ball at rest, deriving its mass from `density` and volume.
    pub fn new(position: Vec3, radius: f32, density: f32) -> Result<Self, ConfigError> {
        validate_ball(radius, density)?;

        let volume = (4.0 / 3.0) * PI * radius.powi(3);

        Ok(Self {
            position,
            velocity: Vec3::ZERO,
            radius,
            mass: volume * density,
            restitution: DEFAULT_RESTITUTION,
            is_grabbed: false,
            material: String::new(),
        })
    }

    pub fn from_spec(spec: &BallSpec) -> Result<Self, ConfigError> {
        Ok(Self::new(spec.position, spec.radius, spec.density)?
            .with_restitution(spec.restitution)
            .with_material(spec.material.clone()))
    }

    /// Sets the bounciness, clamped to `0.0..=1.0`.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    #[inline]
    pub fn is_grabbed(&self) -> bool {
        self.is_grabbed
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    /// Advances the ball under gravity and keeps it inside the tank.
    ///
    /// Does nothing while the ball is grabbed.
    pub fn integrate(&mut self, dt: f32, gravity: Vec3, tank: &TankConfig) {
        if self.is_grabbed || dt <= 0.0 {
            return;
        }

        self.velocity += gravity * dt;
        self.position += self.velocity * dt;

        self.reflect_off_tank(tank);
    }

    /// Clamps the ball against the side walls and the floor, reversing and
    /// scaling the velocity component that hit.
    fn reflect_off_tank(&mut self, tank: &TankConfig) {
        let (max_x, max_z) = tank.wall_limits(self.radius);
        let min_y = self.radius;

        if self.position.x < -max_x {
            self.position.x = -max_x;
            self.velocity.x = -self.restitution * self.velocity.x;
        } else if self.position.x > max_x {
            self.position.x = max_x;
            self.velocity.x = -self.restitution * self.velocity.x;
        }

        if self.position.z < -max_z {
            self.position.z = -max_z;
            self.velocity.z = -self.restitution * self.velocity.z;
        } else if self.position.z > max_z {
            self.position.z = max_z;
            self.velocity.z = -self.restitution * self.velocity.z;
        }

        if self.position.y < min_y {
            self.position.y = min_y;
            self.velocity.y = -self.restitution * self.velocity.y;
        }
    }

    /// Applies a vertical force for `dt`.
    ///
    /// Every call also scales the whole velocity by [`FORCE_VELOCITY_DAMPING`],
    /// so a ball receiving buoyancy from many columns in one tick is damped
    /// once per column.
    pub fn apply_force(&mut self, force_y: f32, dt: f32) {
        self.velocity.y += force_y / self.mass * dt;
        self.velocity *= FORCE_VELOCITY_DAMPING;
    }

    pub fn start_grab(&mut self, position: Vec3) {
        self.is_grabbed = true;
        self.position = position;
    }

    /// Moves a grabbed ball. Ignored when the ball is not grabbed.
    pub fn move_grabbed(&mut self, position: Vec3) {
        if self.is_grabbed {
            self.position = position;
        }
    }

    /// Releases the ball at `position` with the caller-estimated `velocity`.
    pub fn end_grab(&mut self, position: Vec3, velocity: Vec3) {
        self.is_grabbed = false;
        self.position = position;
        self.velocity = velocity;
    }

    /// Distance along `ray` to the sphere surface, if the ray hits it.
    ///
    /// A ray starting inside the ball reports the exit point.
    pub fn ray_hit(&self, ray: &Ray3d) -> Option<f32> {
        let direction: Vec3 = *ray.direction;
        let offset = ray.origin - self.position;
        let b = offset.dot(direction);
        let c = offset.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let near = -b - root;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + root;
        (far >= 0.0).then_some(far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Dir3;

    fn open_tank() -> TankConfig {
        TankConfig {
            size: Vec3::new(100.0, 10.0, 100.0),
            border: 0.0,
        }
    }

    #[test]
    fn test_mass_follows_cubic_law() {
        let small = BallBody::new(Vec3::ZERO, 0.1, 2.0).unwrap();
        let large = BallBody::new(Vec3::ZERO, 0.2, 2.0).unwrap();

        assert!(small.mass() > 0.0);
        assert!((large.mass() / small.mass() - 8.0).abs() < 1e-4);
        assert!((small.mass() - 2.0 * 4.0 / 3.0 * PI * 0.001).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_degenerate_ball() {
        assert_eq!(
            BallBody::new(Vec3::ZERO, 0.0, 1.0).unwrap_err(),
            ConfigError::InvalidRadius { radius: 0.0 }
        );
        assert!(BallBody::new(Vec3::ZERO, -0.5, 1.0).is_err());
        assert!(BallBody::new(Vec3::ZERO, 0.5, 0.0).is_err());
    }

    #[test]
    fn test_free_fall_matches_closed_form() {
        let gravity = Vec3::new(0.0, -10.0, 0.0);
        let start = Vec3::new(0.0, 5.0, 0.0);
        let mut ball = BallBody::new(start, 0.1, 1.0).unwrap();
        let dt = 0.01;
        let steps = 50;

        for _ in 0..steps {
            ball.integrate(dt, gravity, &open_tank());
        }

        // Semi-implicit Euler: y_n = y0 + g * dt^2 * n(n+1)/2
        let n = steps as f32;
        let expected_y = start.y + gravity.y * dt * dt * n * (n + 1.0) / 2.0;
        assert!((ball.position.y - expected_y).abs() < 1e-3);
        assert!((ball.velocity.y - gravity.y * dt * n).abs() < 1e-3);
        // Closed-form projectile drop within one step of discretization error
        let t = dt * n;
        let continuous_y = start.y + 0.5 * gravity.y * t * t;
        assert!((ball.position.y - continuous_y).abs() <= gravity.y.abs() * dt * t);
    }

    #[test]
    fn test_floor_reflection() {
        let mut ball = BallBody::new(Vec3::new(0.0, 0.11, 0.0), 0.1, 1.0)
            .unwrap()
            .with_restitution(0.5);
        ball.velocity = Vec3::new(0.0, -2.0, 0.0);

        ball.integrate(0.01, Vec3::ZERO, &open_tank());

        assert_eq!(ball.position.y, 0.1);
        assert!((ball.velocity.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_wall_reflection_never_penetrates() {
        let tank = TankConfig {
            size: Vec3::new(2.0, 1.0, 2.0),
            border: 0.2,
        };
        let limit = 1.0 - 0.25 - 0.1;
        let mut ball = BallBody::new(Vec3::new(limit - 0.01, 1.0, 0.0), 0.25, 1.0)
            .unwrap()
            .with_restitution(0.8);
        ball.velocity = Vec3::new(3.0, 0.0, -100.0);

        ball.integrate(0.1, Vec3::ZERO, &tank);

        assert!((ball.position.x - limit).abs() < 1e-6);
        assert!((ball.velocity.x + 0.8 * 3.0).abs() < 1e-5);
        assert!((ball.position.z + limit).abs() < 1e-6);
        assert!((ball.velocity.z - 0.8 * 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_apply_force_damps_every_call() {
        let mut ball = BallBody::new(Vec3::ZERO, 0.5, 1.0).unwrap();
        ball.velocity = Vec3::new(1.0, 0.0, 0.0);

        ball.apply_force(0.0, 0.1);
        ball.apply_force(0.0, 0.1);

        let expected = FORCE_VELOCITY_DAMPING * FORCE_VELOCITY_DAMPING;
        assert!((ball.velocity.x - expected).abs() < 1e-6);

        let mut ball = BallBody::new(Vec3::ZERO, 0.5, 1.0).unwrap();
        let mass = ball.mass();
        ball.apply_force(mass * 2.0, 0.5);
        assert!((ball.velocity.y - 1.0 * FORCE_VELOCITY_DAMPING).abs() < 1e-6);
    }

    #[test]
    fn test_grab_suspends_integration() {
        let mut ball = BallBody::new(Vec3::new(0.0, 1.0, 0.0), 0.1, 1.0).unwrap();
        ball.start_grab(Vec3::new(0.5, 2.0, 0.5));
        assert!(ball.is_grabbed());

        ball.integrate(0.1, Vec3::new(0.0, -10.0, 0.0), &open_tank());
        assert_eq!(ball.position, Vec3::new(0.5, 2.0, 0.5));

        ball.move_grabbed(Vec3::new(1.0, 2.0, 1.0));
        assert_eq!(ball.position, Vec3::new(1.0, 2.0, 1.0));

        ball.end_grab(Vec3::new(1.0, 2.5, 1.0), Vec3::new(0.0, 3.0, 0.0));
        assert!(!ball.is_grabbed());
        assert_eq!(ball.velocity, Vec3::new(0.0, 3.0, 0.0));

        ball.move_grabbed(Vec3::ZERO);
        assert_eq!(ball.position, Vec3::new(1.0, 2.5, 1.0));
    }

    #[test]
    fn test_ray_hit() {
        let ball = BallBody::new(Vec3::new(0.0, 0.0, -5.0), 1.0, 1.0).unwrap();

        let hit = ball.ray_hit(&Ray3d::new(Vec3::ZERO, Dir3::NEG_Z)).unwrap();
        assert!((hit - 4.0).abs() < 1e-5);

        assert!(ball.ray_hit(&Ray3d::new(Vec3::ZERO, Dir3::Z)).is_none());
        assert!(ball
            .ray_hit(&Ray3d::new(Vec3::new(0.0, 2.0, 0.0), Dir3::NEG_Z))
            .is_none());

        let inside = ball
            .ray_hit(&Ray3d::new(Vec3::new(0.0, 0.0, -5.0), Dir3::X))
            .unwrap();
        assert!((inside - 1.0).abs() < 1e-5);
    }
}
