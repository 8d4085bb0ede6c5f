use bevy::math::{Ray3d, Vec3};
use bevy_log::debug;

use super::ball::BallBody;

/// Index and ray distance of the ball closest to the ray origin.
pub fn closest_hit(balls: &[BallBody], ray: &Ray3d) -> Option<(usize, f32)> {
    balls
        .iter()
        .enumerate()
        .filter_map(|(index, ball)| ball.ray_hit(ray).map(|distance| (index, distance)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Drags a single ball along a pointer ray.
///
/// The ball keeps the distance from the ray origin it was grabbed at. On
/// release it is thrown with the velocity of its last movement.
#[derive(Debug, Clone, Default)]
pub struct Grabber {
    grabbed: Option<usize>,
    grab_distance: f32,
    last_grab_position: Vec3,
}

impl Grabber {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn grabbed(&self) -> Option<usize> {
        self.grabbed
    }

    /// Grabs the closest ball hit by `ray`. Does nothing while already holding one.
    pub fn start(&mut self, balls: &mut [BallBody], ray: &Ray3d) -> Option<usize> {
        if self.grabbed.is_some() {
            return None;
        }

        let (index, distance) = closest_hit(balls, ray)?;
        let hit_position = ray.get_point(distance);

        balls[index].start_grab(hit_position);
        self.grabbed = Some(index);
        self.grab_distance = distance;
        self.last_grab_position = hit_position;

        debug!("Grabbed ball {} at distance {:.3}", index, distance);
        Some(index)
    }

    /// Moves the held ball to the grab distance along `ray`.
    pub fn drag(&mut self, balls: &mut [BallBody], ray: &Ray3d) {
        let Some(ball) = self.grabbed.and_then(|index| balls.get_mut(index)) else {
            return;
        };

        self.last_grab_position = ball.position;
        ball.move_grabbed(ray.get_point(self.grab_distance));
    }

    /// Lets go of the held ball and returns the velocity it was thrown with.
    ///
    /// The velocity covers the path from where the ball sat before the last
    /// drag to the release point, over `dt`. It is zero when `dt` is not positive.
    pub fn release(&mut self, balls: &mut [BallBody], ray: &Ray3d, dt: f32) -> Option<Vec3> {
        let index = self.grabbed.take()?;
        let ball = balls.get_mut(index)?;

        let release_position = ray.get_point(self.grab_distance);
        let velocity = if dt > 0.0 {
            (release_position - self.last_grab_position) / dt
        } else {
            Vec3::ZERO
        };

        ball.end_grab(release_position, velocity);
        debug!("Released ball {} with velocity {:?}", index, velocity);
        Some(velocity)
    }
}
