pub mod ball;
pub mod collision;
pub mod grab;

pub use ball::BallBody;
pub use collision::{resolve_pair, CollisionResolver};
pub use grab::{closest_hit, Grabber};
