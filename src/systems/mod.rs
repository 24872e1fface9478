pub mod collision;
pub mod forces;
pub mod ground;
pub mod momentum;
mod physics;

pub use collision::collision_system;
pub use physics::{PhysicsWorld, TickReport};
