mod movement;
mod physics;

pub use movement::*;
pub use physics::*;
