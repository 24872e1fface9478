pub mod demo;
pub mod prefabs;

pub use demo::{build_demo, DemoOptions};
