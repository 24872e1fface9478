//! Movement simulation for a skiing/jetpack character on terrain.
//!
//! A [`simulation::Simulation`] owns one [`systems::PhysicsWorld`] and any
//! number of [`movement::MovementController`]s. Each controller runs a
//! four-state machine (running, skiing, flying, jetpacking) over a snapshot of
//! its body and writes the resulting velocity back before physics integrates.

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod fsm;
pub mod movement;
pub mod scene;
pub mod simulation;
pub mod systems;
pub mod terrain;
