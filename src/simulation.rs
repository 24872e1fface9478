use glam::Vec3;
use hecs::Entity;
use tracing::{debug, trace};

use crate::components::MovementInput;
use crate::config::MovementConfig;
use crate::engine::time::FixedStep;
use crate::error::{SimError, SimResult};
use crate::events::SimEvent;
use crate::movement::MovementController;
use crate::systems::{PhysicsWorld, TickReport};

/// Owns the physics world, every movement controller and the event log.
///
/// Frame time is split into fixed ticks. Per tick every controller runs
/// (read physics, state machine, write physics), then the physics world
/// integrates and resolves collisions, then landings go back to their
/// controllers.
pub struct Simulation {
    physics: PhysicsWorld,
    controllers: Vec<MovementController>,
    step: FixedStep,
    events: Vec<SimEvent>,
    ticks: u64,
}

impl Simulation {
    pub fn new(physics: PhysicsWorld) -> Self {
        let step = FixedStep::from_config(physics.config());
        Self { physics, controllers: Vec::new(), step, events: Vec::new(), ticks: 0 }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Spawn a controlled body.
    pub fn add_controller(&mut self, position: Vec3, config: MovementConfig) -> SimResult<Entity> {
        let controller = MovementController::new(&mut self.physics, position, config)?;
        let entity = controller.entity();
        self.controllers.push(controller);
        Ok(entity)
    }

    pub fn remove_controller(&mut self, entity: Entity) -> SimResult<()> {
        let index = self
            .controllers
            .iter()
            .position(|c| c.entity() == entity)
            .ok_or(SimError::UnknownEntity(entity))?;
        self.controllers.swap_remove(index).dispose(&mut self.physics)
    }

    pub fn controller(&self, entity: Entity) -> Option<&MovementController> {
        self.controllers.iter().find(|c| c.entity() == entity)
    }

    pub fn controller_mut(&mut self, entity: Entity) -> Option<&mut MovementController> {
        self.controllers.iter_mut().find(|c| c.entity() == entity)
    }

    pub fn set_input(&mut self, entity: Entity, input: MovementInput) -> SimResult<()> {
        let controller = self.controller_mut(entity).ok_or(SimError::UnknownEntity(entity))?;
        controller.set_input(input);
        Ok(())
    }

    /// Feed one frame of wall time; runs however many fixed ticks it covers.
    pub fn advance(&mut self, frame_dt: f32) -> SimResult<u32> {
        let ticks = self.step.advance(frame_dt);
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(ticks)
    }

    /// One fixed tick.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        let dt = self.step.step;
        for controller in &mut self.controllers {
            controller.update(&mut self.physics, dt, &mut self.events)?;
        }

        let report = self.physics.update(dt)?;
        for landing in &report.landings {
            let owner = self.controllers.iter_mut().find(|c| c.entity() == landing.entity);
            if let Some(controller) = owner {
                controller.notify_landed(landing);
            }
            debug!(
                entity = ?landing.entity,
                impact = landing.impact_force,
                surface = landing.surface.name(),
                "landing"
            );
            self.events.push(SimEvent::Landed(*landing));
        }
        self.ticks += 1;
        trace!(tick = self.ticks, "simulation tick");
        Ok(report)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds.
    pub fn time(&self) -> f64 {
        self.physics.clock()
    }

    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
