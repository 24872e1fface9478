use glam::Vec3;
use hecs::Entity;
use tracing::{debug, trace, warn};

use super::{ActionOutcome, DeclineReason, JumpGate, MovementStateMachine, StateChange};
use crate::components::{
    BodyDesc, CollisionBody, MovementInput, MovementState, MovementStateContext, TerrainData,
};
use crate::config::{MovementConfig, SurfaceTable};
use crate::engine::input::InputState;
use crate::error::SimResult;
use crate::events::{EventSink, LandingEvent, SimEvent};
use crate::systems::ground::slope_from_normal;
use crate::systems::PhysicsWorld;

/// Per-entity façade binding input, the movement state machine and the
/// physics world.
///
/// Each tick: read physics → edge-triggered actions → state machine → write
/// velocity back → momentum hand-off on transitions → energy bookkeeping.
pub struct MovementController {
    entity: Entity,
    config: MovementConfig,
    machine: MovementStateMachine,
    context: MovementStateContext,
    input: InputState,
    jump_gate: JumpGate,
    /// Seconds this controller has been updated for.
    clock: f64,
    surfaces: SurfaceTable,
    last_landing: Option<LandingEvent>,
}

impl MovementController {
    /// Register a body at `position` and build the default state machine.
    pub fn new(
        physics: &mut PhysicsWorld,
        position: Vec3,
        config: MovementConfig,
    ) -> SimResult<Self> {
        let surfaces = physics.config().surfaces.clone();
        let machine = MovementStateMachine::with_default_transitions(&config, &surfaces)?;

        let entity = physics.add_entity(BodyDesc::new(position, config.mass))?;
        physics.attach_collider(entity, CollisionBody::sphere(config.collision_radius))?;

        let mut context = MovementStateContext::new(&config);
        context.position = position;
        debug!(?entity, %position, "movement controller registered");

        Ok(Self {
            entity,
            jump_gate: JumpGate::new(config.jump_cooldown),
            config,
            machine,
            context,
            input: InputState::new(),
            clock: 0.0,
            surfaces,
            last_landing: None,
        })
    }

    /// Deregister the body. The controller is consumed.
    pub fn dispose(self, physics: &mut PhysicsWorld) -> SimResult<()> {
        debug!(entity = ?self.entity, "movement controller disposed");
        physics.remove_entity(self.entity)
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn state(&self) -> MovementState {
        self.machine.current_state()
    }

    pub fn context(&self) -> &MovementStateContext {
        &self.context
    }

    pub fn machine(&self) -> &MovementStateMachine {
        &self.machine
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn energy(&self) -> f32 {
        self.context.energy
    }

    pub fn last_landing(&self) -> Option<&LandingEvent> {
        self.last_landing.as_ref()
    }

    pub fn set_input(&mut self, input: MovementInput) {
        self.input.update(input);
        self.context.input = input;
    }

    pub fn set_max_energy(&mut self, max_energy: f32) {
        if !max_energy.is_finite() || max_energy < 0.0 {
            warn!(entity = ?self.entity, max_energy, "energy cap out of range, clamping");
        }
        self.context.set_max_energy(max_energy);
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&StateChange) + 'static) {
        self.machine.subscribe(observer);
    }

    /// Landing cue from the physics world.
    pub fn notify_landed(&mut self, landing: &LandingEvent) {
        if landing.entity != self.entity {
            return;
        }
        self.context.grounded = true;
        self.last_landing = Some(*landing);
        debug!(entity = ?self.entity, impact = landing.impact_force, "landed");
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        dt: f32,
        events: &mut dyn EventSink,
    ) -> SimResult<()> {
        self.clock += f64::from(dt);
        self.sync_from_physics(physics)?;
        self.context.input = self.input.current;

        if self.input.jump_pressed() {
            if let ActionOutcome::Declined(reason) = self.jump(physics, events)? {
                trace!(entity = ?self.entity, ?reason, "jump declined");
            }
        }

        let change = self.machine.update(&mut self.context, dt);
        physics.set_velocity(self.entity, self.context.velocity)?;
        if let Some(change) = change {
            self.after_transition(physics, &change, events)?;
        }

        self.steer_skis(physics)?;
        self.tick_energy(dt);
        self.input.latch();
        Ok(())
    }

    fn sync_from_physics(&mut self, physics: &PhysicsWorld) -> SimResult<()> {
        let body = physics.state(self.entity)?;
        let ctx = &mut self.context;
        ctx.position = body.position;
        ctx.velocity = body.velocity;
        ctx.acceleration = body.acceleration;
        ctx.grounded = body.grounded;

        // Contacts resolved by the collision pass carry a normal but no slope.
        let slope = body
            .slope
            .or_else(|| body.grounded.then(|| slope_from_normal(body.ground_normal)));
        ctx.terrain = slope.filter(|_| body.grounded).map(|slope| TerrainData {
            normal: body.ground_normal,
            surface: body.surface,
            friction: self.surfaces.get(body.surface).friction,
            slope_angle: slope.angle,
            downhill: slope.downhill,
        });
        Ok(())
    }

    /// Momentum hand-off, skiing flag and notifications for a state change
    /// that has already happened in the machine.
    fn after_transition(
        &mut self,
        physics: &mut PhysicsWorld,
        change: &StateChange,
        events: &mut dyn EventSink,
    ) -> SimResult<()> {
        let entity = self.entity;
        physics.apply_state_transition(entity, change.previous, change.new)?;
        self.context.velocity = physics.state(entity)?.velocity;

        if change.previous == MovementState::Skiing {
            physics.set_skiing(entity, false, false)?;
        }

        let (position, velocity) = (self.context.position, self.context.velocity);
        match change.new {
            MovementState::Skiing => {
                let degraded = self.ski_degraded(physics);
                physics.set_skiing(entity, true, degraded)?;
                events.emit(SimEvent::SkiStarted { entity, position, velocity, degraded });
            }
            MovementState::Jetpacking => {
                events.emit(SimEvent::JetpackStarted { entity, position, velocity });
            }
            MovementState::Running | MovementState::Flying => {}
        }
        events.emit(SimEvent::StateChanged {
            entity,
            previous: change.previous,
            new: change.new,
        });
        Ok(())
    }

    fn ski_degraded(&self, physics: &PhysicsWorld) -> bool {
        physics.slope_at(self.context.position).angle < self.config.min_ski_angle
    }

    fn steer_skis(&mut self, physics: &mut PhysicsWorld) -> SimResult<()> {
        if self.state() != MovementState::Skiing {
            return Ok(());
        }
        let (_, lateral) = self.context.input.axes();
        physics.set_edge_angle(self.entity, lateral * self.config.max_edge_angle)
    }

    /// Jetpack use holds regeneration off for `regen_delay` seconds. Running
    /// regenerates inside its handler; the other non-jetpack states here.
    fn tick_energy(&mut self, dt: f32) {
        let ctx = &mut self.context;
        match self.machine.current_state() {
            MovementState::Jetpacking => ctx.regen_cooldown = self.config.regen_delay,
            state => {
                let cooling = ctx.regen_cooldown > 0.0;
                ctx.regen_cooldown = (ctx.regen_cooldown - dt).max(0.0);
                if !cooling && state != MovementState::Running {
                    ctx.energy = (ctx.energy + ctx.energy_regen_rate * dt).min(ctx.max_energy);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Jump from the ground. Declines leave everything untouched.
    pub fn jump(
        &mut self,
        physics: &mut PhysicsWorld,
        events: &mut dyn EventSink,
    ) -> SimResult<ActionOutcome> {
        let state = self.state();
        if !self.context.grounded {
            return Ok(ActionOutcome::Declined(DeclineReason::Airborne));
        }
        if !state.is_ground_state() {
            return Ok(ActionOutcome::Declined(DeclineReason::WrongState(state)));
        }
        let remaining = self.jump_gate.remaining(self.clock);
        if remaining > 0.0 {
            return Ok(ActionOutcome::Declined(DeclineReason::Cooldown { remaining }));
        }

        let ctx = &mut self.context;
        let mut velocity = ctx.velocity;
        velocity.y = ctx.jump_force;
        if ctx.input.has_direction() {
            // Faster runners get a bigger hop.
            let boost =
                self.config.jump_min_boost + self.config.jump_speed_boost * ctx.horizontal_speed();
            velocity += ctx.input.wish_dir() * boost;
        }
        ctx.velocity = velocity;
        ctx.grounded = false;
        ctx.jumping = true;
        let change = self.machine.transition_to(&mut self.context, MovementState::Flying, "jump");
        self.context.jumping = false;
        self.jump_gate.record(self.clock);

        physics.set_velocity(self.entity, self.context.velocity)?;
        physics.set_grounded(self.entity, false, Vec3::Y)?;
        if let Some(change) = change {
            self.after_transition(physics, &change, events)?;
        }

        let (position, velocity) = (self.context.position, self.context.velocity);
        debug!(entity = ?self.entity, %velocity, "jump");
        events.emit(SimEvent::Jumped { entity: self.entity, position, velocity });
        Ok(ActionOutcome::Performed)
    }

    /// Start skiing from a run. Flat ground is allowed but skis with extra
    /// friction. Skiing lasts while the ski input is held.
    pub fn start_skiing(
        &mut self,
        physics: &mut PhysicsWorld,
        events: &mut dyn EventSink,
    ) -> SimResult<ActionOutcome> {
        let state = self.state();
        if !self.context.grounded {
            return Ok(ActionOutcome::Declined(DeclineReason::Airborne));
        }
        if state != MovementState::Running {
            return Ok(ActionOutcome::Declined(DeclineReason::WrongState(state)));
        }
        if self.ski_degraded(physics) {
            debug!(entity = ?self.entity, "skiing below the minimum angle");
        }
        self.force_state(physics, MovementState::Skiing, "ski", events)?;
        Ok(ActionOutcome::Performed)
    }

    pub fn start_jetpack(
        &mut self,
        physics: &mut PhysicsWorld,
        events: &mut dyn EventSink,
    ) -> SimResult<ActionOutcome> {
        if self.state() == MovementState::Jetpacking {
            return Ok(ActionOutcome::Declined(DeclineReason::AlreadyActive));
        }
        let (energy, required) = (self.context.energy, self.config.min_jetpack_energy);
        if energy < required {
            let reason = DeclineReason::InsufficientEnergy { energy, required };
            return Ok(ActionOutcome::Declined(reason));
        }
        self.force_state(physics, MovementState::Jetpacking, "jetpack", events)?;
        Ok(ActionOutcome::Performed)
    }

    fn force_state(
        &mut self,
        physics: &mut PhysicsWorld,
        state: MovementState,
        reason: &str,
        events: &mut dyn EventSink,
    ) -> SimResult<()> {
        let change = self.machine.transition_to(&mut self.context, state, reason);
        physics.set_velocity(self.entity, self.context.velocity)?;
        if let Some(change) = change {
            self.after_transition(physics, &change, events)?;
        }
        Ok(())
    }
}
