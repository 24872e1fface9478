use glam::Vec3;
use hecs::{Entity, World};
use tracing::{error, trace};

use super::collision::collision_system;
use super::{forces, ground, momentum};
use crate::components::{
    BodyDesc, CollisionBody, CollisionEvent, MovementState, PhysicsState, SkiingState, SlopeData,
};
use crate::config::PhysicsConfig;
use crate::engine::time::clamp_step;
use crate::error::{SimError, SimResult};
use crate::events::LandingEvent;
use crate::terrain::{TerrainProvider, TerrainSample};

/// What one physics tick produced.
#[derive(Debug, Default)]
pub struct TickReport {
    /// The dt actually integrated, after clamping.
    pub dt: f32,
    pub landings: Vec<LandingEvent>,
    pub collisions: Vec<CollisionEvent>,
}

/// Authoritative per-entity integrator.
///
/// Owns every [`PhysicsState`] (plus the optional [`SkiingState`] and
/// [`CollisionBody`]) as components in a private `hecs::World`. It is the only
/// writer of those records; controllers go through the setters below.
pub struct PhysicsWorld {
    world: World,
    terrain: Box<dyn TerrainProvider>,
    config: PhysicsConfig,
    /// Seconds integrated so far.
    clock: f64,
}

impl PhysicsWorld {
    pub fn new(config: PhysicsConfig, terrain: Box<dyn TerrainProvider>) -> Self {
        Self { world: World::new(), terrain, config, clock: 0.0 }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn terrain(&self) -> &dyn TerrainProvider {
        &*self.terrain
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Register a body. Mass must be positive and finite.
    pub fn add_entity(&mut self, desc: BodyDesc) -> SimResult<Entity> {
        if !(desc.mass.is_finite() && desc.mass > 0.0) {
            return Err(SimError::InvalidMass { mass: desc.mass });
        }
        Ok(self.world.spawn((PhysicsState::from_desc(&desc),)))
    }

    pub fn remove_entity(&mut self, entity: Entity) -> SimResult<()> {
        self.world.despawn(entity).map_err(|_| SimError::UnknownEntity(entity))
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Opt an entity into sphere collision.
    pub fn attach_collider(&mut self, entity: Entity, body: CollisionBody) -> SimResult<()> {
        self.world.insert_one(entity, body).map_err(|_| SimError::UnknownEntity(entity))
    }

    pub fn collider(&self, entity: Entity) -> Option<CollisionBody> {
        self.world.get::<&CollisionBody>(entity).ok().map(|c| *c)
    }

    /// Snapshot of an entity's physics state.
    pub fn state(&self, entity: Entity) -> SimResult<PhysicsState> {
        self.world
            .get::<&PhysicsState>(entity)
            .map(|s| (*s).clone())
            .map_err(|_| SimError::UnknownEntity(entity))
    }

    pub fn skiing_state(&self, entity: Entity) -> Option<SkiingState> {
        self.world.get::<&SkiingState>(entity).ok().map(|s| *s)
    }

    fn with_state<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut PhysicsState) -> R,
    ) -> SimResult<R> {
        let mut state = self
            .world
            .get::<&mut PhysicsState>(entity)
            .map_err(|_| SimError::UnknownEntity(entity))?;
        Ok(f(&mut state))
    }

    pub fn set_velocity(&mut self, entity: Entity, velocity: Vec3) -> SimResult<()> {
        if !velocity.is_finite() {
            error!(?entity, %velocity, "refusing non-finite velocity");
            return Err(SimError::NonFinite { entity, quantity: "velocity", value: velocity });
        }
        self.with_state(entity, |s| s.velocity = velocity)
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> SimResult<()> {
        if !position.is_finite() {
            error!(?entity, %position, "refusing non-finite position");
            return Err(SimError::NonFinite { entity, quantity: "position", value: position });
        }
        self.with_state(entity, |s| s.position = position)
    }

    pub fn set_grounded(&mut self, entity: Entity, grounded: bool, normal: Vec3) -> SimResult<()> {
        self.with_state(entity, |s| {
            s.grounded = grounded;
            s.ground_normal = if grounded { normal } else { Vec3::Y };
            s.slope = grounded.then(|| ground::slope_from_normal(normal));
        })
    }

    /// Turn the skiing flag on or off. `degraded` marks skiing below the
    /// minimum ski angle.
    pub fn set_skiing(&mut self, entity: Entity, skiing: bool, degraded: bool) -> SimResult<()> {
        if !self.world.contains(entity) {
            return Err(SimError::UnknownEntity(entity));
        }
        if let Ok(mut ski) = self.world.get::<&mut SkiingState>(entity) {
            ski.is_skiing = skiing;
            ski.degraded = skiing && degraded;
            if !skiing {
                ski.edge_angle = 0.0;
            }
            return Ok(());
        }
        if skiing {
            let ski = SkiingState {
                is_skiing: true,
                degraded,
                turn_radius: f32::INFINITY,
                ..Default::default()
            };
            self.world.insert_one(entity, ski).map_err(|_| SimError::UnknownEntity(entity))?;
        }
        Ok(())
    }

    pub fn set_edge_angle(&mut self, entity: Entity, edge_angle: f32) -> SimResult<()> {
        if let Ok(mut ski) = self.world.get::<&mut SkiingState>(entity) {
            ski.edge_angle = if ski.is_skiing { edge_angle } else { 0.0 };
        }
        Ok(())
    }

    /// Slope data for a world position, straight from the terrain provider.
    pub fn slope_at(&self, position: Vec3) -> SlopeData {
        let sample = TerrainSample::query(&*self.terrain, position);
        ground::slope_from_normal(sample.normal)
    }

    /// Scale momentum for a movement-state change; landings also rebuild the
    /// velocity. Called by the movement controller on every transition.
    pub fn apply_state_transition(
        &mut self,
        entity: Entity,
        from: MovementState,
        to: MovementState,
    ) -> SimResult<()> {
        let clock = self.clock;
        let mut state = self
            .world
            .get::<&mut PhysicsState>(entity)
            .map_err(|_| SimError::UnknownEntity(entity))?;
        momentum::apply_transition(&mut state, from, to, &self.config, clock);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance every registered body by `dt` (clamped to the max step), then
    /// resolve collisions on the integrated positions.
    ///
    /// Non-finite forces, velocities or positions abort the tick with
    /// [`SimError::NonFinite`].
    pub fn update(&mut self, dt: f32) -> SimResult<TickReport> {
        let dt = clamp_step(dt, &self.config);
        let mut report = TickReport { dt, ..Default::default() };

        let terrain = &*self.terrain;
        let config = &self.config;
        // Bodies still in the air after integration, with their vertical speed.
        let mut airborne = Vec::new();
        for (entity, (body, skiing)) in
            self.world.query_mut::<(&mut PhysicsState, Option<&mut SkiingState>)>()
        {
            if let Some(landing) = step_body(entity, body, skiing, terrain, config, dt)? {
                report.landings.push(landing);
            }
            if !body.grounded {
                airborne.push((entity, body.velocity.y));
            }
        }

        report.collisions = collision_system(&mut self.world);

        // Coming to rest on another body is a landing too.
        for (entity, vy) in airborne {
            let Ok(body) = self.world.get::<&PhysicsState>(entity) else {
                continue;
            };
            if body.grounded {
                report.landings.push(LandingEvent {
                    entity,
                    position: body.position,
                    velocity: body.velocity,
                    impact_force: (-vy).max(0.0),
                    surface: body.surface,
                });
            }
        }

        self.clock += f64::from(dt);
        trace!(
            dt,
            bodies = self.world.len(),
            landings = report.landings.len(),
            contacts = report.collisions.len(),
            "physics tick"
        );
        Ok(report)
    }
}

/// Steps 1-6 of a tick for one body: ground probe, forces, integration,
/// momentum conservation, skiing bookkeeping, landing detection.
fn step_body(
    entity: Entity,
    body: &mut PhysicsState,
    mut skiing: Option<&mut SkiingState>,
    terrain: &dyn TerrainProvider,
    cfg: &PhysicsConfig,
    dt: f32,
) -> SimResult<Option<LandingEvent>> {
    let was_grounded = body.grounded;
    // Handlers write horizontal velocities; keep them on the ground unless
    // something pushed the body up (jump, jetpack kick).
    if was_grounded && body.velocity.y <= cfg.liftoff_speed {
        body.velocity = ground::follow_surface(body.velocity, body.ground_normal);
    }
    let prev_velocity = body.velocity;
    let prev_speed = prev_velocity.length();

    let sample = TerrainSample::query(terrain, body.position);
    let impact = ground::settle(body, sample, cfg);

    let force = forces::accumulate(body, skiing.as_deref_mut(), cfg, dt);
    if !force.is_finite() {
        error!(?entity, %force, "force accumulation produced a non-finite value");
        return Err(SimError::NonFinite { entity, quantity: "force", value: force });
    }

    body.acceleration = force / body.mass;
    body.velocity += body.acceleration * dt;
    body.velocity = momentum::conserve(prev_velocity, body.velocity, body, cfg, dt);
    if body.grounded {
        body.velocity = ground::follow_surface(body.velocity, body.ground_normal);
    }
    body.position += body.velocity * dt;

    if !body.velocity.is_finite() {
        error!(?entity, velocity = %body.velocity, "integration produced a non-finite velocity");
        return Err(SimError::NonFinite { entity, quantity: "velocity", value: body.velocity });
    }
    if !body.position.is_finite() {
        error!(?entity, position = %body.position, "integration produced a non-finite position");
        return Err(SimError::NonFinite { entity, quantity: "position", value: body.position });
    }

    if let Some(ski) = skiing.filter(|s| s.is_skiing) {
        ski.speed = body.velocity.length();
        ski.slope_angle = body.slope.map_or(0.0, |s| s.angle);
    }

    momentum::track(&mut body.momentum, prev_speed, body.velocity, body.mass, cfg, dt);

    if body.grounded && !was_grounded {
        return Ok(Some(LandingEvent {
            entity,
            position: body.position,
            velocity: body.velocity,
            impact_force: impact,
            surface: body.surface,
        }));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{horizontal, Material};
    use crate::config::SurfaceType;
    use crate::terrain::{FlatTerrain, SlopeTerrain};

    fn flat_world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsConfig::default(), Box::new(FlatTerrain::default()))
    }

    fn run(world: &mut PhysicsWorld, ticks: usize) -> Vec<TickReport> {
        let dt = world.config().fixed_dt;
        (0..ticks).map(|_| world.update(dt).unwrap()).collect()
    }

    #[test]
    fn rejects_non_positive_mass() {
        let mut world = flat_world();
        assert_eq!(
            world.add_entity(BodyDesc::new(Vec3::ZERO, 0.0)),
            Err(SimError::InvalidMass { mass: 0.0 })
        );
        assert!(world.add_entity(BodyDesc::new(Vec3::ZERO, -2.0)).is_err());
        assert!(world.is_empty());
    }

    #[test]
    fn removed_entity_is_unknown() {
        let mut world = flat_world();
        let e = world.add_entity(BodyDesc::new(Vec3::ZERO, 1.0)).unwrap();
        world.remove_entity(e).unwrap();
        assert_eq!(world.state(e).unwrap_err(), SimError::UnknownEntity(e));
        assert_eq!(world.remove_entity(e), Err(SimError::UnknownEntity(e)));
    }

    #[test]
    fn falling_body_lands_once_with_impact() {
        let mut world = flat_world();
        let e = world.add_entity(BodyDesc::new(Vec3::new(0.0, 5.0, 0.0), 80.0)).unwrap();
        let reports = run(&mut world, 180);
        let landings: Vec<_> = reports.iter().flat_map(|r| r.landings.iter()).collect();
        assert_eq!(landings.len(), 1);
        assert_eq!(landings[0].entity, e);
        assert!(landings[0].impact_force > 5.0);
        let state = world.state(e).unwrap();
        assert!(state.grounded);
        assert!(state.position.y.abs() < 0.25);
    }

    #[test]
    fn dt_is_clamped_on_hitches() {
        let mut world = flat_world();
        world.add_entity(BodyDesc::new(Vec3::new(0.0, 50.0, 0.0), 1.0)).unwrap();
        let report = world.update(1.0).unwrap();
        assert!((report.dt - world.config().max_step()).abs() < 1e-6);
    }

    #[test]
    fn skiing_body_accelerates_downhill() {
        let terrain = SlopeTerrain::new(20.0_f32.to_radians(), 200.0, SurfaceType::Snow);
        let top = terrain.top_height;
        let mut world = PhysicsWorld::new(PhysicsConfig::default(), Box::new(terrain));
        let e = world.add_entity(BodyDesc::new(Vec3::new(1.0, top, 0.0), 80.0)).unwrap();
        world.set_skiing(e, true, false).unwrap();
        run(&mut world, 120);
        let state = world.state(e).unwrap();
        assert!(state.velocity.x > 3.0, "velocity {}", state.velocity);
        let ski = world.skiing_state(e).unwrap();
        assert!((ski.speed - state.velocity.length()).abs() < 1e-4);
        assert!(ski.slope_angle > 0.3);
    }

    #[test]
    fn momentum_factor_stays_in_unit_range() {
        let mut world = flat_world();
        let material = Material { friction: 0.1, ..Default::default() };
        let e = world
            .add_entity(
                BodyDesc::new(Vec3::ZERO, 80.0)
                    .with_velocity(Vec3::new(12.0, 0.0, 0.0))
                    .with_material(material),
            )
            .unwrap();
        for _ in 0..600 {
            world.update(1.0 / 60.0).unwrap();
            let f = world.state(e).unwrap().momentum.factor;
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn non_finite_velocity_is_fatal() {
        let mut world = flat_world();
        let e = world.add_entity(BodyDesc::new(Vec3::ZERO, 1.0)).unwrap();
        let bad = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(matches!(world.set_velocity(e, bad), Err(SimError::NonFinite { .. })));
    }

    #[test]
    fn overflowing_force_aborts_the_tick() {
        let mut world = flat_world();
        let e = world
            .add_entity(BodyDesc::new(Vec3::new(0.0, 10.0, 0.0), 1.0)
                .with_velocity(Vec3::new(f32::MAX, 0.0, 0.0)))
            .unwrap();
        let err = world.update(1.0 / 60.0).unwrap_err();
        assert!(matches!(err, SimError::NonFinite { entity, .. } if entity == e));
    }

    #[test]
    fn collisions_run_after_integration() {
        let mut world = flat_world();
        let a = world
            .add_entity(BodyDesc::new(Vec3::new(0.0, 5.0, 0.0), 10.0)
                .with_velocity(Vec3::new(4.0, 0.0, 0.0)))
            .unwrap();
        let b = world
            .add_entity(BodyDesc::new(Vec3::new(1.2, 5.0, 0.0), 10.0)
                .with_velocity(Vec3::new(-4.0, 0.0, 0.0)))
            .unwrap();
        world.attach_collider(a, CollisionBody::sphere(0.5)).unwrap();
        world.attach_collider(b, CollisionBody::sphere(0.5)).unwrap();

        // 0.2 gap closes at 8 m/s within two ticks.
        let reports = run(&mut world, 3);
        assert!(reports.iter().any(|r| !r.collisions.is_empty()));
        assert!(world.state(a).unwrap().velocity.x < 0.0);
        assert!(world.state(b).unwrap().velocity.x > 0.0);
    }

    #[test]
    fn coming_to_rest_on_another_body_is_a_landing() {
        let mut world = flat_world();
        let base = world.add_entity(BodyDesc::new(Vec3::new(0.0, 20.0, 0.0), 500.0)).unwrap();
        let top = world
            .add_entity(BodyDesc::new(Vec3::new(0.0, 20.95, 0.0), 80.0)
                .with_velocity(Vec3::new(0.0, -3.0, 0.0)))
            .unwrap();
        world.attach_collider(base, CollisionBody::sphere(0.5)).unwrap();
        world.attach_collider(top, CollisionBody::sphere(0.5)).unwrap();

        let report = world.update(1.0 / 60.0).unwrap();
        assert!(!report.collisions.is_empty());
        let landing = report.landings.iter().find(|l| l.entity == top).unwrap();
        assert!(landing.impact_force > 3.0);
        assert!(world.state(top).unwrap().grounded);
        assert!(!world.state(base).unwrap().grounded);
        assert!(report.landings.iter().all(|l| l.entity != base));
    }

    #[test]
    fn landing_transition_keeps_horizontal_velocity() {
        let mut world = flat_world();
        let e = world.add_entity(BodyDesc::new(Vec3::ZERO, 80.0)).unwrap();
        world.set_velocity(e, Vec3::new(7.0, -4.0, 1.0)).unwrap();
        world.apply_state_transition(e, MovementState::Flying, MovementState::Running).unwrap();
        let v = world.state(e).unwrap().velocity;
        assert_eq!(horizontal(v), Vec3::new(7.0, 0.0, 1.0));
        assert_eq!(v.y, world.config().landing_lift);
    }
}
