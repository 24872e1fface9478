//! Static tuning for the physics world, the movement handlers and the
//! controller. Every struct has a `Default` with the shipped values; nothing
//! here is loaded from disk.

use crate::components::MovementState;

// ---------------------------------------------------------------------------
// Surfaces
// ---------------------------------------------------------------------------

/// Surface classification reported by the terrain provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SurfaceType {
    #[default]
    Default,
    Snow,
    Ice,
    Grass,
    Rock,
    Metal,
}

impl SurfaceType {
    pub const COUNT: usize = 6;
    pub const ALL: [SurfaceType; Self::COUNT] = [
        SurfaceType::Default,
        SurfaceType::Snow,
        SurfaceType::Ice,
        SurfaceType::Grass,
        SurfaceType::Rock,
        SurfaceType::Metal,
    ];

    pub fn index(self) -> usize {
        match self {
            Self::Default => 0,
            Self::Snow => 1,
            Self::Ice => 2,
            Self::Grass => 3,
            Self::Rock => 4,
            Self::Metal => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Snow => "snow",
            Self::Ice => "ice",
            Self::Grass => "grass",
            Self::Rock => "rock",
            Self::Metal => "metal",
        }
    }
}

/// How one surface type treats a moving body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceProfile {
    /// Share of the previous tick's horizontal velocity carried forward by
    /// momentum conservation.
    pub momentum: f32,
    /// Multiplier on the body's material friction.
    pub friction: f32,
    /// Multiplier on the downhill skiing force.
    pub slope_factor: f32,
    /// How well running speed survives a change of input. Snow and ice are high,
    /// rock and metal low.
    pub retention: f32,
}

/// Per-surface table indexed by [`SurfaceType`].
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceTable([SurfaceProfile; SurfaceType::COUNT]);

impl SurfaceTable {
    pub fn new(profiles: [SurfaceProfile; SurfaceType::COUNT]) -> Self {
        Self(profiles)
    }

    pub fn get(&self, surface: SurfaceType) -> &SurfaceProfile {
        &self.0[surface.index()]
    }

    pub fn set(&mut self, surface: SurfaceType, profile: SurfaceProfile) {
        self.0[surface.index()] = profile;
    }
}

impl Default for SurfaceTable {
    fn default() -> Self {
        let p = |momentum, friction, slope_factor, retention| SurfaceProfile {
            momentum,
            friction,
            slope_factor,
            retention,
        };
        // Order follows SurfaceType::ALL.
        Self([
            p(0.80, 1.0, 1.0, 0.80),
            p(0.95, 0.4, 1.0, 0.90),
            p(0.99, 0.1, 1.2, 0.98),
            p(0.75, 0.8, 0.7, 0.75),
            p(0.60, 1.0, 0.6, 0.60),
            p(0.55, 0.7, 0.8, 0.50),
        ])
    }
}

// ---------------------------------------------------------------------------
// Transition factors
// ---------------------------------------------------------------------------

/// Momentum multiplier applied when the entity changes movement state,
/// indexed by `(from, to)`.
///
/// Built from a uniform default plus explicit overrides, so every pair has a
/// value by construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionFactors([[f32; MovementState::COUNT]; MovementState::COUNT]);

impl TransitionFactors {
    pub fn uniform(factor: f32) -> Self {
        Self([[factor; MovementState::COUNT]; MovementState::COUNT])
    }

    pub fn with(mut self, from: MovementState, to: MovementState, factor: f32) -> Self {
        self.set(from, to, factor);
        self
    }

    pub fn set(&mut self, from: MovementState, to: MovementState, factor: f32) {
        self.0[from.index()][to.index()] = factor;
    }

    pub fn get(&self, from: MovementState, to: MovementState) -> f32 {
        self.0[from.index()][to.index()]
    }
}

impl Default for TransitionFactors {
    fn default() -> Self {
        use MovementState::*;
        Self::uniform(0.9)
            .with(Running, Skiing, 1.0)
            .with(Skiing, Running, 0.8)
            .with(Running, Flying, 1.0)
            .with(Skiing, Flying, 1.0)
            .with(Flying, Running, 1.0)
            .with(Flying, Skiing, 1.0)
            .with(Jetpacking, Flying, 0.95)
            .with(Jetpacking, Running, 0.85)
            .with(Jetpacking, Skiing, 0.95)
            .with(Running, Jetpacking, 1.0)
            .with(Skiing, Jetpacking, 1.0)
            .with(Flying, Jetpacking, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Physics
// ---------------------------------------------------------------------------

/// Tuning for the physics world.
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Gravity acceleration (m/s²).
    pub gravity: f32,
    /// Nominal fixed step (seconds).
    pub fixed_dt: f32,
    /// A single update never integrates more than `fixed_dt * max_step_multiplier`.
    pub max_step_multiplier: f32,

    // Ground probe
    /// Feet within this distance above the ground height count as grounded.
    pub ground_snap_distance: f32,
    /// Upward speed above which the probe treats the body as leaving the ground.
    pub liftoff_speed: f32,
    /// Vertical speed given on landing so the next probe does not flag airborne.
    pub landing_lift: f32,

    // Skiing
    /// Minimum slope angle (radians) for the downhill skiing force.
    pub min_ski_angle: f32,
    /// Ground friction coefficient while skiing on a proper slope.
    pub ski_friction: f32,
    /// Friction multiplier for skiing below `min_ski_angle`.
    pub degraded_ski_friction: f32,
    pub turn_base_radius: f32,
    pub turn_reference_speed: f32,

    // Drag
    pub drag_coefficient: f32,
    pub cross_section_area: f32,
    pub air_density: f32,

    /// Horizontal speed cap applied after momentum conservation.
    pub max_speed: f32,

    // Momentum
    /// Below this horizontal speed (both ticks) momentum conservation is skipped.
    pub min_momentum_speed: f32,
    /// Weight of the direction-change penalty.
    pub direction_change_penalty: f32,
    /// Multiplier (> 1) when moving downhill.
    pub downhill_boost: f32,
    /// Multiplier (< 1) when moving uphill.
    pub uphill_retention: f32,
    /// Per-second decay of the running momentum factor while slowing.
    pub momentum_decay_rate: f32,
    /// Per-second growth of the running momentum factor while speeding up.
    pub momentum_growth_rate: f32,

    pub surfaces: SurfaceTable,
    pub transitions: TransitionFactors,
}

impl PhysicsConfig {
    /// Largest dt a single update integrates.
    pub fn max_step(&self) -> f32 {
        self.fixed_dt * self.max_step_multiplier
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            fixed_dt: 1.0 / 60.0,
            max_step_multiplier: 3.0,

            ground_snap_distance: 0.25,
            liftoff_speed: 1.0,
            landing_lift: 0.01,

            min_ski_angle: 5.0_f32.to_radians(),
            ski_friction: 0.05,
            degraded_ski_friction: 4.0,
            turn_base_radius: 12.0,
            turn_reference_speed: 10.0,

            drag_coefficient: 0.5,
            cross_section_area: 0.6,
            air_density: 1.225,

            max_speed: 60.0,

            min_momentum_speed: 2.0,
            direction_change_penalty: 1.0,
            downhill_boost: 1.2,
            uphill_retention: 0.7,
            momentum_decay_rate: 0.5,
            momentum_growth_rate: 0.25,

            surfaces: SurfaceTable::default(),
            transitions: TransitionFactors::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Constants owned by the individual state handlers.
#[derive(Clone, Debug)]
pub struct HandlerTuning {
    // Running
    /// Base rate of the exponential approach toward the desired run velocity.
    pub ground_acceleration: f32,

    // Skiing
    pub ski_friction: f32,
    pub steer_acceleration: f32,
    /// Friction multiplier when skiing below the minimum ski angle.
    pub flat_ski_penalty: f32,
    /// Downhill speed added per unit of `sin(angle)` when landing into skiing.
    pub ski_landing_boost: f32,
    /// Fixed downhill push when starting to ski from a run.
    pub ski_entry_push: f32,
    /// Skiing → Running needs slope below the minimum, speed below this...
    pub flat_exit_speed: f32,
    /// ...and at least this long in the skiing state.
    pub flat_exit_time: f32,

    // Air
    /// Isotropic velocity decay per second.
    pub air_resistance: f32,
    /// Share of the current heading kept when steering in the air.
    pub air_momentum_retention: f32,
    pub air_steer_rate: f32,

    // Jetpack
    /// How far thrust leans from straight up toward the input direction.
    pub jetpack_blend: f32,
    /// Horizontal clamp multiplier right after entering the jetpack state.
    pub max_momentum_boost: f32,
    pub momentum_boost_window: f32,
    pub jetpack_fall_kick: f32,
    pub jetpack_rise_kick: f32,
    pub jetpack_exit_kick: f32,
}

impl Default for HandlerTuning {
    fn default() -> Self {
        Self {
            ground_acceleration: 10.0,

            ski_friction: 0.15,
            steer_acceleration: 8.0,
            flat_ski_penalty: 4.0,
            ski_landing_boost: 6.0,
            ski_entry_push: 1.5,
            flat_exit_speed: 2.0,
            flat_exit_time: 1.0,

            air_resistance: 0.02,
            air_momentum_retention: 0.85,
            air_steer_rate: 6.0,

            jetpack_blend: 0.3,
            max_momentum_boost: 1.5,
            momentum_boost_window: 0.5,
            jetpack_fall_kick: 0.2,
            jetpack_rise_kick: 0.1,
            jetpack_exit_kick: 0.05,
        }
    }
}

/// Per-entity movement tuning: context defaults, controller rules and the
/// handler constants.
#[derive(Clone, Debug)]
pub struct MovementConfig {
    pub gravity: f32,
    pub jump_force: f32,
    pub run_speed: f32,
    /// 0.0 = no air control, 1.0 = full control.
    pub air_control: f32,
    pub jetpack_force: f32,
    pub max_speed: f32,
    pub min_ski_angle: f32,

    // Energy
    pub max_energy: f32,
    pub energy_use_rate: f32,
    pub energy_regen_rate: f32,
    /// Seconds after jetpack use before regeneration resumes.
    pub regen_delay: f32,
    /// Energy needed to start the jetpack from the controller.
    pub min_jetpack_energy: f32,

    // Jump
    pub jump_cooldown: f32,
    pub jump_min_boost: f32,
    /// Extra horizontal boost per unit of current horizontal speed.
    pub jump_speed_boost: f32,

    /// Edge angle (radians) at full lateral input while skiing.
    pub max_edge_angle: f32,

    // Body registered with the physics world
    pub mass: f32,
    pub collision_radius: f32,

    pub tuning: HandlerTuning,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gravity: 9.81,
            jump_force: 8.0,
            run_speed: 10.0,
            air_control: 0.3,
            jetpack_force: 20.0,
            max_speed: 30.0,
            min_ski_angle: 5.0_f32.to_radians(),

            max_energy: 100.0,
            energy_use_rate: 25.0,
            energy_regen_rate: 15.0,
            regen_delay: 1.0,
            min_jetpack_energy: 10.0,

            jump_cooldown: 0.2,
            jump_min_boost: 2.0,
            jump_speed_boost: 0.2,

            max_edge_angle: 0.6,

            mass: 80.0,
            collision_radius: 0.5,

            tuning: HandlerTuning::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_table_is_indexed_by_variant() {
        let table = SurfaceTable::default();
        for surface in SurfaceType::ALL {
            assert_eq!(SurfaceType::ALL[surface.index()], surface);
        }
        assert!(table.get(SurfaceType::Ice).momentum > table.get(SurfaceType::Rock).momentum);
        assert!(table.get(SurfaceType::Snow).retention > table.get(SurfaceType::Metal).retention);
    }

    #[test]
    fn transition_factors_cover_every_pair() {
        let factors = TransitionFactors::default();
        for from in MovementState::ALL {
            for to in MovementState::ALL {
                let f = factors.get(from, to);
                assert!((0.0..=1.0).contains(&f), "{from:?}->{to:?} = {f}");
            }
        }
        assert_eq!(factors.get(MovementState::Flying, MovementState::Running), 1.0);
        assert_eq!(factors.get(MovementState::Running, MovementState::Running), 0.9);
    }

    #[test]
    fn max_step_is_three_fixed_steps() {
        let cfg = PhysicsConfig::default();
        assert!((cfg.max_step() - 3.0 / 60.0).abs() < 1e-6);
    }
}
