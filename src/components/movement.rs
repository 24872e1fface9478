use glam::Vec3;

use crate::config::{MovementConfig, SurfaceType};

/// Largest magnitude any velocity component may take after a handler runs.
pub const VELOCITY_COMPONENT_LIMIT: f32 = 1_000.0;

// ---------------------------------------------------------------------------
// Movement states
// ---------------------------------------------------------------------------

/// The four locomotion modes. Exactly one is active per entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MovementState {
    Running,
    Skiing,
    Flying,
    Jetpacking,
}

impl MovementState {
    pub const COUNT: usize = 4;
    pub const ALL: [MovementState; Self::COUNT] = [
        MovementState::Running,
        MovementState::Skiing,
        MovementState::Flying,
        MovementState::Jetpacking,
    ];

    /// Dense index used by the typed lookup tables.
    pub fn index(self) -> usize {
        match self {
            Self::Running => 0,
            Self::Skiing => 1,
            Self::Flying => 2,
            Self::Jetpacking => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Skiing => "skiing",
            Self::Flying => "flying",
            Self::Jetpacking => "jetpacking",
        }
    }

    /// States that normally start from ground contact.
    pub fn is_ground_state(self) -> bool {
        matches!(self, Self::Running | Self::Skiing)
    }

    pub fn is_airborne(self) -> bool {
        matches!(self, Self::Flying | Self::Jetpacking)
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One tick of player (or AI) intent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovementInput {
    /// Forward axis in [-1, 1].
    pub forward: f32,
    /// Strafe axis in [-1, 1], positive to the right.
    pub right: f32,
    /// Facing yaw in radians; forward is `(cos yaw, 0, sin yaw)`.
    pub yaw: f32,
    pub jump: bool,
    pub ski: bool,
    pub jetpack: bool,
}

impl MovementInput {
    /// Axes clamped into [-1, 1].
    pub fn axes(&self) -> (f32, f32) {
        (self.forward.clamp(-1.0, 1.0), self.right.clamp(-1.0, 1.0))
    }

    pub fn has_direction(&self) -> bool {
        let (f, r) = self.axes();
        f != 0.0 || r != 0.0
    }

    /// Horizontal world-space direction the input points at, unit length or zero.
    pub fn wish_dir(&self) -> Vec3 {
        let (f, r) = self.axes();
        let forward = Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin());
        let right = forward.cross(Vec3::Y);
        (forward * f + right * r).normalize_or_zero()
    }

    /// Unit vector to the right of the facing direction.
    pub fn right_dir(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin()).cross(Vec3::Y)
    }

    /// Input magnitude in [0, 1] (diagonals do not exceed 1).
    pub fn strength(&self) -> f32 {
        let (f, r) = self.axes();
        (f * f + r * r).sqrt().min(1.0)
    }
}

// ---------------------------------------------------------------------------
// Terrain view
// ---------------------------------------------------------------------------

/// Surface under the entity, as seen by the movement handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainData {
    pub normal: Vec3,
    pub surface: SurfaceType,
    pub friction: f32,
    /// Radians between the surface normal and world up.
    pub slope_angle: f32,
    /// Horizontal unit vector pointing downhill (zero on flat ground).
    pub downhill: Vec3,
}

impl TerrainData {
    /// `slope_angle / 45°`, capped at 1.
    pub fn steepness(&self) -> f32 {
        (self.slope_angle / std::f32::consts::FRAC_PI_4).min(1.0)
    }
}

// ---------------------------------------------------------------------------
// Shared context
// ---------------------------------------------------------------------------

/// Everything the state handlers and transition predicates read.
///
/// Owned by the movement controller, which mirrors the physics state into it
/// every tick. Handlers only ever see it by shared reference and hand back a
/// [`StateDelta`]; the state machine applies that delta.
#[derive(Clone, Debug)]
pub struct MovementStateContext {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub grounded: bool,
    pub terrain: Option<TerrainData>,
    pub input: MovementInput,

    /// Jetpack fuel, kept in `[0, max_energy]`.
    pub energy: f32,
    pub max_energy: f32,
    pub energy_use_rate: f32,
    pub energy_regen_rate: f32,
    /// Seconds until regeneration may resume after jetpack use.
    pub regen_cooldown: f32,

    pub gravity: f32,
    pub jump_force: f32,
    pub run_speed: f32,
    pub air_control: f32,
    pub jetpack_force: f32,
    pub max_speed: f32,
    pub min_ski_angle: f32,

    /// Seconds since the last transition.
    pub time_in_state: f32,
    /// Set by the controller only for the transition a successful jump forces.
    pub jumping: bool,
}

impl MovementStateContext {
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            grounded: false,
            terrain: None,
            input: MovementInput::default(),
            energy: config.max_energy,
            max_energy: config.max_energy,
            energy_use_rate: config.energy_use_rate,
            energy_regen_rate: config.energy_regen_rate,
            regen_cooldown: 0.0,
            gravity: config.gravity,
            jump_force: config.jump_force,
            run_speed: config.run_speed,
            air_control: config.air_control,
            jetpack_force: config.jetpack_force,
            max_speed: config.max_speed,
            min_ski_angle: config.min_ski_angle,
            time_in_state: 0.0,
            jumping: false,
        }
    }

    pub fn horizontal_velocity(&self) -> Vec3 {
        horizontal(self.velocity)
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_velocity().length()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Slope angle under the entity, zero when no terrain data is present.
    pub fn slope_angle(&self) -> f32 {
        self.terrain.map_or(0.0, |t| t.slope_angle)
    }

    /// Grounded on a slope steep enough for proper skiing.
    pub fn on_ski_slope(&self) -> bool {
        self.grounded && self.slope_angle() >= self.min_ski_angle
    }

    pub fn surface(&self) -> SurfaceType {
        self.terrain.map_or(SurfaceType::Default, |t| t.surface)
    }

    /// Replace velocity and energy with a handler's result.
    pub fn apply(&mut self, delta: StateDelta) {
        self.velocity = clamp_finite(delta.velocity);
        self.energy = delta.energy.clamp(0.0, self.max_energy);
    }

    /// Change the tank size, keeping the current charge inside it.
    pub fn set_max_energy(&mut self, max_energy: f32) {
        self.max_energy = max_energy.max(0.0);
        self.energy = self.energy.clamp(0.0, self.max_energy);
    }
}

/// Fully specified next values produced by a handler call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StateDelta {
    pub velocity: Vec3,
    pub energy: f32,
}

impl StateDelta {
    /// A delta that leaves the context as it is.
    pub fn unchanged(ctx: &MovementStateContext) -> Self {
        Self { velocity: ctx.velocity, energy: ctx.energy }
    }

    pub fn with_velocity(ctx: &MovementStateContext, velocity: Vec3) -> Self {
        Self { velocity, energy: ctx.energy }
    }
}

// ---------------------------------------------------------------------------
// Vector helpers shared by the handlers
// ---------------------------------------------------------------------------

pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Rescale the horizontal part of `v` so it is no longer than `max`.
/// Direction is preserved; the vertical component is untouched.
pub fn clamp_horizontal(v: Vec3, max: f32) -> Vec3 {
    let h = horizontal(v);
    let len = h.length();
    if len > max && len > 0.0 {
        let scaled = h * (max / len);
        Vec3::new(scaled.x, v.y, scaled.z)
    } else {
        v
    }
}

/// Clamp each component into `±VELOCITY_COMPONENT_LIMIT`.
/// NaN is left as NaN so the physics integrator can report it.
pub fn clamp_finite(v: Vec3) -> Vec3 {
    let l = VELOCITY_COMPONENT_LIMIT;
    Vec3::new(v.x.clamp(-l, l), v.y.clamp(-l, l), v.z.clamp(-l, l))
}
