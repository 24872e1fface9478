use glam::Vec3;
use hecs::{Entity, World};

use crate::components::{CollisionBody, CollisionEvent, PhysicsState};

/// cos(45°): contacts whose normal is at least this close to vertical also
/// count as ground contact.
const GROUND_CONTACT_COS: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Working copy of one collidable body for the pairwise pass.
#[derive(Clone, Debug)]
pub struct ColliderEntry {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    pub body: CollisionBody,
    pub inverse_mass: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Set when a contact with a near-vertical normal supports this body.
    pub ground_normal: Option<Vec3>,
    touched: bool,
}

impl ColliderEntry {
    pub fn new(entity: Entity, state: &PhysicsState, body: CollisionBody) -> Self {
        Self {
            entity,
            position: state.position,
            velocity: state.velocity,
            body,
            inverse_mass: state.inverse_mass(),
            restitution: state.material.restitution,
            friction: state.material.friction,
            ground_normal: None,
            touched: false,
        }
    }
}

/// Sphere-sphere test and impulse response for one pair.
///
/// contact_normal convention: always points from `a` toward `b`.
/// - Positions are separated along the normal, split by inverse mass.
/// - Already separating pairs get no impulse.
/// - Restitution is the lesser of the two; friction is the average.
pub fn resolve_pair(a: &mut ColliderEntry, b: &mut ColliderEntry) -> Option<CollisionEvent> {
    let diff = b.position - a.position;
    let dist = diff.length();
    let penetration = (a.body.radius + b.body.radius) - dist;
    if penetration <= 0.0 {
        return None;
    }
    let n = if dist > 1e-6 { diff / dist } else { Vec3::Y };

    let total_inverse = a.inverse_mass + b.inverse_mass;
    if total_inverse <= 0.0 {
        return None;
    }
    a.position -= n * (penetration * a.inverse_mass / total_inverse);
    b.position += n * (penetration * b.inverse_mass / total_inverse);
    a.touched = true;
    b.touched = true;

    let relative = b.velocity - a.velocity;
    let vel_along_n = relative.dot(n);

    // Negative = closing in.
    if vel_along_n < 0.0 {
        let e = a.restitution.min(b.restitution);
        let j = -(1.0 + e) * vel_along_n / total_inverse;
        a.velocity -= n * (j * a.inverse_mass);
        b.velocity += n * (j * b.inverse_mass);

        // Coulomb friction on the tangential part, capped at mu * j.
        let relative = b.velocity - a.velocity;
        let tangent = relative - n * relative.dot(n);
        let tangent_speed = tangent.length();
        if tangent_speed > 1e-6 {
            let t = tangent / tangent_speed;
            let mu = (a.friction + b.friction) * 0.5;
            let jt = (tangent_speed / total_inverse).min(mu * j);
            a.velocity += t * (jt * a.inverse_mass);
            b.velocity -= t * (jt * b.inverse_mass);
        }
    }

    let event = CollisionEvent {
        entity_a: a.entity,
        entity_b: b.entity,
        point: a.position + n * a.body.radius,
        contact_normal: n,
        penetration_depth: penetration,
    };

    // Near-vertical contact: the body on top rests on the one below, so the
    // upper body is the one that becomes grounded. The lower body keeps
    // whatever support the terrain gives it.
    if n.y.abs() >= GROUND_CONTACT_COS {
        let up = if n.y > 0.0 { n } else { -n };
        if a.position.y > b.position.y {
            a.ground_normal = Some(up);
        } else {
            b.ground_normal = Some(up);
        }
    }

    Some(event)
}

/// Detect and resolve sphere contacts among every body that carries a
/// [`CollisionBody`]. Bodies without one are skipped.
pub fn collision_system(world: &mut World) -> Vec<CollisionEvent> {
    let mut entries: Vec<ColliderEntry> = world
        .query_mut::<(&PhysicsState, &CollisionBody)>()
        .into_iter()
        .map(|(entity, (state, body))| ColliderEntry::new(entity, state, *body))
        .collect();

    // Broadphase: brute force O(n²)
    let mut events = Vec::new();
    for i in 0..entries.len() {
        for j in (i + 1)..entries.len() {
            let (head, tail) = entries.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);
            if !a.body.accepts(&b.body) {
                continue;
            }
            if let Some(event) = resolve_pair(a, b) {
                events.push(event);
            }
        }
    }

    for entry in entries.iter().filter(|e| e.touched) {
        let Ok(mut state) = world.get::<&mut PhysicsState>(entry.entity) else {
            continue;
        };
        state.position = entry.position;
        state.velocity = entry.velocity;
        if let Some(normal) = entry.ground_normal {
            state.grounded = true;
            state.ground_normal = normal;
        }
    }

    events
}
