//! Terrain queries consumed by the physics world.
//!
//! Terrain generation lives elsewhere; this module only defines the query
//! boundary plus two analytic providers used by the demo scene and the tests.

use glam::Vec3;

use crate::config::SurfaceType;

/// Height field and surface classification at a world position.
///
/// `None` means "out of bounds"; callers fall back to a flat default surface.
pub trait TerrainProvider {
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;
    fn normal_at(&self, x: f32, z: f32) -> Option<Vec3>;
    fn surface_type_at(&self, x: f32, z: f32) -> SurfaceType;
}

/// Ground under a position after out-of-bounds fallbacks are applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSample {
    pub height: f32,
    pub normal: Vec3,
    pub surface: SurfaceType,
}

impl TerrainSample {
    pub const FLAT: TerrainSample =
        TerrainSample { height: 0.0, normal: Vec3::Y, surface: SurfaceType::Default };

    pub fn query(terrain: &dyn TerrainProvider, position: Vec3) -> Self {
        let (x, z) = (position.x, position.z);
        let Some(height) = terrain.height_at(x, z) else {
            return Self::FLAT;
        };
        let normal = terrain
            .normal_at(x, z)
            .map(|n| n.normalize_or_zero())
            .filter(|n| *n != Vec3::ZERO && n.is_finite())
            .unwrap_or(Vec3::Y);
        Self { height, normal, surface: terrain.surface_type_at(x, z) }
    }
}

/// Infinite horizontal plane.
#[derive(Clone, Copy, Debug)]
pub struct FlatTerrain {
    pub height: f32,
    pub surface: SurfaceType,
}

impl FlatTerrain {
    pub fn new(height: f32, surface: SurfaceType) -> Self {
        Self { height, surface }
    }
}

impl Default for FlatTerrain {
    fn default() -> Self {
        Self::new(0.0, SurfaceType::Default)
    }
}

impl TerrainProvider for FlatTerrain {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }

    fn normal_at(&self, _x: f32, _z: f32) -> Option<Vec3> {
        Some(Vec3::Y)
    }

    fn surface_type_at(&self, _x: f32, _z: f32) -> SurfaceType {
        self.surface
    }
}

/// Inclined plane descending toward +X from `x = 0`, followed by a flat
/// run-out. Bounded on both axes; outside the bounds every query is `None`.
#[derive(Clone, Copy, Debug)]
pub struct SlopeTerrain {
    /// Incline in radians.
    pub angle: f32,
    /// Height at the top edge (`x = 0`).
    pub top_height: f32,
    /// Horizontal length of the incline along X.
    pub length: f32,
    /// Flat run-out length after the incline.
    pub runout: f32,
    /// Half width along Z.
    pub half_width: f32,
    pub surface: SurfaceType,
    pub runout_surface: SurfaceType,
}

impl SlopeTerrain {
    pub fn new(angle: f32, length: f32, surface: SurfaceType) -> Self {
        Self {
            angle,
            top_height: length * angle.tan(),
            length,
            runout: length * 0.5,
            half_width: length,
            surface,
            runout_surface: SurfaceType::Default,
        }
    }

    fn in_bounds(&self, x: f32, z: f32) -> bool {
        x >= 0.0 && x <= self.length + self.runout && z.abs() <= self.half_width
    }

    fn on_incline(&self, x: f32) -> bool {
        x < self.length
    }
}

impl TerrainProvider for SlopeTerrain {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if !self.in_bounds(x, z) {
            return None;
        }
        let run = x.min(self.length);
        Some(self.top_height - run * self.angle.tan())
    }

    fn normal_at(&self, x: f32, z: f32) -> Option<Vec3> {
        if !self.in_bounds(x, z) {
            return None;
        }
        if self.on_incline(x) {
            Some(Vec3::new(self.angle.sin(), self.angle.cos(), 0.0))
        } else {
            Some(Vec3::Y)
        }
    }

    fn surface_type_at(&self, x: f32, z: f32) -> SurfaceType {
        if self.in_bounds(x, z) && self.on_incline(x) {
            self.surface
        } else {
            self.runout_surface
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_falls_back_to_flat_default() {
        let slope = SlopeTerrain::new(0.3, 50.0, SurfaceType::Snow);
        let sample = TerrainSample::query(&slope, Vec3::new(-10.0, 5.0, 0.0));
        assert_eq!(sample, TerrainSample::FLAT);
    }

    #[test]
    fn slope_descends_toward_positive_x() {
        let slope = SlopeTerrain::new(0.3, 50.0, SurfaceType::Snow);
        let near = slope.height_at(1.0, 0.0).unwrap();
        let far = slope.height_at(20.0, 0.0).unwrap();
        assert!(far < near);
        let n = slope.normal_at(10.0, 0.0).unwrap();
        assert!(n.x > 0.0 && n.y > 0.0);
        assert_eq!(slope.surface_type_at(10.0, 0.0), SurfaceType::Snow);
    }

    #[test]
    fn runout_is_flat() {
        let slope = SlopeTerrain::new(0.3, 50.0, SurfaceType::Snow);
        assert_eq!(slope.normal_at(60.0, 0.0), Some(Vec3::Y));
        assert_eq!(slope.height_at(60.0, 0.0), slope.height_at(50.0, 0.0));
        assert_eq!(slope.surface_type_at(60.0, 0.0), SurfaceType::Default);
    }
}
