/*!
Core sensing types and math aliases shared by the probe and the controller.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the collision world boundary (`query::SceneQuery`), which produces `HitRecord`s
- the ray-array probe, which reduces hits into a `ProbeResult`
- the ground contact controller, which turns a `ProbeResult` into ground state
*/

use nalgebra as na;
use rapier3d::prelude::ColliderHandle;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Which query the probe issues for every sample in its ray array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CastKind {
    /// Infinitely thin ray.
    Ray,
    /// Sphere swept along the cast direction; radius is the topology's cast radius.
    #[default]
    Sphere,
}

/// Cast direction presets.
///
/// Axis conventions: +Y is up, +Z is forward, +X is right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CastDirection {
    Up,
    Down,
    Left,
    Right,
    Forward,
    Backward,
    /// Arbitrary world-space direction. Normalized by the probe.
    Custom(Vec3),
}

impl CastDirection {
    /// World-space vector for this direction (not normalized for `Custom`).
    pub fn to_vector(self) -> Vec3 {
        match self {
            CastDirection::Up => Vec3::new(0.0, 1.0, 0.0),
            CastDirection::Down => Vec3::new(0.0, -1.0, 0.0),
            CastDirection::Left => Vec3::new(-1.0, 0.0, 0.0),
            CastDirection::Right => Vec3::new(1.0, 0.0, 0.0),
            CastDirection::Forward => Vec3::new(0.0, 0.0, 1.0),
            CastDirection::Backward => Vec3::new(0.0, 0.0, -1.0),
            CastDirection::Custom(dir) => dir,
        }
    }
}

/// Opaque reference to the collider a cast hit.
///
/// # Bit layout
/// - bits 0..=31  : arena index
/// - bits 32..=63 : arena generation
///
/// Collision worlds that are not arena-backed may use any stable `u64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColliderRef(pub u64);

impl ColliderRef {
    /// Pack a Rapier collider handle.
    pub fn from_rapier(handle: ColliderHandle) -> Self {
        let (index, generation) = handle.into_raw_parts();
        ColliderRef((index as u64) | ((generation as u64) << u32::BITS))
    }

    /// Unpack into a Rapier collider handle.
    ///
    /// Only meaningful for references produced by [`ColliderRef::from_rapier`].
    pub fn to_rapier(self) -> ColliderHandle {
        const INDEX_MASK: u64 = u32::MAX as u64;
        let index = (self.0 & INDEX_MASK) as u32;
        let generation = (self.0 >> u32::BITS) as u32;
        ColliderHandle::from_raw_parts(index, generation)
    }
}

/// A single cast hit, as reported by the collision world.
///
/// Produced fresh for every cast and consumed by the reducing step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    /// World-space contact point on the hit surface.
    pub point: Vec3,
    /// World-space unit surface normal at `point`.
    pub normal: Vec3,
    /// Distance travelled along the cast direction before impact (meters).
    pub distance: f32,
    /// The collider that was hit.
    pub collider: ColliderRef,
}

/// Reduced output of one probe cast batch.
///
/// When `detected` is false the remaining fields still hold the values of the
/// last successful cast and must be treated as stale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeResult {
    pub detected: bool,
    /// Perpendicular distance from the probe's reference plane to `point` (meters).
    pub closest_distance: f32,
    /// Raw cast distance of the closest hit (meters).
    pub raw_distance: f32,
    /// Stabilized surface normal (unit length).
    pub normal: Vec3,
    pub point: Vec3,
    pub collider: Option<ColliderRef>,
    /// Number of rays that registered a hit in the last cast.
    pub hit_count: usize,
}

impl Default for ProbeResult {
    fn default() -> Self {
        Self {
            detected: false,
            closest_distance: 0.0,
            raw_distance: 0.0,
            normal: Vec3::zeros(),
            point: Vec3::zeros(),
            collider: None,
            hit_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_directions_are_unit_axes() {
        let presets = [
            CastDirection::Up,
            CastDirection::Down,
            CastDirection::Left,
            CastDirection::Right,
            CastDirection::Forward,
            CastDirection::Backward,
        ];
        for preset in presets {
            assert!((preset.to_vector().norm() - 1.0).abs() < 1.0e-6);
        }
        assert_eq!(CastDirection::Down.to_vector(), -CastDirection::Up.to_vector());
        assert_eq!(
            CastDirection::Left.to_vector(),
            -CastDirection::Right.to_vector()
        );
    }

    #[test]
    fn collider_ref_places_index_low_and_generation_high() {
        let handle = ColliderHandle::from_raw_parts(7, 3);
        let packed = ColliderRef::from_rapier(handle);

        assert_eq!(packed.0, 7 | (3u64 << 32));
        assert_eq!(packed.to_rapier(), handle);
    }
}
