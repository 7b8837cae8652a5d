/*!
Sensing tolerances and reserved identifiers.

Notes
- Distances are in meters, time in seconds, angles in degrees.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Number of collision layers addressable by a [`crate::LayerMask`].
pub const LAYER_COUNT: usize = 32;

/// Layer index reserved for non-physical geometry (triggers, volumes, decals).
/// Ground probes never hit it, regardless of the layer collision matrix.
pub const IGNORE_RAYCAST_LAYER: u8 = 2;

/// Relative safety margin applied to sensor extents.
///
/// Keeps the sensor radius strictly inside the body's collider and pads the
/// base sensor range against floating point error.
pub const SAFETY_DISTANCE_FACTOR: f32 = 0.001;

/// Practical small distance for comparisons (meters).
/// Used for normalization guards and direction degeneracy checks.
pub const DIST_EPS: f32 = 1.0e-6;

/// Surfaces whose normal is within this angle of "up" count as flat (degrees).
/// Absorbs `acos` noise on level ground.
pub const FLAT_ANGLE_EPS_DEG: f32 = 0.1;
