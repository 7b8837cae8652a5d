use crate::{error::SensorConfigError, layers::Layer, types::Vec3};

/// Collider shapes a ground sensor can be calibrated against.
///
/// Each variant carries only what the recalibration formulas need.
/// Dimensions are in the body's local (unscaled) space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    /// Oriented box with half-extents (hx, hy, hz).
    Box { half_extents: Vec3 },
    /// Sphere/ball.
    Sphere { radius: f32 },
    /// Y-aligned capsule; `height` is the full tip-to-tip height.
    Capsule { radius: f32, height: f32 },
}

impl ColliderShape {
    /// Upper bound for the sensor radius before the safety margin is applied.
    ///
    /// - Box: half of the box height.
    /// - Sphere: the radius.
    /// - Capsule: half of the capsule height.
    pub fn sensor_half_extent(&self) -> f32 {
        match *self {
            ColliderShape::Box { half_extents } => half_extents.y,
            ColliderShape::Sphere { radius } => radius,
            ColliderShape::Capsule { height, .. } => height * 0.5,
        }
    }

    /// Full height of the shape along local +Y.
    pub fn height(&self) -> f32 {
        match *self {
            ColliderShape::Box { half_extents } => half_extents.y * 2.0,
            ColliderShape::Sphere { radius } => radius * 2.0,
            ColliderShape::Capsule { height, .. } => height,
        }
    }

    pub fn validate(&self) -> Result<(), SensorConfigError> {
        let positive = |x: f32| x.is_finite() && x > 0.0;
        match *self {
            ColliderShape::Box { half_extents } => {
                if !half_extents.iter().all(|&h| positive(h)) {
                    return Err(SensorConfigError::MalformedColliderShape(
                        "box half extents must be positive and finite",
                    ));
                }
            }
            ColliderShape::Sphere { radius } => {
                if !positive(radius) {
                    return Err(SensorConfigError::MalformedColliderShape(
                        "sphere radius must be positive and finite",
                    ));
                }
            }
            ColliderShape::Capsule { radius, height } => {
                if !positive(radius) || !positive(height) {
                    return Err(SensorConfigError::MalformedColliderShape(
                        "capsule radius and height must be positive and finite",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Cached calibration inputs. Recalibration is needed whenever a fresh
/// snapshot compares unequal to the cached one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColliderShapeSnapshot {
    pub half_extent: f32,
    pub height: f32,
    pub local_scale: Vec3,
    pub layer: Layer,
}

impl ColliderShapeSnapshot {
    pub fn new(shape: &ColliderShape, layer: Layer, local_scale: Vec3) -> Self {
        Self {
            half_extent: shape.sensor_half_extent(),
            height: shape.height(),
            local_scale,
            layer,
        }
    }

    /// Uniform scale factor applied to sensor extents (the X component of the local scale).
    #[inline]
    pub fn scale_factor(&self) -> f32 {
        self.local_scale.x
    }

    /// Whether the scale is usable for calibration.
    pub fn has_valid_scale(&self) -> bool {
        let s = self.scale_factor();
        s.is_finite() && s > 0.0
    }
}
