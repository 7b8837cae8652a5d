/*!
Ground sensor settings.

`GroundSensorSettings` is the whole configuration surface of a
`GroundContactController`. It is supplied once at construction; nothing is
read from the environment or persisted.

Notes
- Distances are in meters (body local space, before local scale), angles in degrees.
- Collider height/thickness describe the *intended* body proportions the sensor is
  tuned for. The actual collider shape only bounds the sensor radius.
*/

use crate::{
    error::SensorConfigError,
    layers::LayerCollisionMatrix,
    topology::RayArrayTopology,
    types::CastKind,
};

pub const DEFAULT_COLLIDER_HEIGHT: f32 = 2.0;
pub const DEFAULT_COLLIDER_THICKNESS: f32 = 1.0;
pub const DEFAULT_STEP_HEIGHT_RATIO: f32 = 0.25;
pub const DEFAULT_SENSOR_RADIUS_MODIFIER: f32 = 0.95;
pub const DEFAULT_ARRAY_ROWS: u32 = 2;
pub const DEFAULT_RAYS_PER_ROW: u32 = 8;
pub const DEFAULT_MAX_SLOPE_ANGLE_DEG: f32 = 45.0;

/// Largest upward speed (m/s) at which an airborne body may still land.
/// Stops the first frames of a jump from registering as ground contact.
pub const DEFAULT_GROUNDED_VELOCITY_EPSILON: f32 = 0.1;

/// When the vertical velocity guard is consulted before accepting ground contact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LandingGuard {
    /// Trust the probe unconditionally.
    Off,
    /// Only an airborne body checks its vertical velocity before becoming grounded.
    #[default]
    OnLanding,
    /// Every tick: an ascending body is never grounded, which releases ground
    /// contact as soon as a jump starts.
    Always,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSensorSettings {
    /// Full height of the body the sensor is tuned for.
    pub collider_height: f32,
    /// Full width of the body the sensor is tuned for.
    pub collider_thickness: f32,
    /// Fraction of `collider_height` reserved for stepping, in [0, 1].
    pub step_height_ratio: f32,
    /// Multiplier applied to half of `collider_thickness` to get the sensor radius.
    pub sensor_radius_modifier: f32,

    pub cast_kind: CastKind,
    pub array_rows: u32,
    pub rays_per_row: u32,
    pub offset_alternate_rows: bool,

    /// Extend the cast by one step height so contact survives a single step-down.
    pub use_extended_range: bool,
    /// Steepest walkable surface (degrees from up).
    pub max_slope_angle_deg: f32,
    /// Expose probe geometry through `GroundContactController::debug_geometry`.
    pub debug_visualization: bool,

    pub grounded_velocity_epsilon: f32,
    pub landing_guard: LandingGuard,

    /// Layer pairs that never interact. Drives the probe's layer mask.
    pub layer_matrix: LayerCollisionMatrix,
}

impl Default for GroundSensorSettings {
    fn default() -> Self {
        Self {
            collider_height: DEFAULT_COLLIDER_HEIGHT,
            collider_thickness: DEFAULT_COLLIDER_THICKNESS,
            step_height_ratio: DEFAULT_STEP_HEIGHT_RATIO,
            sensor_radius_modifier: DEFAULT_SENSOR_RADIUS_MODIFIER,
            cast_kind: CastKind::Sphere,
            array_rows: DEFAULT_ARRAY_ROWS,
            rays_per_row: DEFAULT_RAYS_PER_ROW,
            offset_alternate_rows: true,
            use_extended_range: false,
            max_slope_angle_deg: DEFAULT_MAX_SLOPE_ANGLE_DEG,
            debug_visualization: false,
            grounded_velocity_epsilon: DEFAULT_GROUNDED_VELOCITY_EPSILON,
            landing_guard: LandingGuard::OnLanding,
            layer_matrix: LayerCollisionMatrix::default(),
        }
    }
}

impl GroundSensorSettings {
    pub fn with_collider(mut self, height: f32, thickness: f32) -> Self {
        self.collider_height = height;
        self.collider_thickness = thickness;
        self
    }

    pub fn with_step_height_ratio(mut self, ratio: f32) -> Self {
        self.step_height_ratio = ratio;
        self
    }

    pub fn with_cast_kind(mut self, kind: CastKind) -> Self {
        self.cast_kind = kind;
        self
    }

    pub fn with_array(mut self, rows: u32, rays_per_row: u32, offset_alternate_rows: bool) -> Self {
        self.array_rows = rows;
        self.rays_per_row = rays_per_row;
        self.offset_alternate_rows = offset_alternate_rows;
        self
    }

    pub fn with_extended_range(mut self, enabled: bool) -> Self {
        self.use_extended_range = enabled;
        self
    }

    pub fn with_max_slope_angle(mut self, degrees: f32) -> Self {
        self.max_slope_angle_deg = degrees;
        self
    }

    pub fn with_debug_visualization(mut self, enabled: bool) -> Self {
        self.debug_visualization = enabled;
        self
    }

    pub fn with_landing_guard(mut self, guard: LandingGuard) -> Self {
        self.landing_guard = guard;
        self
    }

    pub fn with_layer_matrix(mut self, matrix: LayerCollisionMatrix) -> Self {
        self.layer_matrix = matrix;
        self
    }

    /// Check every field a controller cannot recover from at runtime.
    pub fn validate(&self) -> Result<(), SensorConfigError> {
        if !(self.collider_height.is_finite() && self.collider_height > 0.0) {
            return Err(SensorConfigError::NonPositiveColliderHeight(
                self.collider_height,
            ));
        }
        if !(self.collider_thickness.is_finite() && self.collider_thickness > 0.0) {
            return Err(SensorConfigError::NonPositiveColliderThickness(
                self.collider_thickness,
            ));
        }
        if !(0.0..=1.0).contains(&self.step_height_ratio) {
            return Err(SensorConfigError::StepHeightRatioOutOfRange(
                self.step_height_ratio,
            ));
        }
        if !(self.sensor_radius_modifier.is_finite() && self.sensor_radius_modifier >= 0.0) {
            return Err(SensorConfigError::InvalidSensorRadiusModifier(
                self.sensor_radius_modifier,
            ));
        }
        if !(0.0..=180.0).contains(&self.max_slope_angle_deg) {
            return Err(SensorConfigError::InvalidMaxSlopeAngle(
                self.max_slope_angle_deg,
            ));
        }
        if !self.grounded_velocity_epsilon.is_finite() {
            return Err(SensorConfigError::InvalidGroundedVelocityEpsilon(
                self.grounded_velocity_epsilon,
            ));
        }
        if self.topology(0.0, 0.0).total_rays() == 0 {
            return Err(SensorConfigError::EmptyRayArray);
        }
        Ok(())
    }

    /// Probe topology for the configured array, with the given calibrated extents.
    pub fn topology(&self, cast_radius: f32, cast_length: f32) -> RayArrayTopology {
        RayArrayTopology {
            rows: self.array_rows,
            rays_per_row: self.rays_per_row,
            offset_alternate_rows: self.offset_alternate_rows,
            cast_radius,
            cast_length,
            cast_kind: self.cast_kind,
        }
        .clamped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(GroundSensorSettings::default().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let base = GroundSensorSettings::default();

        assert_eq!(
            base.with_collider(0.0, 1.0).validate(),
            Err(SensorConfigError::NonPositiveColliderHeight(0.0))
        );
        assert_eq!(
            base.with_collider(2.0, -1.0).validate(),
            Err(SensorConfigError::NonPositiveColliderThickness(-1.0))
        );
        assert_eq!(
            base.with_step_height_ratio(1.5).validate(),
            Err(SensorConfigError::StepHeightRatioOutOfRange(1.5))
        );
        assert_eq!(
            base.with_max_slope_angle(-5.0).validate(),
            Err(SensorConfigError::InvalidMaxSlopeAngle(-5.0))
        );
        assert!(base.with_step_height_ratio(f32::NAN).validate().is_err());

        let nan_guard = GroundSensorSettings {
            grounded_velocity_epsilon: f32::NAN,
            ..base
        };
        assert!(matches!(
            nan_guard.validate(),
            Err(SensorConfigError::InvalidGroundedVelocityEpsilon(_))
        ));
    }

    #[test]
    fn zero_ray_counts_are_clamped_not_rejected() {
        let settings = GroundSensorSettings::default().with_array(0, 0, false);
        assert_eq!(settings.validate(), Ok(()));

        let topology = settings.topology(0.5, 1.0);
        assert_eq!((topology.rows, topology.rays_per_row), (1, 1));
        assert_eq!(topology.total_rays(), 1);
    }
}
