/*!
Ground contact controller.

Owns one [`RayArrayProbe`] and turns its result into ground state and a
corrective "hover" velocity for a single physics body.

Per tick (`check_for_ground`):
1. Recalibrate the probe if the body's shape, scale or layer changed.
2. Cast from the collider center along `-up`.
3. Update the Airborne/Grounded phase, `just_landed` and the slope flags.
4. Compute the velocity that moves the body to the target stand-off distance
   within one fixed step.

The controller never writes to the body; the caller adds
[`GroundContactController::apply_velocity`] to its own desired velocity.
*/

use crate::{
    body::PhysicsBody,
    constants::{DIST_EPS, FLAT_ANGLE_EPS_DEG, SAFETY_DISTANCE_FACTOR},
    debug::DebugGeometry,
    error::SensorConfigError,
    layers::Layer,
    probe::RayArrayProbe,
    query::SceneQuery,
    settings::{GroundSensorSettings, LandingGuard},
    shape::{ColliderShape, ColliderShapeSnapshot},
    types::{CastDirection, ProbeResult, Vec3},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroundPhase {
    #[default]
    Airborne,
    Grounded,
}

/// Ground state after the last `check_for_ground`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundState {
    pub is_grounded: bool,
    pub was_grounded_previous_tick: bool,
    /// True only on the tick the body went from airborne to grounded.
    pub just_landed: bool,
    /// Grounded on a walkable, non-flat surface.
    pub is_on_slope: bool,
    /// Grounded on a surface steeper than the max slope angle.
    pub is_too_steep: bool,
    /// Angle between the ground normal and world up (degrees). Zero when airborne.
    pub slope_angle_deg: f32,
    pub adjustment_velocity: Vec3,
}

impl Default for GroundState {
    fn default() -> Self {
        Self {
            is_grounded: false,
            was_grounded_previous_tick: false,
            just_landed: false,
            is_on_slope: false,
            is_too_steep: false,
            slope_angle_deg: 0.0,
            adjustment_velocity: Vec3::zeros(),
        }
    }
}

/// Calibrated probe extents derived from the settings and the body's collider.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Calibration {
    sensor_radius: f32,
    base_sensor_range: f32,
    target_standoff: f32,
    /// Extra cast length when `use_extended_range` is on.
    step_height: f32,
}

impl Calibration {
    fn compute(settings: &GroundSensorSettings, snapshot: &ColliderShapeSnapshot) -> Self {
        let eps = SAFETY_DISTANCE_FACTOR;
        let scale = snapshot.scale_factor();
        let h = settings.collider_height;
        let r = settings.step_height_ratio;

        let min_radius = eps;
        let max_radius = snapshot.half_extent * (1.0 - eps);
        let radius = settings.collider_thickness * 0.5 * settings.sensor_radius_modifier;
        let radius = if max_radius < min_radius {
            log::debug!(
                "collider half extent {} too small for sensor radius, using {}",
                snapshot.half_extent,
                min_radius
            );
            min_radius
        } else {
            radius.clamp(min_radius, max_radius)
        };

        let length = (h * (1.0 - r)) * 0.5 + h * r;

        Self {
            sensor_radius: radius * scale,
            base_sensor_range: length * (1.0 + eps) * scale,
            target_standoff: (0.5 * h * r + h * r) * scale,
            step_height: h * scale * r,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GroundContactController {
    settings: GroundSensorSettings,
    probe: RayArrayProbe,
    snapshot: Option<ColliderShapeSnapshot>,
    calibration: Calibration,
    state: GroundState,
    recalibration_count: u64,
}

impl GroundContactController {
    /// Validate `settings` against `body` and calibrate the probe once.
    pub fn new<B: PhysicsBody + ?Sized>(
        settings: GroundSensorSettings,
        body: &B,
    ) -> Result<Self, SensorConfigError> {
        let shape = Self::validate_setup(&settings, body).inspect_err(|e| {
            log::error!("Ground sensor misconfigured: {e}");
        })?;

        let mut controller = Self {
            probe: RayArrayProbe::new(settings.topology(0.0, 0.0)),
            settings,
            snapshot: None,
            calibration: Calibration::default(),
            state: GroundState::default(),
            recalibration_count: 0,
        };
        controller.recalibrate_if_needed(&shape, body.layer(), body.local_scale());
        Ok(controller)
    }

    fn validate_setup<B: PhysicsBody + ?Sized>(
        settings: &GroundSensorSettings,
        body: &B,
    ) -> Result<ColliderShape, SensorConfigError> {
        settings.validate()?;
        let shape = body
            .collider_shape()
            .ok_or(SensorConfigError::MissingColliderShape)?;
        shape.validate()?;

        let snapshot = ColliderShapeSnapshot::new(&shape, body.layer(), body.local_scale());
        if !snapshot.has_valid_scale() {
            return Err(SensorConfigError::MalformedColliderShape(
                "local scale must be positive and finite",
            ));
        }
        Ok(shape)
    }

    /// Recompute the probe calibration if `shape`, `layer` or `local_scale`
    /// differ from the cached snapshot. Returns `true` when it recalibrated.
    ///
    /// A malformed shape or scale keeps the last valid calibration.
    pub fn recalibrate_if_needed(
        &mut self,
        shape: &ColliderShape,
        layer: Layer,
        local_scale: Vec3,
    ) -> bool {
        let snapshot = ColliderShapeSnapshot::new(shape, layer, local_scale);
        if self.snapshot == Some(snapshot) {
            return false;
        }

        if let Err(e) = shape.validate() {
            log::warn!("Keeping previous ground sensor calibration: {e}");
            return false;
        }
        if !snapshot.has_valid_scale() {
            log::warn!(
                "Keeping previous ground sensor calibration: invalid local scale {:?}",
                local_scale
            );
            return false;
        }

        self.calibration = Calibration::compute(&self.settings, &snapshot);
        self.probe.set_topology(self.settings.topology(
            self.calibration.sensor_radius,
            self.calibration.base_sensor_range,
        ));
        self.probe
            .set_layer_mask(self.settings.layer_matrix.sensor_mask(layer));

        self.snapshot = Some(snapshot);
        self.recalibration_count += 1;

        log::debug!(
            "Ground sensor recalibrated: radius {:.4}, range {:.4}, target {:.4}, layer {}",
            self.calibration.sensor_radius,
            self.calibration.base_sensor_range,
            self.calibration.target_standoff,
            layer.index()
        );
        true
    }

    /// Run one sensing step for `body` against `world`.
    ///
    /// Call once per fixed step, before reading the adjustment velocity.
    pub fn check_for_ground<B, W>(&mut self, body: &B, world: &W, fixed_dt: f32) -> GroundState
    where
        B: PhysicsBody + ?Sized,
        W: SceneQuery + ?Sized,
    {
        self.state.adjustment_velocity = Vec3::zeros();

        match body.collider_shape() {
            Some(shape) => {
                self.recalibrate_if_needed(&shape, body.layer(), body.local_scale());
            }
            None => log::debug!("Body has no collider shape, keeping last calibration"),
        }

        let was_grounded = self.state.is_grounded;
        self.state.was_grounded_previous_tick = was_grounded;

        let up = body
            .up()
            .try_normalize(DIST_EPS)
            .filter(|u| u.iter().all(|c| c.is_finite()))
            .unwrap_or_else(Vec3::y);

        let mut length = self.calibration.base_sensor_range;
        if self.settings.use_extended_range {
            length += self.calibration.step_height;
        }
        self.probe.set_cast_origin(body.collider_center());
        self.probe.set_cast_direction(CastDirection::Custom(-up));
        self.probe.set_cast_length(length);

        let result = self.probe.cast(world);

        let ascending = body.vertical_velocity() > self.settings.grounded_velocity_epsilon;
        let grounded = result.detected
            && match self.settings.landing_guard {
                LandingGuard::Off => true,
                LandingGuard::OnLanding => was_grounded || !ascending,
                LandingGuard::Always => !ascending,
            };

        self.state.is_grounded = grounded;
        self.state.just_landed = grounded && !was_grounded;
        if self.state.just_landed {
            log::debug!("Landed at {:?}", result.point);
        }

        if grounded {
            // Slope is a property of the surface, so it is measured against world up
            // even when the body itself is tilted.
            let angle = result.normal.angle(&Vec3::y()).to_degrees();
            let angle = if angle.is_finite() { angle } else { 0.0 };
            let max = self.settings.max_slope_angle_deg;
            self.state.slope_angle_deg = angle;
            self.state.is_on_slope = angle > FLAT_ANGLE_EPS_DEG && angle <= max;
            self.state.is_too_steep = angle > max;
        } else {
            self.state.slope_angle_deg = 0.0;
            self.state.is_on_slope = false;
            self.state.is_too_steep = false;
        }

        if grounded {
            self.state.adjustment_velocity = self.adjustment(&result, &up, fixed_dt);
        }

        self.state
    }

    fn adjustment(&self, result: &ProbeResult, up: &Vec3, fixed_dt: f32) -> Vec3 {
        if !(fixed_dt.is_finite() && fixed_dt > 0.0) {
            log::warn!("Non-positive fixed step {fixed_dt}, skipping ground adjustment");
            return Vec3::zeros();
        }

        let v = up * ((self.calibration.target_standoff - result.closest_distance) / fixed_dt);
        if v.iter().all(|c| c.is_finite()) {
            v
        } else {
            Vec3::zeros()
        }
    }

    /// `desired` plus the last adjustment velocity.
    #[inline]
    pub fn apply_velocity(&self, desired: Vec3) -> Vec3 {
        desired + self.state.adjustment_velocity
    }

    /// Probe geometry for drawing, when debug visualization is enabled.
    pub fn debug_geometry(&self) -> Option<DebugGeometry> {
        self.settings
            .debug_visualization
            .then(|| DebugGeometry::from_probe(&self.probe))
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.state.is_grounded
    }

    #[inline]
    pub fn is_on_slope(&self) -> bool {
        self.state.is_on_slope
    }

    #[inline]
    pub fn is_too_steep(&self) -> bool {
        self.state.is_too_steep
    }

    #[inline]
    pub fn just_landed(&self) -> bool {
        self.state.just_landed
    }

    /// Stabilized normal of the last detected ground. Stale while airborne.
    #[inline]
    pub fn last_hit_normal(&self) -> Vec3 {
        self.probe.normal()
    }

    #[inline]
    pub fn last_hit_point(&self) -> Vec3 {
        self.probe.point()
    }

    #[inline]
    pub fn adjustment_velocity(&self) -> Vec3 {
        self.state.adjustment_velocity
    }

    #[inline]
    pub fn slope_angle_deg(&self) -> f32 {
        self.state.slope_angle_deg
    }

    #[inline]
    pub fn ground_state(&self) -> &GroundState {
        &self.state
    }

    pub fn phase(&self) -> GroundPhase {
        if self.state.is_grounded {
            GroundPhase::Grounded
        } else {
            GroundPhase::Airborne
        }
    }

    #[inline]
    pub fn probe(&self) -> &RayArrayProbe {
        &self.probe
    }

    #[inline]
    pub fn last_probe_result(&self) -> &ProbeResult {
        self.probe.last_result()
    }

    #[inline]
    pub fn settings(&self) -> &GroundSensorSettings {
        &self.settings
    }

    #[inline]
    pub fn recalibration_count(&self) -> u64 {
        self.recalibration_count
    }

    /// Distance kept between the collider center and the ground (scaled).
    #[inline]
    pub fn target_standoff_distance(&self) -> f32 {
        self.calibration.target_standoff
    }

    /// Cast length before any extended range is added (scaled).
    #[inline]
    pub fn base_sensor_range(&self) -> f32 {
        self.calibration.base_sensor_range
    }

    #[inline]
    pub fn sensor_radius(&self) -> f32 {
        self.calibration.sensor_radius
    }
}
