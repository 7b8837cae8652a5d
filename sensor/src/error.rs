use thiserror::Error;

/// Setup-time configuration errors.
///
/// These are reported once, when a controller is created. Per-tick absence of
/// ground is never an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorConfigError {
    #[error("body has no collider shape to calibrate the ground sensor against")]
    MissingColliderShape,

    #[error("collider shape is malformed: {0}")]
    MalformedColliderShape(&'static str),

    #[error("collider height must be positive and finite, got {0}")]
    NonPositiveColliderHeight(f32),

    #[error("collider thickness must be positive and finite, got {0}")]
    NonPositiveColliderThickness(f32),

    #[error("step height ratio must be within [0, 1], got {0}")]
    StepHeightRatioOutOfRange(f32),

    #[error("sensor radius modifier must be non-negative and finite, got {0}")]
    InvalidSensorRadiusModifier(f32),

    #[error("max slope angle must be within [0, 180] degrees, got {0}")]
    InvalidMaxSlopeAngle(f32),

    #[error("grounded velocity epsilon must be finite, got {0}")]
    InvalidGroundedVelocityEpsilon(f32),

    #[error("ray array has no rays after clamping")]
    EmptyRayArray,
}
