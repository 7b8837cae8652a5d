use crate::{
    layers::Layer,
    shape::ColliderShape,
    types::{Quat, Vec3},
};

/// The physics body a ground sensor is attached to.
///
/// The controller only reads from the body. `set_linear_velocity` exists for the
/// caller, which applies `GroundContactController::apply_velocity` results.
pub trait PhysicsBody {
    /// World-space center of the body's collider bounds (the probe origin).
    fn collider_center(&self) -> Vec3;

    /// World-space unit "up" axis of the body.
    fn up(&self) -> Vec3;

    fn linear_velocity(&self) -> Vec3;

    /// Velocity component along [`PhysicsBody::up`].
    fn vertical_velocity(&self) -> f32 {
        self.linear_velocity().dot(&self.up())
    }

    fn layer(&self) -> Layer;

    fn local_scale(&self) -> Vec3;

    /// `None` when the body has no collider the sensor can be calibrated against.
    fn collider_shape(&self) -> Option<ColliderShape>;

    fn set_linear_velocity(&mut self, velocity: Vec3);
}

/// Plain-data body, for hosts that copy body state in and out every step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySnapshot {
    /// World-space body origin.
    pub position: Vec3,
    pub rotation: Quat,
    /// Collider center relative to the body origin, in local (unscaled) space.
    pub collider_offset: Vec3,
    pub linear_velocity: Vec3,
    pub layer: Layer,
    pub local_scale: Vec3,
    pub shape: Option<ColliderShape>,
}

impl BodySnapshot {
    /// Upright, unscaled, resting body on the default layer.
    pub fn new(position: Vec3, shape: ColliderShape) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
            collider_offset: Vec3::zeros(),
            linear_velocity: Vec3::zeros(),
            layer: Layer::DEFAULT,
            local_scale: Vec3::repeat(1.0),
            shape: Some(shape),
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_collider_offset(mut self, offset: Vec3) -> Self {
        self.collider_offset = offset;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.linear_velocity = velocity;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.local_scale = scale;
        self
    }
}

impl PhysicsBody for BodySnapshot {
    fn collider_center(&self) -> Vec3 {
        self.position
            + self.rotation * self.collider_offset.component_mul(&self.local_scale)
    }

    fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    fn linear_velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn layer(&self) -> Layer {
        self.layer
    }

    fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    fn collider_shape(&self) -> Option<ColliderShape> {
        self.shape
    }

    fn set_linear_velocity(&mut self, velocity: Vec3) {
        self.linear_velocity = velocity;
    }
}
