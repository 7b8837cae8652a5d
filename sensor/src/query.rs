//! Collision world boundary and a Rapier-backed query world for static geometry.
//!
//! The probe only needs two queries: a ray cast and a sphere cast, each
//! returning the closest hit filtered by a [`LayerMask`]. [`SceneQuery`] is that
//! seam; [`RapierQueryWorld`] implements it over an immutable Rapier scene.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-focused: this builder does not step a simulation.
//! - Immutable world: statics do not move after construction.
//! - Layers: each collider's layer index is stored in its `user_data` and applied
//!   through a `QueryFilter` predicate.

// Re-export Rapier so integrators can build defs without depending on `rapier3d` directly.
pub use rapier3d;

use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::parry::query::{ShapeCastOptions, ShapeCastStatus};
use rapier3d::prelude::*;

use crate::{
    constants::DIST_EPS,
    layers::{Layer, LayerMask},
    types::{ColliderRef, HitRecord, Vec3},
};

/// Read-only scene queries used by the ground probe.
///
/// `direction` is always unit length and `max_distance` non-negative.
/// Implementations return the closest hit along the cast, or `None`.
pub trait SceneQuery {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<HitRecord>;

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<HitRecord>;
}

/// Canonical, schema-agnostic definition of an immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - For planes, we use a pose-derived normal: `normal = rotation * +Y`,
///   and compute `dist = dot(normal, translation) + offset_along_normal`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier used to ensure deterministic insertion order.
    pub id: u32,
    /// World-space translation.
    pub translation: Vector<f32>,
    /// World-space rotation (unit quaternion).
    pub rotation: UnitQuaternion<f32>,
    /// Collider shape parameters.
    pub shape: ColliderShapeDef,
    /// Collision layer the collider lives on.
    pub layer: Layer,
}

impl WorldStaticDef {
    /// Axis-aligned static on the default layer.
    pub fn new(id: u32, translation: Vector<f32>, shape: ColliderShapeDef) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
            layer: Layer::DEFAULT,
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }
}

/// Supported static collider shapes.
///
/// Keep this intentionally small and deterministic. Extend as needed.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space).
    ///
    /// The plane normal is derived from the pose as `rotation * +Y`.
    Plane {
        /// Offset along the plane normal (meters).
        offset_along_normal: f32,
    },

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vector<f32> },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },
}

/// In-memory Rapier structures needed for scene queries against a static world.
///
/// For immutable statics, these can be built once at startup and reused.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Build a query world from a list of static collider definitions.
    ///
    /// Determinism
    /// - The input is sorted by `id` before insertion.
    /// - Any NaN/invalid values should be filtered/validated by the caller.
    pub fn build(mut defs: Vec<WorldStaticDef>) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // Insert each static as a fixed rigid-body + attached collider.
        for def in defs.into_iter() {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            let collider = collider_from_def(&def);
            colliders.insert_with_parent(collider, rb_handle, &mut bodies);
        }

        // Run collision detection only (no dynamics) so the broad-phase BVH is populated.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();

        let hooks = ();
        let events = ();

        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &hooks,
            &events,
        );

        log::debug!("built static query world with {} colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        }
    }

    /// Create a borrowed `QueryPipeline` view suitable for scene queries.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }
}

/// Whether a collider's layer (stored in `user_data`) is part of `mask`.
fn collider_in_mask(collider: &Collider, mask: LayerMask) -> bool {
    match u8::try_from(collider.user_data).ok().and_then(Layer::new) {
        Some(layer) => mask.has(layer),
        None => false,
    }
}

impl SceneQuery for RapierQueryWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<HitRecord> {
        let predicate = |_handle: ColliderHandle, co: &Collider| collider_in_mask(co, mask);
        let query_pipeline = self.query_pipeline(QueryFilter::default().predicate(&predicate));

        let ray = Ray::new(Point::from(origin), direction);
        let (handle, hit) =
            query_pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;

        Some(HitRecord {
            point: origin + direction * hit.time_of_impact,
            normal: hit.normal,
            distance: hit.time_of_impact,
            collider: ColliderRef::from_rapier(handle),
        })
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<HitRecord> {
        let radius = radius.max(DIST_EPS);
        let predicate = |_handle: ColliderHandle, co: &Collider| collider_in_mask(co, mask);
        let query_pipeline = self.query_pipeline(QueryFilter::default().predicate(&predicate));

        let ball = Ball::new(radius);
        let ball_pos = Isometry::translation(origin.x, origin.y, origin.z);
        let mut opts = ShapeCastOptions::with_max_time_of_impact(max_distance.max(0.0));
        opts.stop_at_penetration = true;

        let (handle, hit) = query_pipeline.cast_shape(&ball_pos, &direction, &ball, opts)?;

        // Already overlapping at the start: a zero-distance sphere hit says nothing about
        // where the surface is, so measure this sample with a ray instead.
        if matches!(hit.status, ShapeCastStatus::PenetratingOrWithinTargetDist) {
            let ray = Ray::new(Point::from(origin), direction);
            let (handle, hit) =
                query_pipeline.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;
            return Some(HitRecord {
                point: origin + direction * hit.time_of_impact,
                normal: hit.normal,
                distance: hit.time_of_impact,
                collider: ColliderRef::from_rapier(handle),
            });
        }

        // Normal on the moving ball points toward the surface; the surface normal is its
        // opposite. Ensure it opposes the cast direction.
        let mut normal = -hit.normal1.into_inner();
        if normal.norm_squared() <= DIST_EPS {
            normal = -direction;
        }
        if normal.dot(&direction) > 0.0 {
            normal = -normal;
        }

        let center_at_impact = origin + direction * hit.time_of_impact;
        Some(HitRecord {
            point: center_at_impact - normal * radius,
            normal,
            distance: hit.time_of_impact,
            collider: ColliderRef::from_rapier(handle),
        })
    }
}

/// Build a Rapier collider from a `WorldStaticDef`.
///
/// This uses the pose stored on the rigid-body as the collider parent transform.
/// So the collider is created with identity local transform.
fn collider_from_def(def: &WorldStaticDef) -> Collider {
    let builder = match &def.shape {
        ColliderShapeDef::Plane {
            offset_along_normal,
        } => {
            // The parent body already carries the pose, so the half-space only needs to be
            // pushed along its local normal by the offset.
            let halfspace = HalfSpace::new(Vector::y_axis());
            ColliderBuilder::new(SharedShape::new(halfspace))
                .translation(Vector::y() * *offset_along_normal)
        }

        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),

        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
    };

    builder.user_data(def.layer.index() as u128).build()
}
