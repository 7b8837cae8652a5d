/*!
Multi-ray ground sensing for physics-driven characters.

- `probe`:      a ray array that casts against the world and reduces all hits
                into one stable distance/normal/point
- `controller`: ground contact state (grounded, landing, slope) and the
                corrective velocity that keeps a body hovering at its stand-off
- `query`:      the collision world boundary plus a Rapier-backed implementation
- `body`:       the physics body boundary plus a plain-data implementation
*/

pub mod body;
pub mod constants;
pub mod controller;
pub mod debug;
pub mod error;
pub mod layers;
pub mod probe;
pub mod query;
pub mod settings;
pub mod shape;
pub mod topology;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use body::{BodySnapshot, PhysicsBody};
pub use controller::{GroundContactController, GroundPhase, GroundState};
pub use debug::{DebugGeometry, DebugHit, Segment};
pub use error::SensorConfigError;
pub use layers::{Layer, LayerCollisionMatrix, LayerMask};
pub use probe::RayArrayProbe;
pub use query::{ColliderShapeDef, RapierQueryWorld, SceneQuery, WorldStaticDef};
pub use settings::{GroundSensorSettings, LandingGuard};
pub use shape::{ColliderShape, ColliderShapeSnapshot};
pub use topology::{RayArrayTopology, RaySampleOffsets};
pub use types::{CastDirection, CastKind, ColliderRef, HitRecord, ProbeResult, Quat, Vec3};
