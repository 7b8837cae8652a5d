use crate::{probe::RayArrayProbe, types::Vec3};

/// Length of the drawn surface normal (meters).
pub const NORMAL_RAY_LENGTH: f32 = 0.5;

/// Line segment in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
}

/// Last detected ground contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugHit {
    pub point: Vec3,
    pub normal_ray: Segment,
}

/// Probe geometry for a renderer to draw. Built outside the cast path from the
/// probe's configuration and its last result.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugGeometry {
    pub cast_origin: Vec3,
    /// One segment per sample, spanning the full cast length.
    pub rays: Vec<Segment>,
    /// `None` when the last cast found nothing.
    pub hit: Option<DebugHit>,
}

impl DebugGeometry {
    pub fn from_probe(probe: &RayArrayProbe) -> Self {
        let dir = probe.cast_direction();
        let length = probe.topology().cast_length;

        let rays = probe
            .sample_origins()
            .map(|start| Segment {
                start,
                end: start + dir * length,
            })
            .collect();

        let result = probe.last_result();
        let hit = result.detected.then(|| {
            // Degenerate normals fall back to opposing the cast.
            let normal = result
                .normal
                .try_normalize(crate::constants::DIST_EPS)
                .unwrap_or(-dir);
            DebugHit {
                point: result.point,
                normal_ray: Segment {
                    start: result.point,
                    end: result.point + normal * NORMAL_RAY_LENGTH,
                },
            }
        });

        Self {
            cast_origin: probe.cast_origin(),
            rays,
            hit,
        }
    }
}
