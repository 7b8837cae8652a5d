//! Ray array topology and the sample offsets derived from it.
//!
//! The probe samples the ground with a disc of rays arranged in concentric rows
//! (rings) around the cast origin. Offsets are generated in the local XZ plane:
//! angle 0 points along +Z and angles grow toward +X, i.e. a rotation about +Y.
//!
//! Offsets are a pure function of the topology fields, so regenerating with the
//! same topology yields bit-identical offsets.

use crate::types::{CastKind, Vec3};

/// Shape of the ray array and the extent of every cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayArrayTopology {
    /// Number of concentric rows (rings). Clamped to at least 1.
    pub rows: u32,
    /// Number of rays in every row. Clamped to at least 1.
    pub rays_per_row: u32,
    /// Rotate odd rows by half an angular step so rays interleave.
    pub offset_alternate_rows: bool,
    /// Radius of the outermost row, also used as the sphere-cast radius (meters).
    pub cast_radius: f32,
    /// Length of every cast (meters).
    pub cast_length: f32,
    pub cast_kind: CastKind,
}

impl Default for RayArrayTopology {
    fn default() -> Self {
        Self {
            rows: 1,
            rays_per_row: 1,
            offset_alternate_rows: true,
            cast_radius: 0.25,
            cast_length: 1.0,
            cast_kind: CastKind::Sphere,
        }
    }
}

impl RayArrayTopology {
    /// Copy of `self` with `rows` and `rays_per_row` clamped up to 1.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            rows: self.rows.max(1),
            rays_per_row: self.rays_per_row.max(1),
            ..self
        }
    }

    /// Number of rays sampled per cast.
    ///
    /// `rows * rays_per_row` when both exceed one, otherwise the larger of the two.
    pub fn total_rays(&self) -> usize {
        let rows = self.rows.max(1) as usize;
        let rays = self.rays_per_row.max(1) as usize;
        if rows > 1 && rays > 1 {
            rows * rays
        } else {
            rows.max(rays)
        }
    }
}

/// Per-ray lateral offsets from the cast origin, in row-major order (row 0 first).
///
/// Immutable between topology changes and reused across casts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RaySampleOffsets {
    offsets: Vec<Vec3>,
}

impl RaySampleOffsets {
    pub fn generate(topology: &RayArrayTopology) -> Self {
        let mut offsets = Self::default();
        offsets.regenerate(topology);
        offsets
    }

    /// Rebuild the offsets in place, reusing the existing buffer.
    pub fn regenerate(&mut self, topology: &RayArrayTopology) {
        let topology = topology.clamped();
        let total = topology.total_rays();

        self.offsets.clear();
        self.offsets.reserve(total);

        if total == 1 {
            self.offsets.push(Vec3::zeros());
            return;
        }

        let rows = topology.rows;
        let rays = topology.rays_per_row;
        let angle_step = 360.0 / rays as f32;

        // A single row degenerates to one ring at the full cast radius.
        for row in 0..rows {
            let radius = topology.cast_radius * (row + 1) as f32 / rows as f32;
            let angle_offset = if topology.offset_alternate_rows && row % 2 == 1 {
                angle_step * 0.5
            } else {
                0.0
            };

            for i in 0..rays {
                let angle = (angle_step * i as f32 + angle_offset).to_radians();
                self.offsets
                    .push(Vec3::new(angle.sin(), 0.0, angle.cos()) * radius);
            }
        }

        debug_assert_eq!(self.offsets.len(), total);
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vec3] {
        &self.offsets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.offsets.iter()
    }
}
