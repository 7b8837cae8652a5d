//! Ray-array probe: one batch of casts reduced to a single best hit.
//!
//! Algorithm
//! - Every sample offset is projected onto the plane orthogonal to the cast
//!   direction and added to the cast origin.
//! - Each sample issues a ray or sphere cast of `cast_length` through the
//!   [`SceneQuery`] boundary, filtered by the layer mask.
//! - Hits are compared by their perpendicular distance to the reference plane
//!   (through the cast origin, normal = cast direction), so lateral samples stay
//!   comparable with the central one. First sample wins exact ties.
//! - With more than one hit, the reported normal is the normalized sum of all
//!   hit normals; a single hit reports its raw normal.
//!
//! The probe keeps no state across casts besides its configuration, its sample
//! offsets and the last result.

use crate::{
    constants::DIST_EPS,
    layers::LayerMask,
    query::SceneQuery,
    topology::{RayArrayTopology, RaySampleOffsets},
    types::{CastDirection, CastKind, HitRecord, ProbeResult, Vec3},
};

#[derive(Clone, Debug)]
pub struct RayArrayProbe {
    topology: RayArrayTopology,
    offsets: RaySampleOffsets,
    cast_origin: Vec3,
    cast_direction: Vec3,
    layer_mask: LayerMask,
    /// Compare hits by reference-plane distance instead of raw cast distance.
    use_plane_distance: bool,
    /// Average hit normals when more than one sample hits.
    average_normals: bool,
    result: ProbeResult,
    regeneration_count: u64,
}

impl Default for RayArrayProbe {
    fn default() -> Self {
        Self::new(RayArrayTopology::default())
    }
}

impl RayArrayProbe {
    /// Probe casting straight down from the origin, hitting every layer.
    pub fn new(topology: RayArrayTopology) -> Self {
        let topology = topology.clamped();
        Self {
            offsets: RaySampleOffsets::generate(&topology),
            topology,
            cast_origin: Vec3::zeros(),
            cast_direction: CastDirection::Down.to_vector(),
            layer_mask: LayerMask::all(),
            use_plane_distance: true,
            average_normals: true,
            result: ProbeResult::default(),
            regeneration_count: 1,
        }
    }

    /// Set topology, origin, direction and mask in one go.
    ///
    /// Row and ray counts are clamped up to 1. Offsets are regenerated only if a
    /// topology field changed.
    pub fn configure(
        &mut self,
        topology: RayArrayTopology,
        cast_origin: Vec3,
        cast_direction: Vec3,
        layer_mask: LayerMask,
    ) {
        self.set_topology(topology);
        self.set_cast_origin(cast_origin);
        self.set_cast_direction(CastDirection::Custom(cast_direction));
        self.set_layer_mask(layer_mask);
    }

    /// Returns `true` when the sample offsets were regenerated.
    pub fn set_topology(&mut self, topology: RayArrayTopology) -> bool {
        let topology = topology.clamped();
        if topology == self.topology {
            return false;
        }
        self.topology = topology;
        self.offsets.regenerate(&self.topology);
        self.regeneration_count += 1;
        true
    }

    #[inline]
    pub fn set_cast_origin(&mut self, origin: Vec3) {
        self.cast_origin = origin;
    }

    /// Zero-length or non-finite directions fall back to world down.
    pub fn set_cast_direction(&mut self, direction: CastDirection) {
        let dir = direction.to_vector();
        self.cast_direction = if dir.iter().all(|c| c.is_finite()) {
            dir.try_normalize(DIST_EPS)
                .unwrap_or_else(|| CastDirection::Down.to_vector())
        } else {
            CastDirection::Down.to_vector()
        };
    }

    /// Change how far every sample reaches. Offsets do not depend on the length,
    /// so nothing is regenerated.
    #[inline]
    pub fn set_cast_length(&mut self, length: f32) {
        self.topology.cast_length = if length.is_finite() { length.max(0.0) } else { 0.0 };
    }

    #[inline]
    pub fn set_layer_mask(&mut self, mask: LayerMask) {
        self.layer_mask = mask;
    }

    pub fn set_use_plane_distance(&mut self, enabled: bool) {
        self.use_plane_distance = enabled;
    }

    pub fn set_average_normals(&mut self, enabled: bool) {
        self.average_normals = enabled;
    }

    /// Run one cast batch against `world` and reduce it.
    ///
    /// With no hit, only `detected` (and `hit_count`) change; the other fields
    /// keep the values of the last successful cast.
    pub fn cast<W: SceneQuery + ?Sized>(&mut self, world: &W) -> ProbeResult {
        let dir = self.cast_direction;
        let length = self.topology.cast_length;
        let radius = self.topology.cast_radius;

        let mut best: Option<(f32, HitRecord)> = None;
        let mut normal_sum = Vec3::zeros();
        let mut hit_count = 0usize;

        for offset in self.offsets.iter() {
            let origin = self.cast_origin + project_on_plane(offset, &dir);
            let hit = match self.topology.cast_kind {
                CastKind::Ray => world.cast_ray(origin, dir, length, self.layer_mask),
                CastKind::Sphere => {
                    world.cast_sphere(origin, radius, dir, length, self.layer_mask)
                }
            };
            let Some(hit) = hit else {
                continue;
            };

            let distance = if self.use_plane_distance {
                plane_distance(&self.cast_origin, &dir, &hit.point)
            } else {
                hit.distance
            };
            if !distance.is_finite() || !hit.normal.iter().all(|c| c.is_finite()) {
                continue;
            }

            hit_count += 1;
            normal_sum += hit.normal;

            if best.as_ref().map_or(true, |(d, _)| distance < *d) {
                best = Some((distance, hit));
            }
        }

        self.result.hit_count = hit_count;
        let Some((distance, hit)) = best else {
            self.result.detected = false;
            return self.result;
        };

        let normal = if hit_count > 1 && self.average_normals {
            normal_sum.try_normalize(DIST_EPS).unwrap_or(hit.normal)
        } else {
            hit.normal
        };

        self.result = ProbeResult {
            detected: true,
            closest_distance: distance,
            raw_distance: hit.distance,
            normal,
            point: hit.point,
            collider: Some(hit.collider),
            hit_count,
        };
        self.result
    }

    #[inline]
    pub fn last_result(&self) -> &ProbeResult {
        &self.result
    }

    #[inline]
    pub fn has_detected_hit(&self) -> bool {
        self.result.detected
    }

    /// Normalized distance of the last detected hit.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.result.closest_distance
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        self.result.normal
    }

    #[inline]
    pub fn point(&self) -> Vec3 {
        self.result.point
    }

    #[inline]
    pub fn collider(&self) -> Option<crate::types::ColliderRef> {
        self.result.collider
    }

    #[inline]
    pub fn offsets(&self) -> &RaySampleOffsets {
        &self.offsets
    }

    #[inline]
    pub fn topology(&self) -> &RayArrayTopology {
        &self.topology
    }

    #[inline]
    pub fn cast_origin(&self) -> Vec3 {
        self.cast_origin
    }

    #[inline]
    pub fn cast_direction(&self) -> Vec3 {
        self.cast_direction
    }

    #[inline]
    pub fn layer_mask(&self) -> LayerMask {
        self.layer_mask
    }

    /// How many times sample offsets have been generated (construction included).
    #[inline]
    pub fn regeneration_count(&self) -> u64 {
        self.regeneration_count
    }

    /// World-space origin of every sample, in cast order.
    pub fn sample_origins(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.offsets
            .iter()
            .map(|offset| self.cast_origin + project_on_plane(offset, &self.cast_direction))
    }
}

/// Remove the component of `v` along the unit `normal`.
#[inline]
fn project_on_plane(v: &Vec3, normal: &Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Unsigned distance from `point` to the plane through `origin` with unit `normal`.
#[inline]
fn plane_distance(origin: &Vec3, normal: &Vec3, point: &Vec3) -> f32 {
    (point - origin).dot(normal).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{AnalyticWorld, Surface};

    fn ring(rays: u32, radius: f32, kind: CastKind) -> RayArrayTopology {
        RayArrayTopology {
            rows: 1,
            rays_per_row: rays,
            offset_alternate_rows: false,
            cast_radius: radius,
            cast_length: 5.0,
            cast_kind: kind,
        }
    }

    fn down_probe(topology: RayArrayTopology, origin: Vec3) -> RayArrayProbe {
        let mut probe = RayArrayProbe::default();
        probe.configure(topology, origin, Vec3::new(0.0, -1.0, 0.0), LayerMask::all());
        probe
    }

    #[test]
    fn flat_ground_normal_is_the_plane_normal_for_any_ray_count() {
        let world = AnalyticWorld::new(vec![Surface::plane(Vec3::zeros(), Vec3::y())]);

        for (rows, rays) in [(1, 2), (1, 8), (2, 8), (3, 5)] {
            for kind in [CastKind::Ray, CastKind::Sphere] {
                let topology = RayArrayTopology {
                    rows,
                    rays_per_row: rays,
                    offset_alternate_rows: true,
                    cast_radius: 0.4,
                    cast_length: 5.0,
                    cast_kind: kind,
                };
                let mut probe = down_probe(topology, Vec3::new(0.0, 1.0, 0.0));
                let result = probe.cast(&world);

                assert!(result.detected);
                assert!(result.hit_count >= 2);
                assert!((result.normal - Vec3::y()).norm() < 1.0e-5);
                assert!((result.closest_distance - 1.0).abs() < 1.0e-5);
            }
        }
    }

    #[test]
    fn single_hit_reports_raw_normal_unmodified() {
        let tilted = Vec3::new(0.3, 1.0, 0.1).normalize();
        let world = AnalyticWorld::new(vec![Surface::patch(
            Vec3::new(1.0, 0.0, 0.0),
            tilted,
            0.3,
        )]);

        let mut probe = down_probe(ring(4, 1.0, CastKind::Ray), Vec3::new(0.0, 1.0, 0.0));
        let result = probe.cast(&world);

        assert!(result.detected);
        assert_eq!(result.hit_count, 1);
        assert_eq!(result.normal, tilted);
    }

    #[test]
    fn closest_hit_uses_plane_distance() {
        // A raised ledge under the +X sample only.
        let world = AnalyticWorld::new(vec![
            Surface::plane(Vec3::zeros(), Vec3::y()),
            Surface::patch(Vec3::new(1.0, 0.2, 0.0), Vec3::y(), 0.2),
        ]);

        let mut probe = down_probe(ring(4, 1.0, CastKind::Ray), Vec3::new(0.0, 1.0, 0.0));
        let result = probe.cast(&world);

        assert!(result.detected);
        assert!((result.closest_distance - 0.8).abs() < 1.0e-5);
        assert!((result.point - Vec3::new(1.0, 0.2, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn first_sample_wins_exact_ties() {
        let world = AnalyticWorld::new(vec![Surface::plane(Vec3::zeros(), Vec3::y())]);
        let mut probe = down_probe(ring(4, 1.0, CastKind::Ray), Vec3::new(0.0, 1.0, 0.0));
        let result = probe.cast(&world);

        // Sample 0 sits on +Z.
        assert!((result.point - Vec3::new(0.0, 0.0, 1.0)).norm() < 1.0e-5);
    }

    #[test]
    fn raw_distance_mode_compares_cast_lengths() {
        // Sloped plane: lateral samples hit at different raw distances.
        let normal = Vec3::new(-0.5, 1.0, 0.0).normalize();
        let world = AnalyticWorld::new(vec![Surface::plane(Vec3::zeros(), normal)]);

        let mut probe = down_probe(ring(2, 1.0, CastKind::Ray), Vec3::new(0.0, 2.0, 0.0));
        probe.set_use_plane_distance(false);
        let result = probe.cast(&world);

        // Samples at z = +1 and z = -1 both hit y = 0, so the first one wins with raw
        // distance 2.
        assert!(result.detected);
        assert!((result.raw_distance - 2.0).abs() < 1.0e-5);
        assert_eq!(result.closest_distance, result.raw_distance);
    }

    #[test]
    fn averaging_can_be_disabled() {
        let tilted = Vec3::new(0.5, 1.0, 0.0).normalize();
        let world = AnalyticWorld::new(vec![
            Surface::plane(Vec3::zeros(), Vec3::y()),
            Surface::patch(Vec3::new(1.0, 0.2, 0.0), tilted, 0.2),
        ]);
        let mut probe = down_probe(ring(4, 1.0, CastKind::Ray), Vec3::new(0.0, 1.0, 0.0));

        let averaged = probe.cast(&world);
        assert_eq!(averaged.hit_count, 4);
        assert!((averaged.normal.norm() - 1.0).abs() < 1.0e-5);
        assert!(averaged.normal.x > 0.0 && averaged.normal.x < tilted.x);

        probe.set_average_normals(false);
        let raw = probe.cast(&world);
        assert_eq!(raw.normal, tilted);
    }

    #[test]
    fn miss_keeps_previous_fields_but_clears_detected() {
        let world = AnalyticWorld::new(vec![Surface::plane(Vec3::zeros(), Vec3::y())]);
        let mut probe = down_probe(ring(3, 0.5, CastKind::Sphere), Vec3::new(0.0, 1.0, 0.0));

        let hit = probe.cast(&world);
        assert!(hit.detected);

        probe.set_cast_origin(Vec3::new(0.0, 100.0, 0.0));
        let miss = probe.cast(&world);

        assert!(!miss.detected);
        assert_eq!(miss.hit_count, 0);
        assert_eq!(miss.point, hit.point);
        assert_eq!(miss.normal, hit.normal);
        assert!(!probe.has_detected_hit());
    }

    #[test]
    fn empty_world_never_detects() {
        let world = AnalyticWorld::new(Vec::new());
        let mut probe = down_probe(ring(8, 0.5, CastKind::Sphere), Vec3::zeros());

        let result = probe.cast(&world);
        assert!(!result.detected);
        assert_eq!(result.collider, None);
    }

    #[test]
    fn topology_changes_regenerate_offsets_once() {
        let mut probe = RayArrayProbe::default();
        assert_eq!(probe.regeneration_count(), 1);

        let topology = ring(6, 0.5, CastKind::Ray);
        probe.configure(topology, Vec3::zeros(), Vec3::new(0.0, -1.0, 0.0), LayerMask::all());
        assert_eq!(probe.regeneration_count(), 2);
        assert_eq!(probe.offsets().len(), 6);

        probe.configure(topology, Vec3::y(), Vec3::new(0.0, -1.0, 0.0), LayerMask::all());
        assert_eq!(probe.regeneration_count(), 2);

        // Length changes never touch offsets.
        probe.set_cast_length(12.0);
        assert_eq!(probe.regeneration_count(), 2);
        assert_eq!(probe.topology().cast_length, 12.0);
    }

    #[test]
    fn invalid_counts_are_clamped() {
        let mut probe = RayArrayProbe::default();
        probe.set_topology(RayArrayTopology {
            rows: 0,
            rays_per_row: 0,
            ..RayArrayTopology::default()
        });

        assert_eq!(probe.topology().rows, 1);
        assert_eq!(probe.topology().rays_per_row, 1);
        assert_eq!(probe.offsets().as_slice(), &[Vec3::zeros()]);
    }

    #[test]
    fn degenerate_direction_falls_back_to_down() {
        let mut probe = RayArrayProbe::default();

        probe.set_cast_direction(CastDirection::Custom(Vec3::zeros()));
        assert_eq!(probe.cast_direction(), Vec3::new(0.0, -1.0, 0.0));

        probe.set_cast_direction(CastDirection::Custom(Vec3::new(f32::NAN, 1.0, 0.0)));
        assert_eq!(probe.cast_direction(), Vec3::new(0.0, -1.0, 0.0));

        probe.set_cast_direction(CastDirection::Custom(Vec3::new(0.0, 0.0, 3.0)));
        assert!((probe.cast_direction() - Vec3::z()).norm() < 1.0e-6);
    }

    #[test]
    fn offsets_are_projected_onto_the_cast_plane() {
        // Casting along +X: the X component of every offset is removed.
        let mut probe = RayArrayProbe::default();
        probe.configure(
            ring(4, 1.0, CastKind::Ray),
            Vec3::zeros(),
            Vec3::x(),
            LayerMask::all(),
        );

        for origin in probe.sample_origins() {
            assert!(origin.x.abs() < 1.0e-6);
        }
    }

    #[test]
    fn layer_mask_is_forwarded_to_the_world() {
        let layer = crate::Layer::new(6).unwrap();
        let world = AnalyticWorld::new(vec![
            Surface::plane(Vec3::zeros(), Vec3::y()).on_layer(layer),
        ]);
        let mut probe = down_probe(ring(2, 0.5, CastKind::Ray), Vec3::y());

        probe.set_layer_mask(LayerMask::all().without(layer));
        assert!(!probe.cast(&world).detected);

        probe.set_layer_mask(LayerMask::all());
        assert!(probe.cast(&world).detected);
    }
}
