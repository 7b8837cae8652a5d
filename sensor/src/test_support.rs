//! Exact, allocation-free collision world for unit tests.
//!
//! Surfaces are one-sided: only casts approaching against the normal hit.

use crate::{
    layers::{Layer, LayerMask},
    query::SceneQuery,
    types::{ColliderRef, HitRecord, Vec3},
};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Surface {
    point: Vec3,
    normal: Vec3,
    /// Disc radius around `point`; `None` for an infinite plane.
    extent: Option<f32>,
    layer: Layer,
}

impl Surface {
    pub(crate) fn plane(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal,
            extent: None,
            layer: Layer::DEFAULT,
        }
    }

    pub(crate) fn patch(center: Vec3, normal: Vec3, radius: f32) -> Self {
        Self {
            extent: Some(radius),
            ..Self::plane(center, normal)
        }
    }

    pub(crate) fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    fn contains(&self, point: &Vec3) -> bool {
        self.extent
            .is_none_or(|r| (point - self.point).norm() <= r + 1.0e-6)
    }

    /// Time of impact for a sphere of `radius` (zero for rays) and its contact point.
    fn cast(&self, origin: Vec3, dir: Vec3, radius: f32, max: f32) -> Option<(f32, Vec3)> {
        let approach = -self.normal.dot(&dir);
        if approach <= 0.0 {
            return None;
        }
        let separation = self.normal.dot(&(origin - self.point)) - radius;
        if radius > 0.0 && separation < 0.0 {
            // Overlapping spheres fall back to a ray, like the Rapier world.
            return self.cast(origin, dir, 0.0, max);
        }
        if separation < -1.0e-6 {
            return None;
        }
        let t = (separation / approach).max(0.0);
        if t > max {
            return None;
        }
        let contact = origin + dir * t - self.normal * radius;
        self.contains(&contact).then_some((t, contact))
    }
}

pub(crate) struct AnalyticWorld {
    surfaces: Vec<Surface>,
}

impl AnalyticWorld {
    pub(crate) fn new(surfaces: Vec<Surface>) -> Self {
        Self { surfaces }
    }

    fn closest(
        &self,
        origin: Vec3,
        dir: Vec3,
        radius: f32,
        max: f32,
        mask: LayerMask,
    ) -> Option<HitRecord> {
        let mut best: Option<HitRecord> = None;
        for (i, s) in self.surfaces.iter().enumerate() {
            if !mask.has(s.layer) {
                continue;
            }
            let Some((t, point)) = s.cast(origin, dir, radius, max) else {
                continue;
            };
            if best.as_ref().is_none_or(|b| t < b.distance) {
                best = Some(HitRecord {
                    point,
                    normal: s.normal,
                    distance: t,
                    collider: ColliderRef(i as u64),
                });
            }
        }
        best
    }
}

impl SceneQuery for AnalyticWorld {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<HitRecord> {
        self.closest(origin, direction, 0.0, max_distance, mask)
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<HitRecord> {
        self.closest(origin, direction, radius, max_distance, mask)
    }
}
