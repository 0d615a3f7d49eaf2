/// The scene: an arena of regions, sources and rays addressed by IDs.
use std::fmt;

use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, info};

use crate::error::{OpticsError, PropagationError, RegionError, Result, SceneError};
use crate::math::Vector2;
use crate::propagation::{Propagate, TraceConfig};
use crate::ray::Ray;
use crate::region::{Containment, Region};
use crate::source::{Beam, BeamParams};

slotmap::new_key_type! {
    /// Unique identifier for a region in the scene.
    pub struct RegionId;
}

slotmap::new_key_type! {
    /// Unique identifier for a source in the scene.
    pub struct SourceId;
}

slotmap::new_key_type! {
    /// Unique identifier for a ray in the scene.
    pub struct RayId;
}

/// Callback invoked with each ray whose part chain was recomputed.
pub type RayObserver = Box<dyn FnMut(RayId, &Ray)>;

/// Outcome of a propagation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationReport {
    /// Rays whose part chains were recomputed, in scene order.
    pub traced: Vec<RayId>,
    /// Rays that stopped early; they are left [`crate::RayStatus::Incomplete`].
    pub failures: Vec<(RayId, PropagationError)>,
}

impl PropagationReport {
    /// Returns whether every traced ray ran to completion.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turns the first failure, if any, into an error.
    ///
    /// # Errors
    ///
    /// Returns the first per-ray `PropagationError`.
    pub fn into_result(self) -> Result<Self> {
        match self.failures.first() {
            Some((_, err)) => Err(err.clone().into()),
            None => Ok(self),
        }
    }
}

/// Central arena that owns all regions, sources and rays.
///
/// Entities reference each other via typed IDs (generational indices);
/// the source → rays relation is kept here rather than inside the
/// entities. Regions are read-only during propagation.
///
/// Adding a region or source marks the affected rays for re-tracing,
/// picked up by the next [`Scene::update`] or [`Scene::propagate`]. Every
/// other edit re-traces the affected rays immediately, starting from the
/// earliest part the edit can influence.
pub struct Scene {
    config: TraceConfig,
    regions: SlotMap<RegionId, Region>,
    region_order: Vec<RegionId>,
    sources: SlotMap<SourceId, Beam>,
    source_order: Vec<SourceId>,
    rays: SlotMap<RayId, Ray>,
    source_rays: SecondaryMap<SourceId, Vec<RayId>>,
    stale: SecondaryMap<RayId, usize>,
    observer: Option<RayObserver>,
}

impl Scene {
    /// Creates an empty scene with the default [`TraceConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TraceConfig::default())
    }

    /// Creates an empty scene with the given configuration.
    #[must_use]
    pub fn with_config(config: TraceConfig) -> Self {
        Self {
            config,
            regions: SlotMap::with_key(),
            region_order: Vec::new(),
            sources: SlotMap::with_key(),
            source_order: Vec::new(),
            rays: SlotMap::with_key(),
            source_rays: SecondaryMap::new(),
            stale: SecondaryMap::new(),
            observer: None,
        }
    }

    /// Tracing configuration.
    #[must_use]
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Installs a callback run after each ray's part chain changes.
    pub fn set_observer(&mut self, observer: RayObserver) {
        self.observer = Some(observer);
    }

    /// Removes the part-change callback.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // --- Region operations ---

    /// Registers a closed region.
    ///
    /// # Errors
    ///
    /// Returns `RegionError::Unclosed` if the region was never closed; the
    /// scene is unchanged.
    pub fn add_region(&mut self, region: Region) -> Result<RegionId> {
        check_closed(&region)?;
        self.mark_touching(&region)?;
        let id = self.regions.insert(region);
        self.region_order.push(id);
        debug!(regions = self.region_order.len(), "region added");
        Ok(id)
    }

    /// Returns a region, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn region(&self, id: RegionId) -> Result<&Region> {
        self.regions
            .get(id)
            .ok_or_else(|| SceneError::EntityNotFound("region".into()).into())
    }

    /// Regions in insertion order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.region_order
            .iter()
            .filter_map(|&id| self.regions.get(id).map(|r| (id, r)))
    }

    /// Swaps in a new boundary/index for an existing region and re-traces
    /// the rays it affects.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID and
    /// `RegionError::Unclosed` for an open region.
    pub fn replace_region(&mut self, id: RegionId, region: Region) -> Result<PropagationReport> {
        check_closed(&region)?;
        let old = self.region(id)?.clone();
        self.mark_touching(&old)?;
        self.mark_touching(&region)?;
        self.regions[id] = region;
        self.update()
    }

    /// Moves a region by `offset`.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn translate_region(&mut self, id: RegionId, offset: Vector2) -> Result<PropagationReport> {
        let mut region = self.region(id)?.clone();
        region.translate(&offset);
        self.replace_region(id, region)
    }

    /// Changes the interior index of a region.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID and
    /// `OpticsError::InvalidParameter` for an invalid index.
    pub fn set_region_index(&mut self, id: RegionId, n: f64) -> Result<PropagationReport> {
        let mut region = self.region(id)?.clone();
        region.set_index(n)?;
        self.replace_region(id, region)
    }

    /// Removes a region and re-traces the rays it affected.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn remove_region(&mut self, id: RegionId) -> Result<PropagationReport> {
        let old = self.region(id)?.clone();
        self.mark_touching(&old)?;
        self.regions.remove(id);
        self.region_order.retain(|&r| r != id);
        self.update()
    }

    // --- Source operations ---

    /// Registers a beam and creates its rays, untraced.
    ///
    /// # Errors
    ///
    /// Returns the beam's parametrization errors; the scene is unchanged.
    pub fn add_source(&mut self, beam: Beam) -> Result<SourceId> {
        let rays = beam.rays()?;
        let id = self.sources.insert(beam);
        self.source_order.push(id);
        let ids = rays
            .into_iter()
            .map(|ray| {
                let ray_id = self.rays.insert(ray);
                self.stale.insert(ray_id, 0);
                ray_id
            })
            .collect();
        self.source_rays.insert(id, ids);
        Ok(id)
    }

    /// Returns a source, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn source(&self, id: SourceId) -> Result<&Beam> {
        self.sources
            .get(id)
            .ok_or_else(|| SceneError::EntityNotFound("source".into()).into())
    }

    /// Sources in insertion order.
    pub fn sources(&self) -> impl Iterator<Item = (SourceId, &Beam)> {
        self.source_order
            .iter()
            .filter_map(|&id| self.sources.get(id).map(|s| (id, s)))
    }

    /// The rays of a source, boundary rays first and last.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn source_rays(&self, id: SourceId) -> Result<Vec<(RayId, &Ray)>> {
        let ids = self
            .source_rays
            .get(id)
            .ok_or_else(|| OpticsError::from(SceneError::EntityNotFound("source".into())))?;
        ids.iter().map(|&r| Ok((r, self.ray(r)?))).collect()
    }

    /// Re-parametrizes a source and re-traces its rays. Ray IDs are kept
    /// for as many rays as the old and new parametrizations share.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID or the
    /// beam's parametrization errors; the scene is unchanged on error.
    pub fn set_source(&mut self, id: SourceId, params: BeamParams) -> Result<PropagationReport> {
        let mut beam = self.source(id)?.clone();
        beam.set(params)?;
        self.rebuild_source(id, beam)
    }

    /// Moves every ray origin of a source by `offset`.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn translate_source(&mut self, id: SourceId, offset: Vector2) -> Result<PropagationReport> {
        let mut beam = self.source(id)?.clone();
        beam.translate(&offset);
        self.rebuild_source(id, beam)
    }

    /// Removes a source together with its rays.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn remove_source(&mut self, id: SourceId) -> Result<Beam> {
        let beam = self
            .sources
            .remove(id)
            .ok_or_else(|| OpticsError::from(SceneError::EntityNotFound("source".into())))?;
        self.source_order.retain(|&s| s != id);
        for ray_id in self.source_rays.remove(id).unwrap_or_default() {
            self.rays.remove(ray_id);
            self.stale.remove(ray_id);
        }
        Ok(beam)
    }

    // --- Ray access ---

    /// Returns a ray, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID.
    pub fn ray(&self, id: RayId) -> Result<&Ray> {
        self.rays
            .get(id)
            .ok_or_else(|| SceneError::EntityNotFound("ray".into()).into())
    }

    /// Applies a manual edit (e.g. [`Ray::add_part`], [`Ray::change_s`]) to
    /// a ray, then notifies the observer.
    ///
    /// The edited chain is kept as is until the ray is re-traced by
    /// [`Scene::propagate`] or by an edit that touches it.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::EntityNotFound` for an unknown ID, or the
    /// error returned by `edit`.
    pub fn edit_ray<T>(
        &mut self,
        id: RayId,
        edit: impl FnOnce(&mut Ray) -> Result<T>,
    ) -> Result<T> {
        let ray = self
            .rays
            .get_mut(id)
            .ok_or_else(|| OpticsError::from(SceneError::EntityNotFound("ray".into())))?;
        let out = edit(ray)?;
        if let Some(observer) = self.observer.as_mut() {
            observer(id, ray);
        }
        Ok(out)
    }

    /// All rays, grouped by source in insertion order.
    pub fn rays(&self) -> impl Iterator<Item = (RayId, &Ray)> {
        self.ray_order()
            .into_iter()
            .filter_map(|id| self.rays.get(id).map(|r| (id, r)))
    }

    /// Returns whether some rays are waiting to be re-traced.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        !self.stale.is_empty()
    }

    // --- Propagation ---

    /// Re-traces every ray from its origin.
    ///
    /// # Errors
    ///
    /// Fails only on internal inconsistencies; rays that hit the part cap
    /// are reported in [`PropagationReport::failures`].
    pub fn propagate(&mut self) -> Result<PropagationReport> {
        for id in self.ray_order() {
            self.stale.insert(id, 0);
        }
        let report = self.update()?;
        info!(
            rays = report.traced.len(),
            failures = report.failures.len(),
            "scene propagated"
        );
        Ok(report)
    }

    /// Re-traces only the rays marked by earlier edits, each from the
    /// earliest part the edits can influence.
    ///
    /// # Errors
    ///
    /// See [`Scene::propagate`].
    pub fn update(&mut self) -> Result<PropagationReport> {
        let order = self.ray_order();
        let regions: Vec<&Region> = self
            .region_order
            .iter()
            .filter_map(|&id| self.regions.get(id))
            .collect();
        let engine = Propagate::new(&regions, &self.config);

        let mut report = PropagationReport::default();
        for id in order {
            let Some(from) = self.stale.remove(id) else {
                continue;
            };
            let Some(ray) = self.rays.get_mut(id) else {
                continue;
            };
            match engine.execute(ray, from) {
                Ok(()) => {}
                Err(OpticsError::Propagation(err)) => report.failures.push((id, err)),
                Err(err) => return Err(err),
            }
            report.traced.push(id);
            if let Some(observer) = self.observer.as_mut() {
                observer(id, ray);
            }
        }
        Ok(report)
    }

    fn ray_order(&self) -> Vec<RayId> {
        self.source_order
            .iter()
            .filter_map(|&s| self.source_rays.get(s))
            .flatten()
            .copied()
            .collect()
    }

    fn rebuild_source(&mut self, id: SourceId, beam: Beam) -> Result<PropagationReport> {
        let rays = beam.rays()?;
        let mut ids = self.source_rays.remove(id).unwrap_or_default();
        for surplus in ids.drain(rays.len().min(ids.len())..) {
            self.rays.remove(surplus);
            self.stale.remove(surplus);
        }
        for (k, ray) in rays.into_iter().enumerate() {
            match ids.get(k) {
                Some(&ray_id) => self.rays[ray_id] = ray,
                None => ids.push(self.rays.insert(ray)),
            }
        }
        for &ray_id in &ids {
            self.stale.insert(ray_id, 0);
        }
        self.source_rays.insert(id, ids);
        self.sources[id] = beam;
        self.update()
    }

    /// Marks every ray that `region` can influence, from the earliest such part.
    fn mark_touching(&mut self, region: &Region) -> Result<()> {
        for (id, ray) in &self.rays {
            if let Some(from) = earliest_affected(ray, region, &self.config)? {
                let from = self.stale.get(id).map_or(from, |&f| f.min(from));
                self.stale.insert(id, from);
            }
        }
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("config", &self.config)
            .field("regions", &self.regions)
            .field("sources", &self.sources)
            .field("rays", &self.rays)
            .field("stale", &self.stale)
            .finish_non_exhaustive()
    }
}

fn check_closed(region: &Region) -> Result<()> {
    if !region.is_closed() {
        return Err(RegionError::Unclosed {
            segments: region.curves().len(),
        }
        .into());
    }
    Ok(())
}

/// First part of `ray` whose leg crosses the boundary of `region`.
///
/// A ray starting inside or on the region is affected from part 0, since
/// both its starting medium and the media it returns to on exits depend on
/// the region.
fn earliest_affected(ray: &Ray, region: &Region, config: &TraceConfig) -> Result<Option<usize>> {
    let tol = &config.tolerance;
    if region.classify(ray.line0().origin(), tol)? != Containment::Outside {
        return Ok(Some(0));
    }
    for (i, part) in ray.parts().iter().enumerate() {
        let eps = tol.eps_at(part.line.origin());
        if let Some(hit) = region.intersect(&part.line, tol)?.first() {
            if hit.distance <= part.s + eps {
                return Ok(Some(i));
            }
        }
    }
    Ok(None)
}
