//! Decides where an interactively placed point lands.
//!
//! Two providers compete on every cursor move: the internal locator scan
//! over the configured layers, and an optional external (host-side) snap.
//! The resolver arbitrates between them and exposes a single optional
//! snapped point, so callers never need to know which provider supplied it.

use geo::Point;
use log::debug;

use crate::network::{FeatureSource, SourceId};

#[doc(hidden)]
pub mod locator;

#[doc(inline)]
pub use locator::PointLocator;

/// How the internal provider matches a cursor position onto a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapMethod {
    /// Internal snapping disabled.
    None,
    /// Match the nearest feature vertex.
    Vertex,
    /// Match the nearest point on a feature segment.
    Edge,
}

/// A resolved snap: the matched point and every layer that matched there.
///
/// The point always comes from the first matching layer in configured
/// iteration order; later layers only contribute their ids.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapMatch {
    pub point: Point<f64>,
    pub sources: Vec<SourceId>,
}

/// A host-side snap provider, queried alongside the internal locators.
pub trait ExternalSnap {
    fn snap(&self, cursor: Point<f64>) -> Option<Point<f64>>;
}

/// One cursor-move query. `units_per_pixel` converts the resolver's pixel
/// tolerance into layer units at the current view scale.
#[derive(Clone, Copy, Debug)]
pub struct SnapQuery {
    pub cursor: Point<f64>,
    pub units_per_pixel: f64,
}

/// Arbitrates snap matches across layers and providers.
///
/// Stateless per query: each call inspects the current locator cache and
/// returns a fresh match. The cache itself is rebuilt by the caller via
/// [`SnapResolver::set_layers`] whenever the selected-layer set changes.
pub struct SnapResolver {
    layers: Vec<(SourceId, PointLocator)>,
    method: SnapMethod,
    tolerance_pixels: f64,
    snap_enabled: bool,
    external: Option<Box<dyn ExternalSnap>>,
}

impl SnapResolver {
    pub fn new(method: SnapMethod, tolerance_pixels: f64) -> Self {
        SnapResolver {
            layers: Vec::new(),
            method,
            tolerance_pixels,
            snap_enabled: true,
            external: None,
        }
    }

    /// Rebuilds the locator cache for a new selected-layer set, keeping the
    /// given iteration order. Order decides match priority.
    pub fn set_layers<'a>(&mut self, sources: impl IntoIterator<Item = (SourceId, &'a FeatureSource)>) {
        self.layers = sources
            .into_iter()
            .map(|(id, source)| (id, PointLocator::build(source)))
            .collect();
        debug!("locator cache rebuilt for {} layers", self.layers.len());
    }

    /// Marks one layer's locator as expired (layer removed mid-session).
    pub fn invalidate_layer(&mut self, source: SourceId) {
        for (id, locator) in &mut self.layers {
            if *id == source {
                locator.invalidate();
            }
        }
    }

    pub fn set_method(&mut self, method: SnapMethod) {
        self.method = method;
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    pub fn with_external(mut self, provider: Box<dyn ExternalSnap>) -> Self {
        self.external = Some(provider);
        self
    }

    /// Resolves the current snapped point, preferring the internal provider
    /// and falling back to the external one only when the scan found
    /// nothing.
    pub fn resolve(&self, query: &SnapQuery) -> Option<SnapMatch> {
        let external = self
            .external
            .as_ref()
            .and_then(|provider| provider.snap(query.cursor));

        self.resolve_internal(query).or(external.map(|point| SnapMatch {
            point,
            sources: Vec::new(),
        }))
    }

    /// The position a placement request receives: the snapped point verbatim
    /// when snapping is enabled and a match exists, the raw cursor otherwise.
    pub fn placement(&self, query: &SnapQuery) -> Point<f64> {
        if !self.snap_enabled {
            return query.cursor;
        }

        self.resolve(query)
            .map(|matched| matched.point)
            .unwrap_or(query.cursor)
    }

    fn resolve_internal(&self, query: &SnapQuery) -> Option<SnapMatch> {
        if self.method == SnapMethod::None {
            return None;
        }

        let tolerance = self.tolerance_pixels * query.units_per_pixel;
        let mut matched: Option<SnapMatch> = None;

        for (id, locator) in &self.layers {
            let hit = match self.method {
                SnapMethod::Vertex => locator.nearest_vertex(query.cursor, tolerance),
                SnapMethod::Edge => locator.nearest_edge(query.cursor, tolerance),
                SnapMethod::None => None,
            };

            let Some(point) = hit else { continue };

            // First layer in iteration order supplies the point; the rest
            // only contribute their ids.
            match &mut matched {
                None => {
                    matched = Some(SnapMatch {
                        point,
                        sources: vec![*id],
                    })
                }
                Some(existing) => existing.sources.push(*id),
            }
        }

        matched
    }
}
