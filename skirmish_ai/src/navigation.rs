// Navigation service: owns the level's navigation graph and answers path
// queries against it.
//
// Lifecycle:
// - `new()` creates an empty service; no graph exists yet.
// - `initialize()` builds the graph via `build_nav_graph()`. Calling it again
//   rebuilds from scratch, replacing the previous graph wholesale.
// - `clear()` drops the graph; the service returns to the uninitialized
//   state. Dropping the service releases everything.
//
// Rebuild and clear take `&mut self`; queries take `&self`. A rebuild can
// therefore never overlap a query, and many queries may share the graph
// concurrently (e.g. one per agent on a rayon pool) without locking.
//
// Querying before `initialize()` is a usage error. `find_path()` degrades
// quietly to an empty path; `try_find_path()` reports
// `NavigationError::NotInitialized` for callers that want to know.
//
// See also: `navmesh.rs` (build), `pathfinding.rs` (A*), `smoothing.rs`.

use crate::config::NavMeshConfig;
use crate::nav::NavGraph;
use crate::navmesh::{NavMeshError, build_nav_graph};
use crate::pathfinding;
use crate::probe::VisibilityProbe;
use crate::smoothing;
use crate::types::{Bounds, Vec3};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum NavigationError {
    #[error("navigation queried before initialize()")]
    NotInitialized,
    #[error("navmesh build failed: {0}")]
    Build(#[from] NavMeshError),
}

#[derive(Debug, Default)]
pub struct NavigationService {
    config: NavMeshConfig,
    graph: Option<NavGraph>,
}

impl NavigationService {
    pub fn new(config: NavMeshConfig) -> Self {
        Self {
            config,
            graph: None,
        }
    }

    /// Build (or rebuild) the graph for `bounds`. On error the previous
    /// graph, if any, is left in place.
    pub fn initialize<P: VisibilityProbe + ?Sized>(
        &mut self,
        bounds: &Bounds,
        step: f32,
        probe: &P,
    ) -> Result<(), NavigationError> {
        let graph = build_nav_graph(bounds, step, probe, &self.config)?;
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            rebuilt = self.graph.is_some(),
            "navigation initialized"
        );
        self.graph = Some(graph);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.graph.is_some()
    }

    /// Read-only view of the graph, e.g. for a debug renderer.
    pub fn graph(&self) -> Option<&NavGraph> {
        self.graph.as_ref()
    }

    /// Waypoints from `from` to `to`. Empty when there is no route or the
    /// service has not been initialized.
    pub fn find_path(&self, from: Vec3, to: Vec3) -> Vec<Vec3> {
        self.try_find_path(from, to).unwrap_or_default()
    }

    pub fn try_find_path(&self, from: Vec3, to: Vec3) -> Result<Vec<Vec3>, NavigationError> {
        let graph = self.graph.as_ref().ok_or(NavigationError::NotInitialized)?;
        Ok(pathfinding::find_path(graph, from, to))
    }

    /// Same contract as `smoothing::smooth_path()`. Needs no graph.
    pub fn smooth_path<P: VisibilityProbe + ?Sized>(&self, path: &[Vec3], probe: &P) -> Vec<Vec3> {
        smoothing::smooth_path(path, probe)
    }

    /// `find_path()` followed by `smooth_path()`.
    pub fn find_smoothed_path<P: VisibilityProbe + ?Sized>(
        &self,
        from: Vec3,
        to: Vec3,
        probe: &P,
    ) -> Vec<Vec3> {
        let raw = self.find_path(from, to);
        self.smooth_path(&raw, probe)
    }

    /// Drop the graph.
    pub fn clear(&mut self) {
        if self.graph.take().is_some() {
            tracing::debug!("navigation cleared");
        }
    }
}
