use std::collections::HashMap;
use std::sync::Arc;

use super::tables::{self, GeometryTable};
use super::{AssetSource, GeometrySource, ModelCategory, ModelGeometry, NoAssets};

/// Assets at or below this size are treated as placeholders and ignored.
pub const MIN_ASSET_BYTES: u64 = 1024;

/// Lookup counters.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Resolves model ids to shared, immutable geometry.
///
/// Lookups are memoized by the category's asset path. Resolution never fails: a
/// missing, undersized or unreadable asset falls back to procedural geometry.
pub struct ModelCache {
    assets: Box<dyn AssetSource>,
    min_asset_bytes: u64,
    entries: HashMap<&'static str, Arc<ModelGeometry>>,
    stats: CacheStats,
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new(Box::new(NoAssets))
    }
}

impl ModelCache {
    pub fn new(assets: Box<dyn AssetSource>) -> Self {
        Self::with_threshold(assets, MIN_ASSET_BYTES)
    }

    pub fn with_threshold(assets: Box<dyn AssetSource>, min_asset_bytes: u64) -> Self {
        Self {
            assets,
            min_asset_bytes,
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Geometry for `model_id`, loading it on first use.
    pub fn resolve(&mut self, model_id: &str) -> Arc<ModelGeometry> {
        let category = ModelCategory::resolve(model_id);
        let key = category.cache_key();

        if let Some(geometry) = self.entries.get(key) {
            self.stats.hits += 1;
            return geometry.clone();
        }

        self.stats.misses += 1;
        let geometry = Arc::new(self.load(category));
        log::info!(
            "model {model_id:?} -> {} ({} vertices, {:?})",
            category.display_name(),
            geometry.vertex_count(),
            geometry.source(),
        );
        self.entries.insert(key, geometry.clone());
        geometry
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached entry. Geometry already handed out stays valid.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn load(&self, category: ModelCategory) -> ModelGeometry {
        if let Some(geometry) = self.load_asset(category) {
            return geometry;
        }
        build(category, tables::procedural(category), GeometrySource::Procedural)
    }

    fn load_asset(&self, category: ModelCategory) -> Option<ModelGeometry> {
        let path = category.asset_path()?;

        match self.assets.size(path) {
            Ok(size) if size > self.min_asset_bytes => {}
            Ok(size) => {
                log::debug!("asset {path} too small ({size} bytes); using procedural model");
                return None;
            }
            Err(e) => {
                log::debug!("asset {path} unavailable: {e}");
                return None;
            }
        }

        let bytes = match self.assets.read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("failed to read asset {path}: {e}; using procedural model");
                return None;
            }
        };
        log::debug!("asset {path}: {} bytes", bytes.len());

        let table = tables::detailed(category)?;
        Some(build(category, table, GeometrySource::Asset { path: path.to_string() }))
    }
}

fn build(category: ModelCategory, table: &GeometryTable, source: GeometrySource) -> ModelGeometry {
    ModelGeometry::from_triangles(category, table.triangles, table.color, source)
}
