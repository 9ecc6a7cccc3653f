//! Model geometry resolution.
//!
//! A free-form model id (e.g. `"blue_mosque"`, `"Batu Caves"`) resolves to a
//! [`ModelCategory`] by keyword. The category's asset is used when present;
//! otherwise geometry is synthesized from a built-in triangle table. Results are
//! memoized in [`ModelCache`].

mod assets;
mod cache;
mod category;
mod geometry;
mod tables;

pub use assets::{AssetSource, DirAssetSource, NoAssets};
pub use cache::{CacheStats, ModelCache, MIN_ASSET_BYTES};
pub use category::{ModelCategory, DEFAULT_MODEL_ID};
pub use geometry::{face_normal, GeometrySource, ModelGeometry};
