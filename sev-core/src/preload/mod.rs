//! Asset preloading
//!
//! Walks a fixed manifest of media assets one request at a time and exposes
//! aggregate progress. The license gate stays locked until every entry has
//! settled.

pub mod fetcher;
pub mod manifest;
pub mod preloader;
pub mod state;

pub use fetcher::{AssetFetcher, HttpFetcher};
pub use manifest::AssetManifest;
pub use preloader::Preloader;
pub use state::PreloadState;
