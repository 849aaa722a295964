//! Configuration schema and file loading.

pub mod loader;
pub mod schema;

pub use loader::{data_dir, discover_and_load, load_config};
pub use schema::WaygateConfig;
