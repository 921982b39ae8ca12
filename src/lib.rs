pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::AtlasConfig;

pub use crate::core::map_sync::{MapController, MapSettings};
pub use crate::core::search::{SearchOutcome, SearchSession};
pub use crate::core::selection::SelectionBridge;
pub use crate::core::view::AtlasView;
pub use crate::utils::error::{AtlasError, Result};
