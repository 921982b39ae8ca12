pub mod map_sync;
pub mod preferences;
pub mod ranking;
pub mod search;
pub mod selection;
pub mod view;

pub use crate::domain::model::{EffectiveFilterCriteria, Project, UserProfile};
pub use crate::domain::ports::{AgentSink, CatalogSource, Geocoder, MapSurface};
pub use crate::utils::error::Result;
