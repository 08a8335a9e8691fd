pub mod catalog_service;
pub mod chart_service;
pub mod cheapest_service;
pub mod history_cache;
pub mod location_service;
pub mod session;
pub mod shopping_list;
pub mod state;
pub mod token;

pub use session::{Command, Session};
pub use state::Snapshot;
