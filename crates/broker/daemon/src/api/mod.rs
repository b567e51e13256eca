//! REST API surface

pub mod handlers;
pub mod router;
pub mod state;
pub mod version;

pub use router::create_router;
pub use state::AppState;
