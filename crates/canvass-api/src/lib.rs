//! Canvass API — the axum HTTP surface over the account, catalog and
//! settings services.

pub mod error;
pub mod extract;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::{AppState, Services};
