mod auth_routes;
pub mod config;
mod error;
mod http_layers;
mod json_body;
pub mod metrics;
pub mod server;
pub(self) mod session;
mod slideshow_routes;
pub mod state;
mod submission_routes;
mod video_routes;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use http_layers::*;
pub use server::{make_app, run_server};
pub use state::ServerState;
