pub mod config;
mod current_user;
mod http_layers;
pub mod metrics;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use current_user::CurrentUser;
pub use http_layers::*;
pub use server::{make_app, run_server};
