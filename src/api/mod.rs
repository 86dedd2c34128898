mod auth;
pub mod public;
pub mod routes;
mod server;
pub use server::{app, serve};
mod state;
pub use state::AppState;
