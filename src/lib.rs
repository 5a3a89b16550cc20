pub mod auth;
pub mod carga_notas;
pub mod config;
pub mod db;
pub mod error;
pub mod excel;
pub mod models;
pub mod server;
pub mod server_handlers;
pub mod texto;

pub use config::Config;
pub use server::{run_server, rutas, AppState};
