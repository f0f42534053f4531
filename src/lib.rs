#![doc = "The `taskledger` library crate."]
#![doc = ""]
#![doc = "Per-user task tracking over HTTP: account registration and login with signed"]
#![doc = "session tokens, and task CRUD where every operation is scoped to the caller."]
#![doc = "The binary (`main.rs`) only loads configuration and starts the server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod users;

pub use crate::error::AppError;
pub use crate::state::AppState;
