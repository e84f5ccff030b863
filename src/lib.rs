//! Client core for the food relief coordination service.
//!
//! Everything here is UI-toolkit agnostic; the GTK front-end in `main.rs`
//! renders screen snapshots and forwards input.

pub mod api;
pub mod config;
pub mod error;
pub mod realtime;
pub mod resource;
pub mod router;
pub mod scope;
pub mod screens;
pub mod session;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ReliefApi};
pub use config::Config;
pub use error::{Error, ErrorKind, Result, ScreenError};
pub use session::Session;
