pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod global;
pub mod mover;
pub mod recording;
pub mod relocate;
pub mod transform;

pub use error::{MoverError, MoverResult};
