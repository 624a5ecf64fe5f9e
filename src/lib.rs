//! Prompt-to-image client for hosted text-to-image inference endpoints.
//!
//! A [`controller::GenerationController`] mediates one prompt, one remote call
//! and one outcome, exposing busy/image/error state to a presentation layer.

pub mod ai;
pub mod app;
pub mod controller;
pub mod error;
pub mod image;
pub mod models;

pub use error::{Error, Result};
