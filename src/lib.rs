#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions, clippy::missing_errors_doc)]

pub mod app;
pub mod collaborators;
pub mod config;
pub mod data_url;
pub mod error;
pub mod gemini;
pub mod image_gen;
pub mod logging;
pub mod models;
pub mod outfit_text;
pub mod pipeline;
pub mod prompt;
pub mod routes;
pub mod search;
pub mod translate;
pub mod vision;

pub use app::build_app;
