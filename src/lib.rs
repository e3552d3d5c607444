#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::new_without_default
)]

pub mod analysis;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod seed;
pub mod sefirot;
pub mod store;

pub use config::Config;
pub use error::TikunError;
