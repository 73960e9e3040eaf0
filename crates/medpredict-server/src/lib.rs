//! MedPredict Server
//!
//! HTTP front end for the prediction models. Each `/predict/*` route encodes
//! the questionnaire, runs the domain's model from the shared registry and
//! reports a confidence percentage. The common-disease route arbitrates
//! between two models.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::AppError;
pub use routes::{create_router, PredictionResponse};
pub use state::AppState;
