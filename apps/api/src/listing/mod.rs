pub mod generator;
pub mod models;
pub mod orchestrator;
pub mod prompts;
pub mod validation;
