//! Service layer modules for external integrations.
//!
//! Contains the model provider clients and the persistence store.

pub mod gemini;
pub mod mistral;
pub mod store;

pub use gemini::GeminiClient;
pub use mistral::MistralClient;
pub use store::{spawn_detached, PageRequest, PgStore, Store};
