//! Generation client abstraction
//!
//! Every model provider implements [`GenerationClient`]: generate text from a
//! prompt, optionally grounded on a video reference, optionally as JSON. The
//! pipeline works with any implementation without knowing transport details.

mod gemini_backend;
pub(crate) mod http_client;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

pub use learnsphere_config as config;
pub use learnsphere_utils::error::{GenerationError, StopReason};
pub use types::{DEFAULT_TEMPERATURE, GenerationClient, GenerationRequest, GenerationResult};

pub(crate) use gemini_backend::GeminiBackend;

use crate::config::Config;

/// Provider names accepted by [`from_config`]
pub const SUPPORTED_PROVIDERS: &[&str] = &["gemini"];

fn construct_backend_for_provider(
    provider: &str,
    config: &Config,
) -> Result<Box<dyn GenerationClient>, GenerationError> {
    match provider {
        "gemini" => {
            let backend = GeminiBackend::new_from_config(config)?;
            Ok(Box::new(backend))
        }
        unknown => Err(GenerationError::Unsupported(format!(
            "Unknown generation provider '{}'. Supported providers: {}.",
            unknown,
            SUPPORTED_PROVIDERS.join(", ")
        ))),
    }
}

/// Create a generation client from configuration.
///
/// A missing API key does not fail construction; the client reports
/// `GenerationError::MissingCredential` on its first request instead.
///
/// # Errors
///
/// Returns `GenerationError::Unsupported` if the provider is unknown and
/// `GenerationError::Misconfiguration` if the HTTP client cannot be built.
pub fn from_config(config: &Config) -> Result<Box<dyn GenerationClient>, GenerationError> {
    construct_backend_for_provider(config.provider(), config)
}
