use thiserror::Error;

pub mod catalog;
pub mod identity;
pub mod payment;

pub use catalog::{CatalogProvider, MovieDetail, MovieSummary, TmdbClient};
pub use identity::{IdentityProvider, Profile, ProfileStoreClient};
pub use payment::{
    CheckoutSession, CheckoutSessionRequest, HostedCheckoutClient, PaymentProvider, SessionStatus,
};

/// Errors from the external provider clients.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected {provider} response: {message}")]
    Decode {
        provider: &'static str,
        message: String,
    },
}

pub(crate) fn check_status(
    provider: &'static str,
    resp: &reqwest::Response,
) -> Result<(), ProviderError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").into(),
        });
    }
    Ok(())
}
