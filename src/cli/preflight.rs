//! Pre-flight checks before talking to the endpoint.
//!
//! Validates the credential up front so a missing key is reported once, with
//! a hint, instead of as an HTTP 401 on the first query.

use crate::agent::{ChatEndpoint, OpenAIEndpoint};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use std::sync::Arc;

/// Check that the API key is present.
pub fn check(settings: &Settings) -> Result<()> {
    settings.api_key().map(|_| ())
}

/// Run pre-flight checks and build the endpoint, printing a hint on failure.
pub fn connect(settings: &Settings) -> Result<Arc<dyn ChatEndpoint>> {
    if let Err(e) = check(settings) {
        Output::error(&format!("{}", e));
        Output::info(&format!(
            "Parley reads {} from the environment or from a .env file in the current directory.",
            settings.api.api_key_env
        ));
        return Err(e);
    }

    Ok(Arc::new(OpenAIEndpoint::from_settings(&settings.api)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fails_without_key() {
        let mut settings = Settings::default();
        settings.api.api_key_env = "PARLEY_PREFLIGHT_UNSET_KEY".to_string();
        assert!(check(&settings).is_err());
        assert!(connect(&settings).is_err());
    }
}
