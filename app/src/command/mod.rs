//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a unit strategy with its own input type, dispatched
//! statically from `main`.

use amie_config::Config;
use amie_core::LLMProvider;
use amie_providers::{OpenAiProvider, RetryPolicy};
use tracing::info;

mod chat;
mod info;
mod ingest;
mod init;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use ingest::{IngestInput, IngestStrategy};
pub use init::InitStrategy;
pub use version::VersionStrategy;

/// Build the oracle client from the `providers.openai` and `retry` sections.
fn build_provider(config: &Config) -> anyhow::Result<OpenAiProvider> {
    let Some(api_key) = config.providers.openai.resolved_api_key() else {
        anyhow::bail!(
            "No API key configured. Set providers.openai.api_key in {} or export {}",
            Config::config_dir()?.join("config.json").display(),
            amie_config::API_KEY_ENV
        );
    };

    let retry = RetryPolicy::from_secs(
        &config.retry.base_delays_secs,
        config.retry.final_retries,
        config.retry.final_delay_secs,
    );
    info!("Oracle retry policy allows {} attempts", retry.attempts());

    let mut provider = OpenAiProvider::new(api_key).with_retry_policy(retry);
    if let Some(base_url) = &config.providers.openai.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(provider)
}

/// Pick the model: command-line override, then `agents.defaults.model`, then
/// the provider's own default when the config leaves it blank.
fn resolve_model(model: Option<String>, config: &Config, provider: &impl LLMProvider) -> String {
    model
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let configured = config.agents.defaults.model.trim();
            (!configured.is_empty()).then(|| configured.to_string())
        })
        .unwrap_or_else(|| provider.get_default_model().to_string())
}

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// adding a command only requires implementing this trait.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}
