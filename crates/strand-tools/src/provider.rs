//! Remote tool providers.
//!
//! A provider is a secondary, network-backed source of tools. Discovery
//! failures never prevent a run from being built: the local tool set is
//! always kept, and the failure is reported back to the caller.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use strand_core::{ProviderError, Tool};
use tracing::{info, warn};

use crate::registry::ToolRegistry;

/// How long a single provider may take to answer discovery.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait RemoteToolProvider: Send + Sync {
    /// Provider name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Fetch the provider's current tool set.
    async fn discover(&self) -> Result<Vec<Arc<dyn Tool>>, ProviderError>;
}

/// Discover tools from every provider and add them to `registry`.
///
/// Local tools win name collisions; colliding or otherwise unregistrable
/// remote tools are skipped with a warning. A provider that does not answer
/// within `timeout` counts as unavailable. Returns the providers that could
/// not be queried.
pub async fn merge_remote_tools(
    registry: &mut ToolRegistry,
    providers: &[Arc<dyn RemoteToolProvider>],
    timeout: Duration,
) -> Vec<ProviderError> {
    let mut failures = Vec::new();

    for provider in providers {
        let discovered = tokio::time::timeout(timeout, provider.discover())
            .await
            .unwrap_or_else(|_| {
                Err(ProviderError::Unavailable {
                    provider: provider.name().to_string(),
                    message: format!(
                        "no answer within {}",
                        humantime::format_duration(timeout)
                    ),
                })
            });
        let tools = match discovered {
            Ok(tools) => tools,
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "remote tool discovery failed; continuing with local tools");
                failures.push(err);
                continue;
            }
        };

        let mut added = 0usize;
        for tool in tools {
            let name = tool.name().to_string();
            match registry.register(tool) {
                Ok(()) => added += 1,
                Err(err) => {
                    warn!(provider = provider.name(), tool.name = %name, error = %err, "skipping remote tool");
                }
            }
        }
        info!(provider = provider.name(), tools = added, "merged remote tools");
    }

    failures
}
