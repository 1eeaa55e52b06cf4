//! Engine entry point: shared model and tools, a fresh [`Run`] per request.

use std::sync::Arc;
use std::time::Duration;
use strand_core::{
    ConfigError, EngineError, ModelCollaborator, ProviderError, RunConfig, Tool,
};
use strand_tools::{
    DEFAULT_DISCOVERY_TIMEOUT, RemoteToolProvider, ToolRegistry, merge_remote_tools,
};
use tracing::{info, warn};

use crate::run::{FinalResult, Run};
use crate::streaming::RunStream;
use crate::think_act::{ThinkAct, ToolCallingAgent};

/// Long-lived engine handle.
///
/// Cheap to share: runs created from it hold only reference-counted
/// pointers to the model and tool set, so any number may execute
/// concurrently without seeing each other's history.
pub struct Engine {
    config: RunConfig,
    agent: Arc<dyn ThinkAct>,
    tools: Arc<ToolRegistry>,
    provider_failures: Vec<ProviderError>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// A new, idle run using this engine's configuration.
    pub fn run(&self) -> Run {
        Run::new(self.config.clone(), self.agent.clone())
    }

    /// Execute a goal to completion on a fresh run.
    pub async fn execute(&self, goal: impl Into<String>) -> Result<FinalResult, EngineError> {
        self.run().execute(goal).await
    }

    /// Execute a goal on a fresh run, streaming its progress.
    pub fn stream(&self, goal: impl Into<String>) -> Result<RunStream, EngineError> {
        self.run().stream(goal)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Tools available to runs, remote tools included.
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Remote providers that could not be reached while building.
    pub fn provider_failures(&self) -> &[ProviderError] {
        &self.provider_failures
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("tools", &self.tools)
            .field("provider_failures", &self.provider_failures)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
pub struct EngineBuilder {
    config: RunConfig,
    model: Option<Arc<dyn ModelCollaborator>>,
    agent: Option<Arc<dyn ThinkAct>>,
    registry: ToolRegistry,
    pending: Vec<Arc<dyn Tool>>,
    providers: Vec<Arc<dyn RemoteToolProvider>>,
    discovery_timeout: Duration,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: RunConfig::default(),
            model: None,
            agent: None,
            registry: ToolRegistry::default(),
            pending: Vec::new(),
            providers: Vec::new(),
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

impl EngineBuilder {
    pub fn config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model(mut self, model: Arc<dyn ModelCollaborator>) -> Self {
        self.model = Some(model);
        self
    }

    /// Use a custom think/act capability instead of the tool-calling agent.
    ///
    /// Tools and providers are ignored when an agent is supplied.
    pub fn agent(mut self, agent: Arc<dyn ThinkAct>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Register a local tool. Name problems surface from [`build`](Self::build).
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.pending.push(tool);
        self
    }

    /// Start from an existing registry.
    pub fn tools(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add a remote tool provider, queried once during [`build`](Self::build).
    pub fn remote_provider(mut self, provider: Arc<dyn RemoteToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Upper bound on each provider's discovery; a provider that takes longer
    /// is recorded as unavailable.
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = timeout;
        self
    }

    pub async fn build(self) -> Result<Engine, EngineError> {
        self.config.validate()?;

        let mut registry = self.registry;
        for tool in self.pending {
            registry.register(tool)?;
        }

        let provider_failures = merge_remote_tools(&mut registry, &self.providers, self.discovery_timeout).await;
        if !provider_failures.is_empty() {
            warn!(
                failed = provider_failures.len(),
                "some remote tool providers are unavailable"
            );
        }
        let tools = Arc::new(registry);

        let agent: Arc<dyn ThinkAct> = match (self.agent, self.model) {
            (Some(agent), _) => agent,
            (None, Some(model)) => Arc::new(ToolCallingAgent::new(model, tools.clone())),
            (None, None) => {
                return Err(ConfigError::Validation(
                    "an engine needs a model collaborator".into(),
                )
                .into());
            }
        };

        info!(
            engine = %self.config.name,
            tools = tools.len(),
            step_budget = self.config.step_budget,
            "engine ready"
        );
        Ok(Engine {
            config: self.config,
            agent,
            tools,
            provider_failures,
        })
    }
}
