//! Named tool set shared by every run of an engine.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use strand_core::{RegistryError, TERMINATE_TOOL, Tool, ToolDescriptor};

const MAX_NAME_LEN: usize = 64;

/// A letter followed by up to 63 of `[A-Za-z0-9_.-]`.
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && name.len() <= MAX_NAME_LEN
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// The tool set available to a run.
///
/// Names are unique and matched case-sensitively. The termination name is
/// reserved: the engine offers it implicitly and it can never be registered.
/// Iteration follows registration order, so descriptors are offered to the
/// model in a stable order.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::Value;
/// use std::sync::Arc;
/// use strand_tools::{ExecutionResult, Tool, ToolRegistry};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str { "echo" }
///     async fn invoke(&self, params: Value) -> ExecutionResult {
///         ExecutionResult::success(params.to_string())
///     }
/// }
///
/// let registry = ToolRegistry::new().with_tool(Arc::new(Echo)).unwrap();
/// assert!(registry.get("echo").is_some());
/// assert!(registry.get("Echo").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, rejecting reserved, malformed and duplicate names.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if name == TERMINATE_TOOL {
            return Err(RegistryError::ReservedName(name));
        }
        if !is_valid_name(&name) {
            return Err(RegistryError::InvalidName {
                name,
                reason: "expected a letter followed by up to 63 of [A-Za-z0-9_.-]".into(),
            });
        }
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        self.order.push(name.clone());
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Descriptors of all tools, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor())
            .collect()
    }

    /// Tool names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rstest::rstest;
    use serde_json::Value;
    use strand_core::ExecutionResult;

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn invoke(&self, _params: Value) -> ExecutionResult {
            ExecutionResult::success(self.0)
        }
    }

    #[test]
    fn keeps_registration_order() {
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(Named("search")))
            .and_then(|r| r.with_tool(Arc::new(Named("ask_question"))))
            .and_then(|r| r.with_tool(Arc::new(Named("calc"))))
            .unwrap();

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            ["search", "ask_question", "calc"]
        );
        let descriptors: Vec<_> = registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(descriptors, ["search", "ask_question", "calc"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("search"))).unwrap();
        let err = registry.register(Arc::new(Named("search"))).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("search".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rejects_reserved_name() {
        let err = ToolRegistry::new()
            .with_tool(Arc::new(Named("terminate")))
            .unwrap_err();
        assert_eq!(err, RegistryError::ReservedName("terminate".into()));
    }

    #[rstest]
    #[case("")]
    #[case("has space")]
    #[case("9lives")]
    #[case("semi;colon")]
    fn rejects_malformed_names(#[case] name: &'static str) {
        let err = ToolRegistry::new().with_tool(Arc::new(Named(name))).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName { .. }));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let registry = ToolRegistry::new().with_tool(Arc::new(Named("Search"))).unwrap();
        assert!(registry.contains("Search"));
        assert!(!registry.contains("search"));
        // "Terminate" is not the reserved name.
        assert!(ToolRegistry::new().with_tool(Arc::new(Named("Terminate"))).is_ok());
    }
}
