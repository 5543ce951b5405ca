//! Provider - Trait abstracting resource operations
//!
//! A Provider maps declarative resource and data source blocks onto calls
//! against a remote API. The host runtime owns planning, state persistence
//! and ordering; a Provider only performs single lifecycle transitions.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::resource::{Resource, ResourceId, State};
use crate::schema::ResourceSchema;

/// Category of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The remote API call failed; surfaced verbatim, operation aborted
    Remote,
    /// A lookup returned zero results
    NotFound,
    /// A data source filter carries a regex that does not compile
    InvalidPattern,
    /// No entity satisfies all data source filters
    NoMatch,
    /// Provider configuration is missing or malformed
    Configuration,
    /// A resource attribute is missing or has the wrong type
    InvalidAttribute,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderErrorKind::Remote => "remote error",
            ProviderErrorKind::NotFound => "not found",
            ProviderErrorKind::InvalidPattern => "invalid pattern",
            ProviderErrorKind::NoMatch => "no match",
            ProviderErrorKind::Configuration => "configuration error",
            ProviderErrorKind::InvalidAttribute => "invalid attribute",
        };
        f.write_str(s)
    }
}

/// Error type for Provider operations
#[derive(Debug)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
    pub resource_id: Option<ResourceId>,
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref id) = self.resource_id {
            write!(f, "[{}.{}] {}", id.resource_type, id.name, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|e| e.as_ref() as &dyn std::error::Error)
    }
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            resource_id: None,
            cause: None,
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Remote, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    pub fn invalid_pattern(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidPattern, message)
    }

    pub fn no_match(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NoMatch, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Configuration, message)
    }

    pub fn invalid_attribute(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidAttribute, message)
    }

    pub fn for_resource(mut self, id: ResourceId) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ProviderErrorKind::NotFound
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Return type for async operations
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Definition of resource types that a Provider can handle
pub trait ResourceType: Send + Sync {
    /// Resource type name (e.g., "cloudstack_zone")
    fn name(&self) -> &'static str;

    /// Attribute schema for this resource type
    fn schema(&self) -> ResourceSchema;
}

/// Main Provider trait
///
/// All operations are async and involve side effects. Each call is a single
/// lifecycle transition for one resource instance; implementations keep no
/// state between calls.
pub trait Provider: Send + Sync {
    /// Name of this Provider (e.g., "cloudstack")
    fn name(&self) -> &'static str;

    /// Managed resource types this Provider can handle
    fn resource_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Data source types this Provider can read
    fn data_source_types(&self) -> Vec<Box<dyn ResourceType>>;

    /// Refresh a managed resource from its last known state
    ///
    /// Returns `State::not_found()` if the resource no longer exists.
    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>>;

    /// Resolve a data source block into a read-only state
    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Create a resource
    ///
    /// Returns State with identifier set to the identity CloudStack assigned
    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>>;

    /// Update a resource in place
    ///
    /// `from` is the last-read state; only attributes that differ between
    /// `from` and `to` are sent.
    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>>;

    /// Delete a resource identified by `current`
    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>>;
}

/// Provider implementation for Box<dyn Provider>
/// This enables dynamic dispatch for Providers
impl Provider for Box<dyn Provider> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).resource_types()
    }

    fn data_source_types(&self) -> Vec<Box<dyn ResourceType>> {
        (**self).data_source_types()
    }

    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read(current)
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).read_data_source(resource)
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).create(resource)
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        (**self).update(id, identifier, from, to)
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>> {
        (**self).delete(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock Provider for testing
    struct MockProvider;

    impl Provider for MockProvider {
        fn name(&self) -> &'static str {
            "mock"
        }

        fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn data_source_types(&self) -> Vec<Box<dyn ResourceType>> {
            vec![]
        }

        fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
            let id = current.id.clone();
            Box::pin(async move { Ok(State::not_found(id)) })
        }

        fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let id = resource.id.clone();
            Box::pin(async move { Err(ProviderError::no_match("nothing").for_resource(id)) })
        }

        fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
            let id = resource.id.clone();
            let attrs = resource.attributes.clone();
            Box::pin(async move { Ok(State::existing(id, attrs).with_identifier("mock-id-123")) })
        }

        fn update(
            &self,
            id: &ResourceId,
            _identifier: &str,
            _from: &State,
            to: &Resource,
        ) -> BoxFuture<'_, ProviderResult<State>> {
            let id = id.clone();
            let attrs = to.attributes.clone();
            Box::pin(async move { Ok(State::existing(id, attrs)) })
        }

        fn delete(&self, _current: &State) -> BoxFuture<'_, ProviderResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn mock_provider_read_returns_not_found() {
        let provider = MockProvider;
        let current = State::existing(ResourceId::new("test", "example"), Default::default());
        let state = provider.read(&current).await.unwrap();
        assert!(!state.exists);
    }

    #[tokio::test]
    async fn mock_provider_create_returns_existing() {
        let provider: Box<dyn Provider> = Box::new(MockProvider);
        let resource = Resource::new("test", "example");
        let state = provider.create(&resource).await.unwrap();
        assert!(state.exists);
        assert_eq!(state.identifier, Some("mock-id-123".to_string()));
    }

    #[tokio::test]
    async fn data_source_error_keeps_kind_and_resource() {
        let provider = MockProvider;
        let resource = Resource::new("test", "example").with_read_only(true);
        let err = provider.read_data_source(&resource).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::NoMatch);
        assert_eq!(err.to_string(), "[test.example] nothing");
    }

    #[test]
    fn error_source_chain() {
        use std::error::Error;

        let io = std::io::Error::other("connection reset");
        let err = ProviderError::remote("Failed to list zones").with_cause(io);
        assert_eq!(err.kind, ProviderErrorKind::Remote);
        assert_eq!(err.source().unwrap().to_string(), "connection reset");
    }
}
