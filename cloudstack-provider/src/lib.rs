//! CloudStack Provider
//!
//! Manages zones, tags and roles through the CloudStack API.
//!
//! ## Module Structure
//!
//! - `config` - Provider settings from attributes and environment
//! - `client` - Signed HTTP client and the `CloudStackApi` trait
//! - `schemas` - Resource and data source schemas
//! - `resources` - Resource types and lifecycle handlers
//! - `data_sources` - Filter-driven data source readers
//! - `provider` - CloudStackProvider implementation

pub mod client;
pub mod config;
pub mod data_sources;
pub mod provider;
pub mod resources;
pub mod schemas;

#[cfg(test)]
mod testing;

// Re-export main types
pub use client::{ClientError, CloudStackApi, CloudStackClient};
pub use config::ProviderConfig;
pub use provider::CloudStackProvider;

use cloudstack_core::provider::{BoxFuture, Provider, ProviderResult, ResourceType};
use cloudstack_core::resource::{Resource, ResourceId, State};

use resources::{data_source_types, resource_types};

// =============================================================================
// Provider Trait Implementation
// =============================================================================

impl Provider for CloudStackProvider {
    fn name(&self) -> &'static str {
        "cloudstack"
    }

    fn resource_types(&self) -> Vec<Box<dyn ResourceType>> {
        resource_types()
    }

    fn data_source_types(&self) -> Vec<Box<dyn ResourceType>> {
        data_source_types()
    }

    fn read(&self, current: &State) -> BoxFuture<'_, ProviderResult<State>> {
        let current = current.clone();
        Box::pin(async move { self.read_resource(&current).await })
    }

    fn read_data_source(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.lookup_data_source(&resource).await })
    }

    fn create(&self, resource: &Resource) -> BoxFuture<'_, ProviderResult<State>> {
        let resource = resource.clone();
        Box::pin(async move { self.create_resource(&resource).await })
    }

    fn update(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> BoxFuture<'_, ProviderResult<State>> {
        let id = id.clone();
        let identifier = identifier.to_string();
        let from = from.clone();
        let to = to.clone();
        Box::pin(async move { self.update_resource(&id, &identifier, &from, &to).await })
    }

    fn delete(&self, current: &State) -> BoxFuture<'_, ProviderResult<()>> {
        let current = current.clone();
        Box::pin(async move { self.delete_resource(&current).await })
    }
}
