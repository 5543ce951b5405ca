//! CloudStack Provider implementation
//!
//! Dispatches each lifecycle call to the handler for its resource type.

use std::sync::Arc;

use cloudstack_core::differ::{Diff, diff};
use cloudstack_core::provider::{ProviderError, ProviderResult};
use cloudstack_core::resource::{Resource, ResourceId, State};

use crate::client::{CloudStackApi, CloudStackClient};
use crate::config::ProviderConfig;
use crate::data_sources::{role::read_role_data_source, zone::read_zone_data_source};
use crate::resources::{role, tags, zone};
use crate::schemas::{self, ROLE, TAGS, ZONE};

fn unknown_type(id: &ResourceId, kind: &str) -> ProviderError {
    ProviderError::configuration(format!("Unknown {}: {}", kind, id.resource_type))
        .for_resource(id.clone())
}

/// CloudStack Provider
pub struct CloudStackProvider {
    api: Arc<dyn CloudStackApi>,
}

impl CloudStackProvider {
    /// Create a provider talking to the API described by `config`
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        let client = CloudStackClient::new(config)
            .map_err(|e| e.into_provider_error("Failed to create CloudStack client"))?;
        Ok(Self::with_api(Arc::new(client)))
    }

    /// Create a provider on top of any `CloudStackApi` implementation
    pub fn with_api(api: Arc<dyn CloudStackApi>) -> Self {
        Self { api }
    }

    fn api(&self) -> &dyn CloudStackApi {
        self.api.as_ref()
    }

    // =========================================================================
    // Resource Operations
    // =========================================================================

    pub async fn read_resource(&self, current: &State) -> ProviderResult<State> {
        match current.id.resource_type.as_str() {
            ZONE => zone::read_zone(self.api(), current).await,
            TAGS => tags::read_tags(self.api(), current).await,
            ROLE => role::read_role(self.api(), current).await,
            _ => Err(unknown_type(&current.id, "resource type")),
        }
    }

    pub async fn lookup_data_source(&self, resource: &Resource) -> ProviderResult<State> {
        match resource.id.resource_type.as_str() {
            ZONE => read_zone_data_source(self.api(), resource).await,
            ROLE => read_role_data_source(self.api(), resource).await,
            _ => Err(unknown_type(&resource.id, "data source")),
        }
    }

    pub async fn create_resource(&self, resource: &Resource) -> ProviderResult<State> {
        match resource.id.resource_type.as_str() {
            ZONE => zone::create_zone(self.api(), resource).await,
            TAGS => tags::create_tags(self.api(), resource).await,
            ROLE => role::create_role(self.api(), resource).await,
            _ => Err(unknown_type(&resource.id, "resource type")),
        }
    }

    /// Update in place; a change to a force-new attribute is rejected
    pub async fn update_resource(
        &self,
        id: &ResourceId,
        identifier: &str,
        from: &State,
        to: &Resource,
    ) -> ProviderResult<State> {
        let schema =
            schemas::schema_for(&id.resource_type).ok_or_else(|| unknown_type(id, "resource type"))?;

        if let Diff::Replace {
            changed_attributes, ..
        } = diff(to, from, Some(&schema))
        {
            let forced: Vec<&str> = changed_attributes
                .iter()
                .map(String::as_str)
                .filter(|name| schema.is_force_new(name))
                .collect();
            return Err(ProviderError::invalid_attribute(format!(
                "Changing {} requires replacing the resource",
                forced.join(", ")
            ))
            .for_resource(id.clone()));
        }

        match id.resource_type.as_str() {
            ZONE => zone::update_zone(self.api(), id, identifier, from, to).await,
            TAGS => tags::update_tags(self.api(), id, identifier, from, to).await,
            ROLE => role::update_role(self.api(), id, identifier, from, to).await,
            _ => Err(unknown_type(id, "resource type")),
        }
    }

    pub async fn delete_resource(&self, current: &State) -> ProviderResult<()> {
        match current.id.resource_type.as_str() {
            ZONE => zone::delete_zone(self.api(), current).await,
            TAGS => tags::delete_tags(self.api(), current).await,
            ROLE => role::delete_role(self.api(), current).await,
            _ => Err(unknown_type(&current.id, "resource type")),
        }
    }
}
