//! Resource type definitions and lifecycle handlers
//!
//! Every handler receives the API client explicitly as `&dyn CloudStackApi`.
//!
//! - `zone` - cloudstack_zone
//! - `tags` - cloudstack_tags
//! - `role` - cloudstack_role

pub mod role;
pub mod tags;
pub mod zone;

use cloudstack_core::provider::{ProviderError, ProviderResult, ResourceType};
use cloudstack_core::resource::{Resource, State};
use cloudstack_core::schema::ResourceSchema;

use crate::schemas;

// =============================================================================
// Resource Type Definitions
// =============================================================================

macro_rules! define_resource_type {
    ($name:ident, $type_name:expr, $schema:path) => {
        pub struct $name;
        impl ResourceType for $name {
            fn name(&self) -> &'static str {
                $type_name
            }
            fn schema(&self) -> ResourceSchema {
                $schema()
            }
        }
    };
}

define_resource_type!(ZoneType, schemas::ZONE, schemas::zone::zone_schema);
define_resource_type!(TagsType, schemas::TAGS, schemas::tags::tags_schema);
define_resource_type!(RoleType, schemas::ROLE, schemas::role::role_schema);
define_resource_type!(
    ZoneDataSourceType,
    schemas::ZONE,
    schemas::zone::zone_data_source_schema
);
define_resource_type!(
    RoleDataSourceType,
    schemas::ROLE,
    schemas::role::role_data_source_schema
);

/// Returns all managed resource types supported by this provider
pub fn resource_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(ZoneType), Box::new(TagsType), Box::new(RoleType)]
}

/// Returns all data source types supported by this provider
pub fn data_source_types() -> Vec<Box<dyn ResourceType>> {
    vec![Box::new(ZoneDataSourceType), Box::new(RoleDataSourceType)]
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Check `resource` against `schema` before any remote call
pub(crate) fn validate(resource: &Resource, schema: &ResourceSchema) -> ProviderResult<()> {
    schema.validate(&resource.attributes).map_err(|errors| {
        let mut messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        messages.sort();
        ProviderError::invalid_attribute(messages.join("; ")).for_resource(resource.id.clone())
    })
}

/// Fill unset attributes with their schema defaults
pub(crate) fn with_defaults(resource: &Resource, schema: &ResourceSchema) -> Resource {
    let mut resource = resource.clone();
    for (name, attr) in &schema.attributes {
        if let Some(default) = &attr.default {
            resource
                .attributes
                .entry(name.clone())
                .or_insert_with(|| default.clone());
        }
    }
    resource
}

/// The identity CloudStack assigned, required by update and delete
pub(crate) fn identifier(state: &State) -> ProviderResult<&str> {
    state
        .identifier
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ProviderError::invalid_attribute("Resource has no identifier")
                .for_resource(state.id.clone())
        })
}
