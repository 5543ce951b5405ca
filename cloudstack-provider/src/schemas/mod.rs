//! CloudStack resource and data source schema definitions

pub mod role;
pub mod tags;
pub mod zone;

use cloudstack_core::schema::ResourceSchema;

pub const ZONE: &str = "cloudstack_zone";
pub const TAGS: &str = "cloudstack_tags";
pub const ROLE: &str = "cloudstack_role";

/// Returns all managed resource schemas
pub fn all_schemas() -> Vec<ResourceSchema> {
    vec![zone::zone_schema(), tags::tags_schema(), role::role_schema()]
}

/// Returns all data source schemas
pub fn all_data_source_schemas() -> Vec<ResourceSchema> {
    vec![
        zone::zone_data_source_schema(),
        role::role_data_source_schema(),
    ]
}

/// Schema for a managed resource type
pub fn schema_for(resource_type: &str) -> Option<ResourceSchema> {
    all_schemas()
        .into_iter()
        .find(|s| s.resource_type == resource_type)
}

/// Schema for a data source type
pub fn data_source_schema_for(resource_type: &str) -> Option<ResourceSchema> {
    all_data_source_schemas()
        .into_iter()
        .find(|s| s.resource_type == resource_type)
}
