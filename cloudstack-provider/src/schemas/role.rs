//! Role schema

use cloudstack_core::resource::Value;
use cloudstack_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::ROLE;

/// Valid role types
pub const ROLE_TYPES: &[&str] = &["Admin", "ResourceAdmin", "DomainAdmin", "User"];

pub fn role_type() -> AttributeType {
    AttributeType::Enum(ROLE_TYPES.iter().map(|s| s.to_string()).collect())
}

pub fn role_schema() -> ResourceSchema {
    ResourceSchema::new(ROLE)
        .with_description("A CloudStack role")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("type", role_type())
                .force_new()
                .computed()
                .with_description("Required unless role_id is given"),
        )
        .attribute(
            AttributeSchema::new("role_id", AttributeType::String)
                .force_new()
                .with_description("Existing role to clone"),
        )
        .attribute(AttributeSchema::new("description", AttributeType::String))
        .attribute(
            AttributeSchema::new("is_public", AttributeType::Bool).with_default(Value::Bool(true)),
        )
}

pub fn role_data_source_schema() -> ResourceSchema {
    let computed = |name: &str, t: AttributeType| AttributeSchema::new(name, t).computed();

    ResourceSchema::new(ROLE)
        .with_description("Look up a CloudStack role by filters")
        .attribute(AttributeSchema::new("filter", types::filter_block()).required())
        .attribute(computed("id", AttributeType::String))
        .attribute(computed("name", AttributeType::String))
        .attribute(computed("type", AttributeType::String))
        .attribute(computed("description", AttributeType::String))
        .attribute(computed("is_public", AttributeType::Bool))
}
