//! Tags schema

use cloudstack_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::TAGS;

pub fn tags_schema() -> ResourceSchema {
    ResourceSchema::new(TAGS)
        .with_description("A set of tags applied to one or more CloudStack resources")
        .attribute(
            AttributeSchema::new("resource_ids", types::string_list())
                .required()
                .force_new()
                .with_description("IDs of the tagged resources"),
        )
        .attribute(
            AttributeSchema::new("resource_type", AttributeType::String)
                .required()
                .force_new()
                .with_description("CloudStack resource type, e.g. UserVm"),
        )
        .attribute(AttributeSchema::new("tags", types::string_map()).required())
        .attribute(AttributeSchema::new("project", AttributeType::String).force_new())
}
