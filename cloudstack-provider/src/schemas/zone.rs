//! Zone schema
//!
//! Attribute names follow the CloudStack API field names except for the
//! three snake_case required fields kept for configuration compatibility.

use cloudstack_core::schema::{AttributeSchema, AttributeType, ResourceSchema, types};

use super::ZONE;

/// Valid zone network types
pub const NETWORK_TYPES: &[&str] = &["Basic", "Advanced"];

pub fn network_type() -> AttributeType {
    AttributeType::Enum(NETWORK_TYPES.iter().map(|s| s.to_string()).collect())
}

pub fn zone_schema() -> ResourceSchema {
    ResourceSchema::new(ZONE)
        .with_description("A CloudStack availability zone")
        .attribute(
            AttributeSchema::new("name", AttributeType::String)
                .required()
                .with_description("Name of the zone"),
        )
        .attribute(
            AttributeSchema::new("dns1", AttributeType::String)
                .required()
                .with_description("First DNS server for guest VMs"),
        )
        .attribute(
            AttributeSchema::new("internal_dns1", AttributeType::String)
                .required()
                .with_description("First DNS server for system VMs"),
        )
        .attribute(
            AttributeSchema::new("network_type", network_type())
                .required()
                .force_new()
                .with_description("Basic or Advanced"),
        )
        .attribute(
            AttributeSchema::new("allocationstate", AttributeType::String)
                .computed()
                .with_description("Enabled or Disabled"),
        )
        .attribute(AttributeSchema::new("dns2", AttributeType::String))
        .attribute(AttributeSchema::new("domain", AttributeType::String))
        .attribute(AttributeSchema::new("domainid", AttributeType::String).force_new())
        .attribute(
            AttributeSchema::new("guestcidraddress", types::cidr())
                .with_description("Guest CIDR for Advanced zones"),
        )
        .attribute(AttributeSchema::new("internaldns2", AttributeType::String))
        .attribute(AttributeSchema::new("ip6dns1", AttributeType::String))
        .attribute(AttributeSchema::new("ip6dns2", AttributeType::String))
        .attribute(AttributeSchema::new("isedge", AttributeType::Bool).force_new())
        .attribute(AttributeSchema::new("localstorageenabled", AttributeType::Bool))
        .attribute(AttributeSchema::new("securitygroupenabled", AttributeType::Bool).force_new())
}

/// Zone data source: a filter plus every zone field, all computed
pub fn zone_data_source_schema() -> ResourceSchema {
    let computed = |name: &str, t: AttributeType| AttributeSchema::new(name, t).computed();

    ResourceSchema::new(ZONE)
        .with_description("Look up a CloudStack zone by filters")
        .attribute(AttributeSchema::new("filter", types::filter_block()).required())
        .attribute(computed("id", AttributeType::String))
        .attribute(computed("name", AttributeType::String))
        .attribute(computed("description", AttributeType::String))
        .attribute(computed("dns1", AttributeType::String))
        .attribute(computed("dns2", AttributeType::String))
        .attribute(computed("internal_dns1", AttributeType::String))
        .attribute(computed("internaldns2", AttributeType::String))
        .attribute(computed("ip6dns1", AttributeType::String))
        .attribute(computed("ip6dns2", AttributeType::String))
        .attribute(computed("network_type", AttributeType::String))
        .attribute(computed("allocationstate", AttributeType::String))
        .attribute(computed("domain", AttributeType::String))
        .attribute(computed("domainid", AttributeType::String))
        .attribute(computed("guestcidraddress", AttributeType::String))
        .attribute(computed("localstorageenabled", AttributeType::Bool))
        .attribute(computed("securitygroupenabled", AttributeType::Bool))
}
