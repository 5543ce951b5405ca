//! cloudstack_zone data source

use cloudstack_core::filter::FieldTable;
use cloudstack_core::provider::ProviderResult;
use cloudstack_core::resource::{Resource, State, Value};

use super::select_one;
use crate::client::{CloudStackApi, ListZonesParams, Zone};
use crate::resources::{validate, zone::zone_attributes};
use crate::schemas::zone::zone_data_source_schema;

/// Filterable zone fields
///
/// Both `securitygroupenabled` (the attribute name) and
/// `securitygroupsenabled` (the API field name) are accepted.
pub fn zone_field_table() -> FieldTable<Zone> {
    FieldTable::<Zone>::new()
        .field("id", |z| Some(z.id.clone()))
        .field("name", |z| Some(z.name.clone()))
        .field("description", |z| Some(z.description.clone()))
        .field("dns1", |z| Some(z.dns1.clone()))
        .field("dns2", |z| Some(z.dns2.clone()))
        .field("internaldns1", |z| Some(z.internaldns1.clone()))
        .field("internaldns2", |z| Some(z.internaldns2.clone()))
        .field("ip6dns1", |z| Some(z.ip6dns1.clone()))
        .field("ip6dns2", |z| Some(z.ip6dns2.clone()))
        .field("networktype", |z| Some(z.networktype.clone()))
        .field("allocationstate", |z| Some(z.allocationstate.clone()))
        .field("domain", |z| Some(z.domain.clone()))
        .field("domainid", |z| Some(z.domainid.clone()))
        .field("guestcidraddress", |z| Some(z.guestcidraddress.clone()))
        .field("localstorageenabled", |z| {
            Some(z.localstorageenabled.to_string())
        })
        .field("securitygroupsenabled", |z| {
            Some(z.securitygroupsenabled.to_string())
        })
        .field("securitygroupenabled", |z| {
            Some(z.securitygroupsenabled.to_string())
        })
}

pub async fn read_zone_data_source(
    api: &dyn CloudStackApi,
    resource: &Resource,
) -> ProviderResult<State> {
    validate(resource, &zone_data_source_schema())?;

    let zones = api
        .list_zones(&ListZonesParams::default())
        .await
        .map_err(|e| {
            e.into_provider_error("Failed to list zones")
                .for_resource(resource.id.clone())
        })?;

    let zone = select_one(resource, &zones, &zone_field_table(), "zone")?;
    log::debug!("Selected zone: {}", zone.name);

    let mut attributes = zone_attributes(zone);
    attributes.insert("id".to_string(), Value::String(zone.id.clone()));
    attributes.insert(
        "description".to_string(),
        Value::String(zone.description.clone()),
    );
    if let Some(filter) = resource.attributes.get("filter") {
        attributes.insert("filter".to_string(), filter.clone());
    }

    Ok(State::existing(resource.id.clone(), attributes).with_identifier(zone.id.clone()))
}
