//! cloudstack_zone lifecycle
//!
//! Zones are looked up by name on read. The API does not report `isedge`,
//! so it is carried over from the previous state.

use std::collections::HashMap;

use cloudstack_core::differ::attribute_changed;
use cloudstack_core::provider::{ProviderError, ProviderResult};
use cloudstack_core::resource::{Attributes, Resource, ResourceId, State, Value};

use super::{identifier, validate};
use crate::client::{CloudStackApi, CreateZoneParams, UpdateZoneParams, Zone};
use crate::schemas::zone::zone_schema;

/// Project the managed attributes of a zone
pub(crate) fn zone_attributes(zone: &Zone) -> HashMap<String, Value> {
    let s = |v: &str| Value::String(v.to_string());
    HashMap::from([
        ("name".to_string(), s(&zone.name)),
        ("dns1".to_string(), s(&zone.dns1)),
        ("internal_dns1".to_string(), s(&zone.internaldns1)),
        ("network_type".to_string(), s(&zone.networktype)),
        ("allocationstate".to_string(), s(&zone.allocationstate)),
        ("dns2".to_string(), s(&zone.dns2)),
        ("domain".to_string(), s(&zone.domain)),
        ("domainid".to_string(), s(&zone.domainid)),
        ("guestcidraddress".to_string(), s(&zone.guestcidraddress)),
        ("internaldns2".to_string(), s(&zone.internaldns2)),
        ("ip6dns1".to_string(), s(&zone.ip6dns1)),
        ("ip6dns2".to_string(), s(&zone.ip6dns2)),
        (
            "localstorageenabled".to_string(),
            Value::Bool(zone.localstorageenabled),
        ),
        (
            "securitygroupenabled".to_string(),
            Value::Bool(zone.securitygroupsenabled),
        ),
    ])
}

fn required<'a>(resource: &'a Resource, key: &str) -> ProviderResult<&'a str> {
    resource.get_string(key).ok_or_else(|| {
        ProviderError::invalid_attribute(format!("'{}' is required", key))
            .for_resource(resource.id.clone())
    })
}

fn optional(resource: &Resource, key: &str) -> Option<String> {
    resource.get_string(key).map(String::from)
}

pub async fn create_zone(api: &dyn CloudStackApi, resource: &Resource) -> ProviderResult<State> {
    validate(resource, &zone_schema())?;

    let name = required(resource, "name")?;
    let mut params = CreateZoneParams::new(
        required(resource, "dns1")?,
        required(resource, "internal_dns1")?,
        name,
        required(resource, "network_type")?,
    );
    params.allocationstate = optional(resource, "allocationstate");
    params.dns2 = optional(resource, "dns2");
    params.domain = optional(resource, "domain");
    params.domainid = optional(resource, "domainid");
    params.guestcidraddress = optional(resource, "guestcidraddress");
    params.internaldns2 = optional(resource, "internaldns2");
    params.ip6dns1 = optional(resource, "ip6dns1");
    params.ip6dns2 = optional(resource, "ip6dns2");
    params.isedge = resource.get_bool("isedge");
    params.localstorageenabled = resource.get_bool("localstorageenabled");
    params.securitygroupenabled = resource.get_bool("securitygroupenabled");

    log::debug!("Creating zone {}", name);
    let zone = api.create_zone(&params).await.map_err(|e| {
        e.into_provider_error("Error creating zone")
            .for_resource(resource.id.clone())
    })?;
    log::debug!("Zone {} successfully created with id {}", name, zone.id);

    let created = State::existing(resource.id.clone(), resource.attributes.clone())
        .with_identifier(zone.id);
    read_zone(api, &created).await
}

/// Refresh a zone by name; a zone that no longer exists clears the identity
pub async fn read_zone(api: &dyn CloudStackApi, current: &State) -> ProviderResult<State> {
    let id = current.id.clone();
    let Some(name) = current.get_string("name") else {
        return Err(ProviderError::invalid_attribute("'name' is required").for_resource(id));
    };

    log::debug!("Retrieving zone {}", name);
    let zone = match api.get_zone_by_name(name).await {
        Ok(zone) => zone,
        Err(e) if e.is_not_found() => {
            log::debug!("Zone {} no longer exists", name);
            return Ok(State::not_found(id));
        }
        Err(e) => {
            return Err(e
                .into_provider_error("Error retrieving zone")
                .for_resource(id));
        }
    };

    let mut state = State::existing(id, zone_attributes(&zone)).with_identifier(zone.id);
    if let Some(isedge) = current.attributes.get("isedge") {
        state.attributes.insert("isedge".to_string(), isedge.clone());
    }
    Ok(state)
}

/// Send one `updateZone` carrying only the fields that changed
pub async fn update_zone(
    api: &dyn CloudStackApi,
    id: &ResourceId,
    zone_id: &str,
    from: &State,
    to: &Resource,
) -> ProviderResult<State> {
    validate(to, &zone_schema())?;

    let changed = |key: &str| attribute_changed(&from.attributes, &to.attributes, key);
    let value = |key: &str| Some(to.get_string(key).unwrap_or_default().to_string());

    let mut params = UpdateZoneParams::new(zone_id);
    // allocationstate is computed; only a configured value is pushed
    if to.get_string("allocationstate").is_some() && changed("allocationstate") {
        params.allocationstate = value("allocationstate");
    }
    if changed("dns1") {
        params.dns1 = value("dns1");
    }
    if changed("dns2") {
        params.dns2 = value("dns2");
    }
    if changed("domain") {
        params.domain = value("domain");
    }
    if changed("guestcidraddress") {
        params.guestcidraddress = value("guestcidraddress");
    }
    if changed("internal_dns1") {
        params.internaldns1 = value("internal_dns1");
    }
    if changed("internaldns2") {
        params.internaldns2 = value("internaldns2");
    }
    if changed("ip6dns1") {
        params.ip6dns1 = value("ip6dns1");
    }
    if changed("ip6dns2") {
        params.ip6dns2 = value("ip6dns2");
    }
    if changed("localstorageenabled") {
        params.localstorageenabled = Some(to.get_bool("localstorageenabled").unwrap_or(false));
    }
    if changed("name") {
        params.name = value("name");
    }

    if params.is_empty() {
        log::debug!("Zone {} has no changes to apply", zone_id);
    } else {
        log::debug!("Updating zone {}", zone_id);
        api.update_zone(&params).await.map_err(|e| {
            e.into_provider_error("Error updating zone")
                .for_resource(id.clone())
        })?;
    }

    let mut attributes = from.attributes.clone();
    attributes.extend(to.attributes.clone());
    let updated = State::existing(id.clone(), attributes).with_identifier(zone_id);
    read_zone(api, &updated).await
}

pub async fn delete_zone(api: &dyn CloudStackApi, current: &State) -> ProviderResult<()> {
    let zone_id = identifier(current)?;

    log::debug!("Deleting zone {}", zone_id);
    api.delete_zone(zone_id).await.map_err(|e| {
        e.into_provider_error("Error deleting zone")
            .for_resource(current.id.clone())
    })
}
