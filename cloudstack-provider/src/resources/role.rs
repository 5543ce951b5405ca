//! cloudstack_role lifecycle

use std::collections::HashMap;

use cloudstack_core::differ::attribute_changed;
use cloudstack_core::provider::{ProviderError, ProviderResult};
use cloudstack_core::resource::{Attributes, Resource, ResourceId, State, Value};

use super::{identifier, validate, with_defaults};
use crate::client::{CloudStackApi, CreateRoleParams, Role, UpdateRoleParams};
use crate::schemas::role::role_schema;

pub(crate) fn role_attributes(role: &Role) -> HashMap<String, Value> {
    HashMap::from([
        ("name".to_string(), Value::String(role.name.clone())),
        ("type".to_string(), Value::String(role.role_type.clone())),
        (
            "description".to_string(),
            Value::String(role.description.clone()),
        ),
        ("is_public".to_string(), Value::Bool(role.ispublic)),
    ])
}

pub async fn create_role(api: &dyn CloudStackApi, resource: &Resource) -> ProviderResult<State> {
    let schema = role_schema();
    let resource = with_defaults(resource, &schema);
    validate(&resource, &schema)?;

    let name = resource.get_string("name").unwrap_or_default();
    let mut params = CreateRoleParams::new(name);
    params.role_type = resource.get_string("type").map(String::from);
    params.roleid = resource.get_string("role_id").map(String::from);
    params.description = resource.get_string("description").map(String::from);
    params.ispublic = resource.get_bool("is_public");

    if params.role_type.is_none() && params.roleid.is_none() {
        return Err(
            ProviderError::invalid_attribute("Either 'type' or 'role_id' must be set")
                .for_resource(resource.id.clone()),
        );
    }

    log::debug!("Creating role {}", name);
    let role = api.create_role(&params).await.map_err(|e| {
        e.into_provider_error("Error creating role")
            .for_resource(resource.id.clone())
    })?;
    log::debug!("Role {} successfully created with id {}", name, role.id);

    let created = State::existing(resource.id.clone(), resource.attributes.clone())
        .with_identifier(role.id);
    read_role(api, &created).await
}

/// Refresh a role by id; a role that no longer exists clears the identity
pub async fn read_role(api: &dyn CloudStackApi, current: &State) -> ProviderResult<State> {
    let Some(role_id) = current.identifier.as_deref().filter(|s| !s.is_empty()) else {
        return Ok(State::not_found(current.id.clone()));
    };

    log::debug!("Retrieving role {}", role_id);
    let role = match api.get_role_by_id(role_id).await {
        Ok(role) => role,
        Err(e) if e.is_not_found() => {
            log::debug!("Role {} no longer exists", role_id);
            return Ok(State::not_found(current.id.clone()));
        }
        Err(e) => {
            return Err(e
                .into_provider_error("Error retrieving role")
                .for_resource(current.id.clone()));
        }
    };

    let mut state = State::existing(current.id.clone(), role_attributes(&role)).with_identifier(role.id);
    if let Some(source) = current.attributes.get("role_id") {
        state.attributes.insert("role_id".to_string(), source.clone());
    }
    Ok(state)
}

pub async fn update_role(
    api: &dyn CloudStackApi,
    id: &ResourceId,
    role_id: &str,
    from: &State,
    to: &Resource,
) -> ProviderResult<State> {
    let schema = role_schema();
    let to = with_defaults(to, &schema);
    validate(&to, &schema)?;

    let changed = |key: &str| attribute_changed(&from.attributes, &to.attributes, key);

    let mut params = UpdateRoleParams::new(role_id);
    if changed("name") {
        params.name = to.get_string("name").map(String::from);
    }
    if changed("description") {
        params.description = Some(to.get_string("description").unwrap_or_default().to_string());
    }
    if changed("is_public") {
        params.ispublic = Some(to.get_bool("is_public").unwrap_or(false));
    }

    if params.is_empty() {
        log::debug!("Role {} has no changes to apply", role_id);
    } else {
        log::debug!("Updating role {}", role_id);
        api.update_role(&params).await.map_err(|e| {
            e.into_provider_error("Error updating role")
                .for_resource(id.clone())
        })?;
    }

    let updated = State::existing(id.clone(), to.attributes.clone()).with_identifier(role_id);
    read_role(api, &updated).await
}

pub async fn delete_role(api: &dyn CloudStackApi, current: &State) -> ProviderResult<()> {
    let role_id = identifier(current)?;

    log::debug!("Deleting role {}", role_id);
    api.delete_role(role_id).await.map_err(|e| {
        e.into_provider_error("Error deleting role")
            .for_resource(current.id.clone())
    })
}
