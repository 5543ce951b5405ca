//! cloudstack_role data source

use cloudstack_core::filter::FieldTable;
use cloudstack_core::provider::ProviderResult;
use cloudstack_core::resource::{Resource, State, Value};

use super::select_one;
use crate::client::{CloudStackApi, ListRolesParams, Role};
use crate::resources::{role::role_attributes, validate};
use crate::schemas::role::role_data_source_schema;

pub fn role_field_table() -> FieldTable<Role> {
    FieldTable::<Role>::new()
        .field("id", |r| Some(r.id.clone()))
        .field("name", |r| Some(r.name.clone()))
        .field("type", |r| Some(r.role_type.clone()))
        .field("description", |r| Some(r.description.clone()))
        .field("ispublic", |r| Some(r.ispublic.to_string()))
        .field("isdefault", |r| Some(r.isdefault.to_string()))
}

pub async fn read_role_data_source(
    api: &dyn CloudStackApi,
    resource: &Resource,
) -> ProviderResult<State> {
    validate(resource, &role_data_source_schema())?;

    let roles = api
        .list_roles(&ListRolesParams::default())
        .await
        .map_err(|e| {
            e.into_provider_error("Failed to list roles")
                .for_resource(resource.id.clone())
        })?;

    let role = select_one(resource, &roles, &role_field_table(), "role")?;
    log::debug!("Selected role: {}", role.name);

    let mut attributes = role_attributes(role);
    attributes.insert("id".to_string(), Value::String(role.id.clone()));
    if let Some(filter) = resource.attributes.get("filter") {
        attributes.insert("filter".to_string(), filter.clone());
    }

    Ok(State::existing(resource.id.clone(), attributes).with_identifier(role.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::role::create_role;
    use crate::schemas::ROLE;
    use crate::testing::FakeApi;
    use cloudstack_core::provider::ProviderErrorKind;
    use cloudstack_core::resource::Attributes;

    fn filter(name: &str, value: &str) -> Value {
        Value::List(vec![Value::string_map([("name", name), ("value", value)])])
    }

    #[tokio::test]
    async fn finds_role_created_by_resource() {
        let api = FakeApi::new();
        let role = Resource::new(ROLE, "foo")
            .with_attribute("name", Value::String("terraform-role".to_string()))
            .with_attribute(
                "description",
                Value::String("terraform test role".to_string()),
            )
            .with_attribute("is_public", Value::Bool(true))
            .with_attribute("type", Value::String("User".to_string()));
        create_role(&api, &role).await.unwrap();

        let data = Resource::new(ROLE, "role")
            .with_read_only(true)
            .with_attribute("filter", filter("name", "terraform-role"));
        let state = read_role_data_source(&api, &data).await.unwrap();

        assert_eq!(state.get_string("name"), Some("terraform-role"));
        assert_eq!(state.get_string("description"), Some("terraform test role"));
        assert_eq!(state.get_bool("is_public"), Some(true));
    }

    #[tokio::test]
    async fn last_of_several_matches_wins() {
        let api = FakeApi::new()
            .with_role(Role {
                id: "r1".to_string(),
                name: "ops-admin".to_string(),
                role_type: "Admin".to_string(),
                ..Default::default()
            })
            .with_role(Role {
                id: "r2".to_string(),
                name: "ops-user".to_string(),
                role_type: "User".to_string(),
                ..Default::default()
            });

        let data = Resource::new(ROLE, "role").with_attribute("filter", filter("name", "^ops-"));
        let state = read_role_data_source(&api, &data).await.unwrap();
        assert_eq!(state.identifier.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn no_match_is_an_error() {
        let api = FakeApi::new();
        let data = Resource::new(ROLE, "role").with_attribute("filter", filter("is_public", "true"));

        let err = read_role_data_source(&api, &data).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::NoMatch);
    }

    #[tokio::test]
    async fn missing_filter_is_rejected() {
        let api = FakeApi::new().with_role(Role {
            id: "r1".to_string(),
            name: "ops-admin".to_string(),
            ..Default::default()
        });

        let err = read_role_data_source(&api, &Resource::new(ROLE, "role"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidAttribute);
        assert!(api.calls().is_empty());
    }
}
