//! cloudstack_tags lifecycle
//!
//! A tag set has no identity of its own. It is keyed by the resource type
//! and the ids of the tagged resources.

use std::collections::HashMap;

use cloudstack_core::differ::diff_tags;
use cloudstack_core::provider::{ProviderError, ProviderResult};
use cloudstack_core::resource::{Attributes, Resource, ResourceId, State, Value};

use super::validate;
use crate::client::{CloudStackApi, CreateTagsParams, DeleteTagsParams, ListTagsParams};
use crate::schemas::tags::tags_schema;

/// Identity of a tag set, e.g. `UserVm-vm-1-vm-2`
pub fn tags_identifier(resource_type: &str, resource_ids: &[String]) -> String {
    format!("{}-{}", resource_type, resource_ids.join("-"))
}

/// Scope of a tag set: the tagged resource ids and their type
struct Target {
    resource_ids: Vec<String>,
    resource_type: String,
}

impl Target {
    fn from_attributes(id: &ResourceId, attrs: &impl Attributes) -> ProviderResult<Self> {
        let resource_ids = attrs.get_string_list("resource_ids");
        if resource_ids.is_empty() {
            return Err(
                ProviderError::invalid_attribute("No resource IDs found").for_resource(id.clone())
            );
        }
        let resource_type = attrs
            .get_string("resource_type")
            .ok_or_else(|| {
                ProviderError::invalid_attribute("'resource_type' is required")
                    .for_resource(id.clone())
            })?
            .to_string();
        Ok(Self {
            resource_ids,
            resource_type,
        })
    }
}

pub async fn create_tags(api: &dyn CloudStackApi, resource: &Resource) -> ProviderResult<State> {
    validate(resource, &tags_schema())?;
    let target = Target::from_attributes(&resource.id, resource)?;
    let tags = resource.get_string_map("tags");

    log::debug!(
        "Creating tags {:?} on {} {:?}",
        tags,
        target.resource_type,
        target.resource_ids
    );
    let params = CreateTagsParams::new(target.resource_ids.clone(), &target.resource_type, &tags);
    api.create_tags(&params).await.map_err(|e| {
        e.into_provider_error("Error creating tags")
            .for_resource(resource.id.clone())
    })?;

    let created = State::existing(resource.id.clone(), resource.attributes.clone())
        .with_identifier(tags_identifier(&target.resource_type, &target.resource_ids));
    read_tags(api, &created).await
}

/// Refresh the tags of the first tagged resource
///
/// Zero tags means the tag set is gone and clears the identity.
pub async fn read_tags(api: &dyn CloudStackApi, current: &State) -> ProviderResult<State> {
    let target = Target::from_attributes(&current.id, current)?;
    let resource_id = &target.resource_ids[0];

    let params = ListTagsParams {
        resourceid: Some(resource_id.clone()),
        resourcetype: Some(target.resource_type.clone()),
    };
    let tags = api.list_tags(&params).await.map_err(|e| {
        e.into_provider_error("Error listing tags")
            .for_resource(current.id.clone())
    })?;

    if tags.is_empty() {
        log::debug!(
            "No tags found for {} with ID {}",
            target.resource_type,
            resource_id
        );
        return Ok(State::not_found(current.id.clone()));
    }

    let mut attributes = HashMap::new();
    attributes.insert(
        "tags".to_string(),
        Value::string_map(tags.into_iter().map(|t| (t.key, t.value))),
    );
    for key in ["resource_ids", "resource_type", "project"] {
        if let Some(v) = current.attributes.get(key) {
            attributes.insert(key.to_string(), v.clone());
        }
    }

    let identifier = current
        .identifier
        .clone()
        .unwrap_or_else(|| tags_identifier(&target.resource_type, &target.resource_ids));
    Ok(State::existing(current.id.clone(), attributes).with_identifier(identifier))
}

/// Remove obsolete tags, then create new ones
///
/// Issues at most two remote calls. A failed create after a successful
/// delete leaves the remote side with the obsolete tags removed.
pub async fn update_tags(
    api: &dyn CloudStackApi,
    id: &ResourceId,
    identifier: &str,
    from: &State,
    to: &Resource,
) -> ProviderResult<State> {
    validate(to, &tags_schema())?;
    let target = Target::from_attributes(id, to)?;

    let changes = diff_tags(&from.get_string_map("tags"), &to.get_string_map("tags"));
    log::debug!("Tags to remove: {:?}", changes.remove);
    log::debug!("Tags to create: {:?}", changes.create);

    if !changes.remove.is_empty() {
        let params = DeleteTagsParams::new(target.resource_ids.clone(), &target.resource_type)
            .with_tags(&changes.remove);
        api.delete_tags(&params).await.map_err(|e| {
            e.into_provider_error("Error deleting tags")
                .for_resource(id.clone())
        })?;
    }

    if !changes.create.is_empty() {
        let params =
            CreateTagsParams::new(target.resource_ids.clone(), &target.resource_type, &changes.create);
        api.create_tags(&params).await.map_err(|e| {
            e.into_provider_error("Error creating tags")
                .for_resource(id.clone())
        })?;
    }

    let updated =
        State::existing(id.clone(), to.attributes.clone()).with_identifier(identifier);
    read_tags(api, &updated).await
}

pub async fn delete_tags(api: &dyn CloudStackApi, current: &State) -> ProviderResult<()> {
    let target = Target::from_attributes(&current.id, current)?;
    let tags = current.get_string_map("tags");

    log::debug!(
        "Deleting tags {:?} from {} {:?}",
        tags,
        target.resource_type,
        target.resource_ids
    );
    let params = DeleteTagsParams::new(target.resource_ids, target.resource_type).with_tags(&tags);
    api.delete_tags(&params).await.map_err(|e| {
        e.into_provider_error("Error deleting tags")
            .for_resource(current.id.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::TAGS;
    use crate::testing::{ApiCall, FakeApi};
    use cloudstack_core::provider::ProviderErrorKind;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn desired(tags: &[(&str, &str)]) -> Resource {
        Resource::new(TAGS, "foo")
            .with_attribute("resource_ids", Value::string_list(["vm-1"]))
            .with_attribute("resource_type", Value::String("UserVm".to_string()))
            .with_attribute("tags", Value::string_map(tags.iter().copied()))
    }

    #[test]
    fn identifier_joins_ids() {
        let ids = vec!["vm-1".to_string(), "vm-2".to_string()];
        assert_eq!(tags_identifier("UserVm", &ids), "UserVm-vm-1-vm-2");
    }

    #[tokio::test]
    async fn create_assigns_identifier_and_reads_back() {
        let api = FakeApi::new();
        let state = create_tags(&api, &desired(&[("a", "1"), ("b", "2")]))
            .await
            .unwrap();

        assert_eq!(state.identifier.as_deref(), Some("UserVm-vm-1"));
        assert_eq!(state.get_string_map("tags"), map(&[("a", "1"), ("b", "2")]));
        assert_eq!(state.get_string_list("resource_ids"), vec!["vm-1"]);
    }

    #[tokio::test]
    async fn update_issues_one_delete_and_one_create() {
        let api = FakeApi::new();
        let from = create_tags(&api, &desired(&[("a", "1"), ("b", "2")]))
            .await
            .unwrap();
        api.clear_calls();

        let to = desired(&[("a", "1"), ("b", "3"), ("c", "4")]);
        let state = update_tags(&api, &to.id, "UserVm-vm-1", &from, &to)
            .await
            .unwrap();

        match &api.mutations()[..] {
            [ApiCall::DeleteTags(deleted), ApiCall::CreateTags(created)] => {
                assert_eq!(deleted.tags.len(), 1);
                assert_eq!(deleted.tags.get("b").map(String::as_str), Some("2"));
                assert_eq!(created.tags.len(), 2);
                assert_eq!(created.tags.get("b").map(String::as_str), Some("3"));
                assert_eq!(created.tags.get("c").map(String::as_str), Some("4"));
            }
            other => panic!("Expected deleteTags then createTags, got {:?}", other),
        }
        assert_eq!(
            state.get_string_map("tags"),
            map(&[("a", "1"), ("b", "3"), ("c", "4")])
        );
    }

    #[tokio::test]
    async fn update_with_only_additions_skips_delete() {
        let api = FakeApi::new();
        let from = create_tags(&api, &desired(&[("a", "1")])).await.unwrap();
        api.clear_calls();

        let to = desired(&[("a", "1"), ("b", "2")]);
        update_tags(&api, &to.id, "UserVm-vm-1", &from, &to)
            .await
            .unwrap();

        let mutations = api.mutations();
        assert_eq!(mutations.len(), 1);
        assert!(matches!(mutations[0], ApiCall::CreateTags(_)));
    }

    #[tokio::test]
    async fn read_without_tags_clears_identity() {
        let api = FakeApi::new();
        let current = State::existing(ResourceId::new(TAGS, "foo"), desired(&[]).attributes)
            .with_identifier("UserVm-vm-1");

        let state = read_tags(&api, &current).await.unwrap();
        assert!(!state.exists);
        assert!(state.identifier.is_none());
    }

    #[tokio::test]
    async fn read_without_resource_ids_is_invalid() {
        let api = FakeApi::new();
        let current = State::existing(ResourceId::new(TAGS, "foo"), HashMap::new());

        let err = read_tags(&api, &current).await.unwrap_err();
        assert_eq!(err.kind, ProviderErrorKind::InvalidAttribute);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn delete_removes_current_tags() {
        let api = FakeApi::new();
        let state = create_tags(&api, &desired(&[("a", "1"), ("b", "2")]))
            .await
            .unwrap();

        delete_tags(&api, &state).await.unwrap();
        assert!(api.tags().is_empty());
    }

    #[tokio::test]
    async fn failed_delete_stops_update() {
        let api = FakeApi::new();
        let from = create_tags(&api, &desired(&[("a", "1"), ("b", "2")]))
            .await
            .unwrap();
        let api = FakeApi::new()
            .with_tag(crate::client::Tag {
                key: "b".to_string(),
                value: "2".to_string(),
                resourceid: "vm-1".to_string(),
                resourcetype: "UserVm".to_string(),
            })
            .fail_on("deleteTags", "Job failed");

        let to = desired(&[("b", "3")]);
        let err = update_tags(&api, &to.id, "UserVm-vm-1", &from, &to)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ProviderErrorKind::Remote);
        assert_eq!(api.mutations().len(), 1);
    }
}
