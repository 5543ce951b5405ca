//! In-memory `CloudStackApi` for handler tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{
    ClientError, ClientResult, CloudStackApi, CreateRoleParams, CreateTagsParams,
    CreateZoneParams, DeleteTagsParams, ListRolesParams, ListTagsParams, ListZonesParams, Role,
    Tag, UpdateRoleParams, UpdateZoneParams, Zone,
};

/// A recorded API call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ListZones(ListZonesParams),
    CreateZone(CreateZoneParams),
    UpdateZone(UpdateZoneParams),
    DeleteZone(String),
    ListTags(ListTagsParams),
    CreateTags(CreateTagsParams),
    DeleteTags(DeleteTagsParams),
    ListRoles(ListRolesParams),
    CreateRole(CreateRoleParams),
    UpdateRole(UpdateRoleParams),
    DeleteRole(String),
}

impl ApiCall {
    pub fn command(&self) -> &'static str {
        match self {
            ApiCall::ListZones(_) => "listZones",
            ApiCall::CreateZone(_) => "createZone",
            ApiCall::UpdateZone(_) => "updateZone",
            ApiCall::DeleteZone(_) => "deleteZone",
            ApiCall::ListTags(_) => "listTags",
            ApiCall::CreateTags(_) => "createTags",
            ApiCall::DeleteTags(_) => "deleteTags",
            ApiCall::ListRoles(_) => "listRoles",
            ApiCall::CreateRole(_) => "createRole",
            ApiCall::UpdateRole(_) => "updateRole",
            ApiCall::DeleteRole(_) => "deleteRole",
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            ApiCall::ListZones(_) | ApiCall::ListTags(_) | ApiCall::ListRoles(_)
        )
    }
}

#[derive(Default)]
struct Inner {
    zones: Vec<Zone>,
    tags: Vec<Tag>,
    roles: Vec<Role>,
    calls: Vec<ApiCall>,
    failures: HashMap<&'static str, String>,
    next_id: usize,
}

impl Inner {
    fn record(&mut self, call: ApiCall) -> ClientResult<()> {
        let command = call.command();
        self.calls.push(call);
        match self.failures.get(command) {
            Some(message) => Err(ClientError::Api {
                status: 530,
                code: 530,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

fn entity_not_found(entity: &str, id: &str) -> ClientError {
    ClientError::Api {
        status: 431,
        code: 431,
        message: format!("Unable to find {} with id {}", entity, id),
    }
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, zone: Zone) -> Self {
        self.inner.lock().unwrap().zones.push(zone);
        self
    }

    pub fn with_role(self, role: Role) -> Self {
        self.inner.lock().unwrap().roles.push(role);
        self
    }

    pub fn with_tag(self, tag: Tag) -> Self {
        self.inner.lock().unwrap().tags.push(tag);
        self
    }

    /// Make every call of `command` fail after being recorded
    pub fn fail_on(self, command: &'static str, message: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .failures
            .insert(command, message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Recorded calls that change remote state
    pub fn mutations(&self) -> Vec<ApiCall> {
        self.calls().into_iter().filter(ApiCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn zones(&self) -> Vec<Zone> {
        self.inner.lock().unwrap().zones.clone()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.inner.lock().unwrap().tags.clone()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.inner.lock().unwrap().roles.clone()
    }
}

#[async_trait]
impl CloudStackApi for FakeApi {
    async fn list_zones(&self, params: &ListZonesParams) -> ClientResult<Vec<Zone>> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::ListZones(params.clone()))?;
        Ok(inner
            .zones
            .iter()
            .filter(|z| params.id.as_ref().is_none_or(|id| &z.id == id))
            .filter(|z| params.name.as_ref().is_none_or(|name| &z.name == name))
            .cloned()
            .collect())
    }

    async fn create_zone(&self, params: &CreateZoneParams) -> ClientResult<Zone> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::CreateZone(params.clone()))?;
        let zone = Zone {
            id: inner.next_id("zone"),
            name: params.name.clone(),
            dns1: params.dns1.clone(),
            dns2: params.dns2.clone().unwrap_or_default(),
            internaldns1: params.internaldns1.clone(),
            internaldns2: params.internaldns2.clone().unwrap_or_default(),
            ip6dns1: params.ip6dns1.clone().unwrap_or_default(),
            ip6dns2: params.ip6dns2.clone().unwrap_or_default(),
            networktype: params.networktype.clone(),
            allocationstate: params
                .allocationstate
                .clone()
                .unwrap_or_else(|| "Enabled".to_string()),
            domain: params.domain.clone().unwrap_or_default(),
            domainid: params.domainid.clone().unwrap_or_default(),
            guestcidraddress: params.guestcidraddress.clone().unwrap_or_default(),
            localstorageenabled: params.localstorageenabled.unwrap_or(false),
            securitygroupsenabled: params.securitygroupenabled.unwrap_or(false),
            ..Default::default()
        };
        inner.zones.push(zone.clone());
        Ok(zone)
    }

    async fn update_zone(&self, params: &UpdateZoneParams) -> ClientResult<Zone> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::UpdateZone(params.clone()))?;
        let zone = inner
            .zones
            .iter_mut()
            .find(|z| z.id == params.id)
            .ok_or_else(|| entity_not_found("zone", &params.id))?;

        let apply = |field: &mut String, value: &Option<String>| {
            if let Some(v) = value {
                *field = v.clone();
            }
        };
        apply(&mut zone.allocationstate, &params.allocationstate);
        apply(&mut zone.dns1, &params.dns1);
        apply(&mut zone.dns2, &params.dns2);
        apply(&mut zone.domain, &params.domain);
        apply(&mut zone.guestcidraddress, &params.guestcidraddress);
        apply(&mut zone.internaldns1, &params.internaldns1);
        apply(&mut zone.internaldns2, &params.internaldns2);
        apply(&mut zone.ip6dns1, &params.ip6dns1);
        apply(&mut zone.ip6dns2, &params.ip6dns2);
        apply(&mut zone.name, &params.name);
        if let Some(v) = params.localstorageenabled {
            zone.localstorageenabled = v;
        }
        Ok(zone.clone())
    }

    async fn delete_zone(&self, id: &str) -> ClientResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::DeleteZone(id.to_string()))?;
        let before = inner.zones.len();
        inner.zones.retain(|z| z.id != id);
        if inner.zones.len() == before {
            return Err(entity_not_found("zone", id));
        }
        Ok(())
    }

    async fn list_tags(&self, params: &ListTagsParams) -> ClientResult<Vec<Tag>> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::ListTags(params.clone()))?;
        Ok(inner
            .tags
            .iter()
            .filter(|t| params.resourceid.as_ref().is_none_or(|id| &t.resourceid == id))
            .filter(|t| {
                params
                    .resourcetype
                    .as_ref()
                    .is_none_or(|rt| &t.resourcetype == rt)
            })
            .cloned()
            .collect())
    }

    async fn create_tags(&self, params: &CreateTagsParams) -> ClientResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::CreateTags(params.clone()))?;
        for id in &params.resourceids {
            for (key, value) in &params.tags {
                inner
                    .tags
                    .retain(|t| !(t.resourceid == *id && t.key == *key));
                inner.tags.push(Tag {
                    key: key.clone(),
                    value: value.clone(),
                    resourceid: id.clone(),
                    resourcetype: params.resourcetype.clone(),
                });
            }
        }
        Ok(())
    }

    async fn delete_tags(&self, params: &DeleteTagsParams) -> ClientResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::DeleteTags(params.clone()))?;
        inner.tags.retain(|t| {
            let targeted = params.resourceids.contains(&t.resourceid)
                && t.resourcetype == params.resourcetype;
            let selected = params.tags.is_empty()
                || params
                    .tags
                    .get(&t.key)
                    .is_some_and(|v| v.is_empty() || *v == t.value);
            !(targeted && selected)
        });
        Ok(())
    }

    async fn list_roles(&self, params: &ListRolesParams) -> ClientResult<Vec<Role>> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::ListRoles(params.clone()))?;
        Ok(inner
            .roles
            .iter()
            .filter(|r| params.id.as_ref().is_none_or(|id| &r.id == id))
            .filter(|r| params.name.as_ref().is_none_or(|name| &r.name == name))
            .filter(|r| params.role_type.as_ref().is_none_or(|t| &r.role_type == t))
            .cloned()
            .collect())
    }

    async fn create_role(&self, params: &CreateRoleParams) -> ClientResult<Role> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::CreateRole(params.clone()))?;

        let role_type = match (&params.role_type, &params.roleid) {
            (Some(t), _) => t.clone(),
            (None, Some(source)) => inner
                .roles
                .iter()
                .find(|r| &r.id == source)
                .map(|r| r.role_type.clone())
                .ok_or_else(|| entity_not_found("role", source))?,
            (None, None) => {
                return Err(ClientError::Api {
                    status: 431,
                    code: 431,
                    message: "Either role type or role ID should be passed".to_string(),
                });
            }
        };

        let role = Role {
            id: inner.next_id("role"),
            name: params.name.clone(),
            role_type,
            description: params.description.clone().unwrap_or_default(),
            ispublic: params.ispublic.unwrap_or(true),
            isdefault: false,
        };
        inner.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, params: &UpdateRoleParams) -> ClientResult<Role> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::UpdateRole(params.clone()))?;
        let role = inner
            .roles
            .iter_mut()
            .find(|r| r.id == params.id)
            .ok_or_else(|| entity_not_found("role", &params.id))?;
        if let Some(name) = &params.name {
            role.name = name.clone();
        }
        if let Some(description) = &params.description {
            role.description = description.clone();
        }
        if let Some(ispublic) = params.ispublic {
            role.ispublic = ispublic;
        }
        Ok(role.clone())
    }

    async fn delete_role(&self, id: &str) -> ClientResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.record(ApiCall::DeleteRole(id.to_string()))?;
        let before = inner.roles.len();
        inner.roles.retain(|r| r.id != id);
        if inner.roles.len() == before {
            return Err(entity_not_found("role", id));
        }
        Ok(())
    }
}
