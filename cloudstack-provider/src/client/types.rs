//! Typed parameters and responses for the CloudStack commands in use

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Query parameters of one API command, sorted by key
pub type Params = BTreeMap<String, String>;

fn set(params: &mut Params, key: &str, value: &Option<String>) {
    if let Some(v) = value {
        params.insert(key.to_string(), v.clone());
    }
}

fn set_bool(params: &mut Params, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        params.insert(key.to_string(), v.to_string());
    }
}

/// Encode a key/value map the way CloudStack expects map parameters:
/// `tags[0].key=..&tags[0].value=..`
fn set_map(params: &mut Params, name: &str, map: &BTreeMap<String, String>) {
    for (i, (k, v)) in map.iter().enumerate() {
        params.insert(format!("{}[{}].key", name, i), k.clone());
        params.insert(format!("{}[{}].value", name, i), v.clone());
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Zone as reported by `listZones`, `createZone` and `updateZone`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub description: String,
    pub dns1: String,
    pub dns2: String,
    pub internaldns1: String,
    pub internaldns2: String,
    pub ip6dns1: String,
    pub ip6dns2: String,
    pub networktype: String,
    pub allocationstate: String,
    pub domain: String,
    pub domainid: String,
    pub guestcidraddress: String,
    pub localstorageenabled: bool,
    pub securitygroupsenabled: bool,
}

/// Resource tag as reported by `listTags`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub key: String,
    pub value: String,
    pub resourceid: String,
    pub resourcetype: String,
}

/// Role as reported by `listRoles`, `createRole` and `updateRole`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub role_type: String,
    pub description: String,
    pub ispublic: bool,
    pub isdefault: bool,
}

// =============================================================================
// Zone parameters
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListZonesParams {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl ListZonesParams {
    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        set(&mut p, "id", &self.id);
        set(&mut p, "name", &self.name);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateZoneParams {
    pub dns1: String,
    pub internaldns1: String,
    pub name: String,
    pub networktype: String,
    pub allocationstate: Option<String>,
    pub dns2: Option<String>,
    pub domain: Option<String>,
    pub domainid: Option<String>,
    pub guestcidraddress: Option<String>,
    pub internaldns2: Option<String>,
    pub ip6dns1: Option<String>,
    pub ip6dns2: Option<String>,
    pub isedge: Option<bool>,
    pub localstorageenabled: Option<bool>,
    pub securitygroupenabled: Option<bool>,
}

impl CreateZoneParams {
    pub fn new(
        dns1: impl Into<String>,
        internaldns1: impl Into<String>,
        name: impl Into<String>,
        networktype: impl Into<String>,
    ) -> Self {
        Self {
            dns1: dns1.into(),
            internaldns1: internaldns1.into(),
            name: name.into(),
            networktype: networktype.into(),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        p.insert("dns1".to_string(), self.dns1.clone());
        p.insert("internaldns1".to_string(), self.internaldns1.clone());
        p.insert("name".to_string(), self.name.clone());
        p.insert("networktype".to_string(), self.networktype.clone());
        set(&mut p, "allocationstate", &self.allocationstate);
        set(&mut p, "dns2", &self.dns2);
        set(&mut p, "domain", &self.domain);
        set(&mut p, "domainid", &self.domainid);
        set(&mut p, "guestcidraddress", &self.guestcidraddress);
        set(&mut p, "internaldns2", &self.internaldns2);
        set(&mut p, "ip6dns1", &self.ip6dns1);
        set(&mut p, "ip6dns2", &self.ip6dns2);
        set_bool(&mut p, "isedge", self.isedge);
        set_bool(&mut p, "localstorageenabled", self.localstorageenabled);
        set_bool(&mut p, "securitygroupenabled", self.securitygroupenabled);
        p
    }
}

/// Only fields set to `Some` are sent; `Some("")` clears a value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateZoneParams {
    pub id: String,
    pub allocationstate: Option<String>,
    pub dns1: Option<String>,
    pub dns2: Option<String>,
    pub domain: Option<String>,
    pub guestcidraddress: Option<String>,
    pub internaldns1: Option<String>,
    pub internaldns2: Option<String>,
    pub ip6dns1: Option<String>,
    pub ip6dns2: Option<String>,
    pub localstorageenabled: Option<bool>,
    pub name: Option<String>,
}

impl UpdateZoneParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// True when no field besides the id is set
    pub fn is_empty(&self) -> bool {
        self.to_params().len() == 1
    }

    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        p.insert("id".to_string(), self.id.clone());
        set(&mut p, "allocationstate", &self.allocationstate);
        set(&mut p, "dns1", &self.dns1);
        set(&mut p, "dns2", &self.dns2);
        set(&mut p, "domain", &self.domain);
        set(&mut p, "guestcidraddress", &self.guestcidraddress);
        set(&mut p, "internaldns1", &self.internaldns1);
        set(&mut p, "internaldns2", &self.internaldns2);
        set(&mut p, "ip6dns1", &self.ip6dns1);
        set(&mut p, "ip6dns2", &self.ip6dns2);
        set_bool(&mut p, "localstorageenabled", self.localstorageenabled);
        set(&mut p, "name", &self.name);
        p
    }
}

// =============================================================================
// Tag parameters
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListTagsParams {
    pub resourceid: Option<String>,
    pub resourcetype: Option<String>,
}

impl ListTagsParams {
    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        set(&mut p, "resourceid", &self.resourceid);
        set(&mut p, "resourcetype", &self.resourcetype);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTagsParams {
    pub resourceids: Vec<String>,
    pub resourcetype: String,
    pub tags: BTreeMap<String, String>,
}

impl CreateTagsParams {
    pub fn new(
        resourceids: Vec<String>,
        resourcetype: impl Into<String>,
        tags: &HashMap<String, String>,
    ) -> Self {
        Self {
            resourceids,
            resourcetype: resourcetype.into(),
            tags: tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        }
    }

    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        p.insert("resourceids".to_string(), self.resourceids.join(","));
        p.insert("resourcetype".to_string(), self.resourcetype.clone());
        set_map(&mut p, "tags", &self.tags);
        p
    }
}

/// Without tags every tag on the resources is removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteTagsParams {
    pub resourceids: Vec<String>,
    pub resourcetype: String,
    pub tags: BTreeMap<String, String>,
}

impl DeleteTagsParams {
    pub fn new(resourceids: Vec<String>, resourcetype: impl Into<String>) -> Self {
        Self {
            resourceids,
            resourcetype: resourcetype.into(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_tags(mut self, tags: &HashMap<String, String>) -> Self {
        self.tags = tags.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        self
    }

    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        p.insert("resourceids".to_string(), self.resourceids.join(","));
        p.insert("resourcetype".to_string(), self.resourcetype.clone());
        set_map(&mut p, "tags", &self.tags);
        p
    }
}

// =============================================================================
// Role parameters
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRolesParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub role_type: Option<String>,
}

impl ListRolesParams {
    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        set(&mut p, "id", &self.id);
        set(&mut p, "name", &self.name);
        set(&mut p, "type", &self.role_type);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateRoleParams {
    pub name: String,
    pub role_type: Option<String>,
    pub roleid: Option<String>,
    pub description: Option<String>,
    pub ispublic: Option<bool>,
}

impl CreateRoleParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        p.insert("name".to_string(), self.name.clone());
        set(&mut p, "type", &self.role_type);
        set(&mut p, "roleid", &self.roleid);
        set(&mut p, "description", &self.description);
        set_bool(&mut p, "ispublic", self.ispublic);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRoleParams {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub ispublic: Option<bool>,
}

impl UpdateRoleParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_params().len() == 1
    }

    pub fn to_params(&self) -> Params {
        let mut p = Params::new();
        p.insert("id".to_string(), self.id.clone());
        set(&mut p, "name", &self.name);
        set(&mut p, "description", &self.description);
        set_bool(&mut p, "ispublic", self.ispublic);
        p
    }
}
