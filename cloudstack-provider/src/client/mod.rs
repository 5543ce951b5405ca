//! CloudStack API client
//!
//! `CloudStackApi` is the capability every lifecycle handler receives
//! explicitly. `CloudStackClient` implements it over HTTP.

mod http;
pub mod types;

use async_trait::async_trait;
use cloudstack_core::provider::ProviderError;
use thiserror::Error;

pub use http::{CloudStackClient, sign};
pub use types::{
    CreateRoleParams, CreateTagsParams, CreateZoneParams, DeleteTagsParams, ListRolesParams,
    ListTagsParams, ListZonesParams, Params, Role, Tag, UpdateRoleParams, UpdateZoneParams, Zone,
};

/// Errors returned by the API client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CloudStack API returned error {code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: i64,
        message: String,
    },

    #[error("Failed to decode {command} response: {message}")]
    Decode { command: String, message: String },

    #[error("No match found for {entity}: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Found {count} {entity} entries matching {key}, expected one")]
    Ambiguous {
        entity: &'static str,
        key: String,
        count: usize,
    },

    #[error("Async job {job_id} failed: {message}")]
    AsyncJobFailed { job_id: String, message: String },

    #[error("Timed out after {waited:?} waiting for async job {job_id}")]
    Timeout {
        job_id: String,
        waited: std::time::Duration,
    },

    #[error("Failed to sign request: {0}")]
    Signing(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound { .. })
    }

    /// Wrap into a provider error, prefixing `context`
    ///
    /// Zero-result lookups keep the `NotFound` kind; everything else is a
    /// remote failure.
    pub fn into_provider_error(self, context: &str) -> ProviderError {
        let message = format!("{}: {}", context, self);
        let err = if self.is_not_found() {
            ProviderError::not_found(message)
        } else {
            ProviderError::remote(message)
        };
        err.with_cause(self)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Narrow a list result to the single entry for `key`
///
/// Several results are narrowed to the exact `name` match when one exists.
fn exactly_one<T>(
    entity: &'static str,
    key: &str,
    mut items: Vec<T>,
    name: impl Fn(&T) -> &str,
) -> ClientResult<T> {
    match items.len() {
        0 => Err(ClientError::NotFound {
            entity,
            key: key.to_string(),
        }),
        1 => Ok(items.remove(0)),
        count => {
            let exact: Vec<usize> = items
                .iter()
                .enumerate()
                .filter(|(_, item)| name(item) == key)
                .map(|(i, _)| i)
                .collect();
            match exact.as_slice() {
                [i] => Ok(items.swap_remove(*i)),
                _ => Err(ClientError::Ambiguous {
                    entity,
                    key: key.to_string(),
                    count,
                }),
            }
        }
    }
}

/// The CloudStack commands used by the provider
#[async_trait]
pub trait CloudStackApi: Send + Sync {
    async fn list_zones(&self, params: &ListZonesParams) -> ClientResult<Vec<Zone>>;

    async fn create_zone(&self, params: &CreateZoneParams) -> ClientResult<Zone>;

    async fn update_zone(&self, params: &UpdateZoneParams) -> ClientResult<Zone>;

    async fn delete_zone(&self, id: &str) -> ClientResult<()>;

    async fn list_tags(&self, params: &ListTagsParams) -> ClientResult<Vec<Tag>>;

    /// Asynchronous on the server; returns once the job has finished
    async fn create_tags(&self, params: &CreateTagsParams) -> ClientResult<()>;

    /// Asynchronous on the server; returns once the job has finished
    async fn delete_tags(&self, params: &DeleteTagsParams) -> ClientResult<()>;

    async fn list_roles(&self, params: &ListRolesParams) -> ClientResult<Vec<Role>>;

    async fn create_role(&self, params: &CreateRoleParams) -> ClientResult<Role>;

    async fn update_role(&self, params: &UpdateRoleParams) -> ClientResult<Role>;

    async fn delete_role(&self, id: &str) -> ClientResult<()>;

    /// Look up a zone by name; zero results is `ClientError::NotFound`
    async fn get_zone_by_name(&self, name: &str) -> ClientResult<Zone> {
        let params = ListZonesParams {
            name: Some(name.to_string()),
            ..Default::default()
        };
        let zones = self.list_zones(&params).await?;
        exactly_one("zone", name, zones, |z| z.name.as_str())
    }

    /// Look up a role by id; zero results is `ClientError::NotFound`
    async fn get_role_by_id(&self, id: &str) -> ClientResult<Role> {
        let params = ListRolesParams {
            id: Some(id.to_string()),
            ..Default::default()
        };
        let roles = self.list_roles(&params).await?;
        exactly_one("role", id, roles, |r| r.id.as_str())
    }
}
