//! Signed HTTP transport for the CloudStack API

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha1::Sha1;
use std::time::Duration;

use super::types::{
    CreateRoleParams, CreateTagsParams, CreateZoneParams, DeleteTagsParams, ListRolesParams,
    ListTagsParams, ListZonesParams, Params, Role, Tag, UpdateRoleParams, UpdateZoneParams, Zone,
};
use super::{ClientError, ClientResult, CloudStackApi};
use crate::config::ProviderConfig;

type HmacSha1 = Hmac<Sha1>;

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

const JOB_PENDING: i64 = 0;
const JOB_SUCCEEDED: i64 = 1;
const JOB_FAILED: i64 = 2;

/// Truncate a response body for logging and error messages
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };
    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Compute the request signature for `params`
///
/// The query string is built from the sorted, percent-encoded parameters,
/// lowercased, signed with HMAC-SHA1 and base64 encoded.
pub fn sign(params: &Params, secret_key: &str) -> ClientResult<String> {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
        .to_lowercase();

    let mut mac = HmacSha1::new_from_slice(secret_key.as_bytes())
        .map_err(|e| ClientError::Signing(e.to_string()))?;
    mac.update(query.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Commands that only read state are sent as GET
fn is_read_only(command: &str) -> bool {
    command.starts_with("list") || command == "queryAsyncJobResult"
}

/// Extract `errorcode`/`errortext` from an error body
fn api_error(status: u16, body: &str) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let inner = parsed.as_ref().and_then(|v| {
        v.as_object()
            .and_then(|obj| obj.values().find(|inner| inner.get("errortext").is_some()))
    });

    match inner {
        Some(inner) => ClientError::Api {
            status,
            code: inner.get("errorcode").and_then(Value::as_i64).unwrap_or(0),
            message: inner
                .get("errortext")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        None => ClientError::Api {
            status,
            code: 0,
            message: sanitize_for_log(body),
        },
    }
}

fn decode<T: DeserializeOwned>(command: &str, value: Value) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        command: command.to_string(),
        message: e.to_string(),
    })
}

/// Decode the list stored under `key`; a missing key is an empty list
fn decode_list<T: DeserializeOwned>(command: &str, mut inner: Value, key: &str) -> ClientResult<Vec<T>> {
    match inner.get_mut(key).map(Value::take) {
        Some(items) => decode(command, items),
        None => Ok(Vec::new()),
    }
}

/// Decode the single entity stored under `key`
fn decode_entity<T: DeserializeOwned>(command: &str, mut inner: Value, key: &str) -> ClientResult<T> {
    let entity = inner
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ClientError::Decode {
            command: command.to_string(),
            message: format!("missing '{}' in response", key),
        })?;
    decode(command, entity)
}

/// Check a `{"success": ...}` response; the flag may be a bool or a string
fn check_success(command: &str, inner: &Value) -> ClientResult<()> {
    let success = match inner.get("success") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => {
            return Err(ClientError::Decode {
                command: command.to_string(),
                message: "missing 'success' in response".to_string(),
            });
        }
    };

    if success {
        Ok(())
    } else {
        Err(ClientError::Api {
            status: 200,
            code: 0,
            message: inner
                .get("displaytext")
                .and_then(Value::as_str)
                .unwrap_or("command reported failure")
                .to_string(),
        })
    }
}

/// CloudStack API client over HTTP
#[derive(Clone)]
pub struct CloudStackClient {
    client: Client,
    api_url: String,
    api_key: String,
    secret_key: String,
    http_get_only: bool,
    timeout: Duration,
    poll_interval: Duration,
}

impl CloudStackClient {
    pub fn new(config: &ProviderConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("cloudstack-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            http_get_only: config.http_get_only,
            timeout: config.timeout,
            poll_interval: config.poll_interval,
        })
    }

    /// Add `command`, `response`, `apikey` and `signature` to `params`
    fn signed(&self, command: &str, mut params: Params) -> ClientResult<Params> {
        params.insert("command".to_string(), command.to_string());
        params.insert("response".to_string(), "json".to_string());
        params.insert("apikey".to_string(), self.api_key.clone());
        let signature = sign(&params, &self.secret_key)?;
        params.insert("signature".to_string(), signature);
        Ok(params)
    }

    /// Execute `command` and return the body of its response envelope
    async fn call(&self, command: &str, params: Params) -> ClientResult<Value> {
        let params = self.signed(command, params)?;

        let request = if self.http_get_only || is_read_only(command) {
            log::debug!("GET {} command={}", self.api_url, command);
            self.client.get(&self.api_url).query(&params)
        } else {
            log::debug!("POST {} command={}", self.api_url, command);
            self.client.post(&self.api_url).form(&params)
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!(
                "CloudStack API error: {} - {}",
                status,
                sanitize_for_log(&body)
            );
            return Err(api_error(status.as_u16(), &body));
        }

        let mut parsed: Value = serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            command: command.to_string(),
            message: e.to_string(),
        })?;

        let envelope = format!("{}response", command.to_lowercase());
        let inner = match parsed.get_mut(&envelope).map(Value::take) {
            Some(inner) => inner,
            None => {
                if parsed.get("errorresponse").is_some() {
                    return Err(api_error(status.as_u16(), &body));
                }
                return Err(ClientError::Decode {
                    command: command.to_string(),
                    message: format!("missing '{}' in {}", envelope, sanitize_for_log(&body)),
                });
            }
        };

        if inner.get("errortext").is_some() {
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(inner)
    }

    /// Execute an asynchronous command and wait for its job to finish
    async fn call_async(&self, command: &str, params: Params) -> ClientResult<Value> {
        let submitted = self.call(command, params).await?;
        let job_id = submitted
            .get("jobid")
            .and_then(Value::as_str)
            .ok_or_else(|| ClientError::Decode {
                command: command.to_string(),
                message: "missing 'jobid' in response".to_string(),
            })?
            .to_string();

        self.wait_for_job(&job_id).await
    }

    /// Poll `queryAsyncJobResult` until the job succeeds, fails or times out
    async fn wait_for_job(&self, job_id: &str) -> ClientResult<Value> {
        let started = tokio::time::Instant::now();

        loop {
            let mut params = Params::new();
            params.insert("jobid".to_string(), job_id.to_string());
            let mut status = self.call("queryAsyncJobResult", params).await?;

            let job_status = status.get("jobstatus").and_then(Value::as_i64);
            match job_status {
                Some(JOB_SUCCEEDED) => {
                    log::debug!("Async job {} completed", job_id);
                    return Ok(status
                        .get_mut("jobresult")
                        .map(Value::take)
                        .unwrap_or(Value::Null));
                }
                Some(JOB_FAILED) => {
                    let message = status
                        .get("jobresult")
                        .and_then(|r| r.get("errortext"))
                        .and_then(Value::as_str)
                        .unwrap_or("Unknown error")
                        .to_string();
                    return Err(ClientError::AsyncJobFailed {
                        job_id: job_id.to_string(),
                        message,
                    });
                }
                Some(JOB_PENDING) | None => {}
                Some(other) => {
                    log::warn!("Async job {} reported unknown status {}", job_id, other);
                }
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                return Err(ClientError::Timeout {
                    job_id: job_id.to_string(),
                    waited,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait::async_trait]
impl CloudStackApi for CloudStackClient {
    async fn list_zones(&self, params: &ListZonesParams) -> ClientResult<Vec<Zone>> {
        let inner = self.call("listZones", params.to_params()).await?;
        decode_list("listZones", inner, "zone")
    }

    async fn create_zone(&self, params: &CreateZoneParams) -> ClientResult<Zone> {
        let inner = self.call("createZone", params.to_params()).await?;
        decode_entity("createZone", inner, "zone")
    }

    async fn update_zone(&self, params: &UpdateZoneParams) -> ClientResult<Zone> {
        let inner = self.call("updateZone", params.to_params()).await?;
        decode_entity("updateZone", inner, "zone")
    }

    async fn delete_zone(&self, id: &str) -> ClientResult<()> {
        let mut params = Params::new();
        params.insert("id".to_string(), id.to_string());
        let inner = self.call("deleteZone", params).await?;
        check_success("deleteZone", &inner)
    }

    async fn list_tags(&self, params: &ListTagsParams) -> ClientResult<Vec<Tag>> {
        let inner = self.call("listTags", params.to_params()).await?;
        decode_list("listTags", inner, "tag")
    }

    async fn create_tags(&self, params: &CreateTagsParams) -> ClientResult<()> {
        self.call_async("createTags", params.to_params()).await?;
        Ok(())
    }

    async fn delete_tags(&self, params: &DeleteTagsParams) -> ClientResult<()> {
        self.call_async("deleteTags", params.to_params()).await?;
        Ok(())
    }

    async fn list_roles(&self, params: &ListRolesParams) -> ClientResult<Vec<Role>> {
        let inner = self.call("listRoles", params.to_params()).await?;
        decode_list("listRoles", inner, "role")
    }

    async fn create_role(&self, params: &CreateRoleParams) -> ClientResult<Role> {
        let inner = self.call("createRole", params.to_params()).await?;
        decode_entity("createRole", inner, "role")
    }

    async fn update_role(&self, params: &UpdateRoleParams) -> ClientResult<Role> {
        let inner = self.call("updateRole", params.to_params()).await?;
        decode_entity("updateRole", inner, "role")
    }

    async fn delete_role(&self, id: &str) -> ClientResult<()> {
        let mut params = Params::new();
        params.insert("id".to_string(), id.to_string());
        let inner = self.call("deleteRole", params).await?;
        check_success("deleteRole", &inner)
    }
}
