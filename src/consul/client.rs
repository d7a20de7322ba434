//! Thin Consul HTTP API client.
//!
//! # Responsibilities
//! - KV get/put on raw bytes
//! - Session lifecycle (create, renew, destroy)
//! - KV acquire/release for session locks
//! - Blocking queries on the health endpoint
//!
//! # Design Decisions
//! - Every request carries the optional datacenter and ACL token
//! - Non-blocking calls use the configured request timeout; blocking
//!   queries extend it by the wait time

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use url::Url;

use crate::config::ConsulConfig;
use crate::consul::types::{
    ConsulError, ConsulResult, HealthCheck, SessionCreated, SessionRequest,
};

const INDEX_HEADER: &str = "X-Consul-Index";
const TOKEN_HEADER: &str = "X-Consul-Token";

/// Consul agent client.
#[derive(Clone)]
pub struct ConsulClient {
    http: Client,
    base: Url,
    datacenter: Option<String>,
    token: Option<String>,
    request_timeout: Duration,
}

impl ConsulClient {
    /// Create a client. Fails only on an unusable address.
    pub fn new(config: &ConsulConfig) -> ConsulResult<Self> {
        let base = Url::parse(&config.address).map_err(|e| ConsulError::InvalidAddress {
            address: config.address.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ConsulError::InvalidAddress {
                address: config.address.clone(),
                reason: "expected an http(s) URL".to_string(),
            });
        }

        Ok(Self {
            http: Client::new(),
            base,
            datacenter: config.datacenter.clone(),
            token: config.token.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn address(&self) -> &Url {
        &self.base
    }

    /// `GET /v1/kv/<key>?raw`. A 404 means the key does not exist.
    pub async fn kv_get(&self, key: &str) -> ConsulResult<Option<Vec<u8>>> {
        let path = format!("/v1/kv/{}", key);
        let url = self.url(&path, &[("raw", "")])?;
        let resp = self.request(Method::GET, url).send().await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(&path, resp).await?;
        Ok(Some(resp.bytes().await?.to_vec()))
    }

    /// `PUT /v1/kv/<key>` with the raw value as body.
    pub async fn kv_put(&self, key: &str, value: Vec<u8>) -> ConsulResult<()> {
        let path = format!("/v1/kv/{}", key);
        let url = self.url(&path, &[])?;
        let resp = self.request(Method::PUT, url).body(value).send().await?;
        if expect_bool(&path, resp).await? {
            Ok(())
        } else {
            Err(ConsulError::Decode {
                path,
                reason: "write was not applied".to_string(),
            })
        }
    }

    /// `PUT /v1/kv/<key>?acquire=<session>`. Returns whether the lock is now held.
    pub async fn kv_acquire(&self, key: &str, session: &str) -> ConsulResult<bool> {
        let path = format!("/v1/kv/{}", key);
        let url = self.url(&path, &[("acquire", session)])?;
        let resp = self.request(Method::PUT, url).send().await?;
        expect_bool(&path, resp).await
    }

    /// `PUT /v1/kv/<key>?release=<session>`.
    pub async fn kv_release(&self, key: &str, session: &str) -> ConsulResult<bool> {
        let path = format!("/v1/kv/{}", key);
        let url = self.url(&path, &[("release", session)])?;
        let resp = self.request(Method::PUT, url).send().await?;
        expect_bool(&path, resp).await
    }

    /// Create a session whose locks are released when it is invalidated.
    pub async fn session_create(&self, name: &str, ttl: Duration) -> ConsulResult<String> {
        let path = "/v1/session/create".to_string();
        let url = self.url(&path, &[])?;
        let body = SessionRequest {
            name: name.to_string(),
            ttl: format!("{}s", ttl.as_secs()),
            behavior: "release".to_string(),
            lock_delay: "0s".to_string(),
        };
        let resp = self.request(Method::PUT, url).json(&body).send().await?;
        let resp = check_status(&path, resp).await?;
        let created: SessionCreated = resp.json().await.map_err(|e| ConsulError::Decode {
            path,
            reason: e.to_string(),
        })?;
        Ok(created.id)
    }

    /// `PUT /v1/session/renew/<id>`.
    pub async fn session_renew(&self, session: &str) -> ConsulResult<()> {
        let path = format!("/v1/session/renew/{}", session);
        let url = self.url(&path, &[])?;
        let resp = self.request(Method::PUT, url).send().await?;
        check_status(&path, resp).await?;
        Ok(())
    }

    /// `PUT /v1/session/destroy/<id>`.
    pub async fn session_destroy(&self, session: &str) -> ConsulResult<()> {
        let path = format!("/v1/session/destroy/{}", session);
        let url = self.url(&path, &[])?;
        let resp = self.request(Method::PUT, url).send().await?;
        check_status(&path, resp).await?;
        Ok(())
    }

    /// Blocking query on `/v1/health/state/any`.
    ///
    /// Returns once the index moves past `index` or `wait` elapses, together
    /// with the new index.
    pub async fn health_checks(
        &self,
        index: u64,
        wait: Duration,
    ) -> ConsulResult<(u64, Vec<HealthCheck>)> {
        let path = "/v1/health/state/any".to_string();
        let index_param = index.to_string();
        let wait_param = format!("{}s", wait.as_secs());
        let url = if index > 0 {
            self.url(&path, &[("index", &index_param), ("wait", &wait_param)])?
        } else {
            self.url(&path, &[])?
        };

        let resp = self
            .request(Method::GET, url)
            // Consul adds up to wait/16 of jitter to blocking queries.
            .timeout(self.request_timeout + wait + wait / 16)
            .send()
            .await?;
        let resp = check_status(&path, resp).await?;

        let new_index = resp
            .headers()
            .get(INDEX_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| ConsulError::Decode {
                path: path.clone(),
                reason: format!("missing or invalid {} header", INDEX_HEADER),
            })?;

        let checks: Vec<HealthCheck> = resp.json().await.map_err(|e| ConsulError::Decode {
            path,
            reason: e.to_string(),
        })?;

        Ok((new_index, checks))
    }

    /// Build a request URL. Each `/`-separated segment of `path` is
    /// percent-encoded, so `?`, `#` and `%` in a key never leave the path.
    fn url(&self, path: &str, params: &[(&str, &str)]) -> ConsulResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ConsulError::InvalidAddress {
                address: self.base.to_string(),
                reason: "address cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(path.trim_start_matches('/').split('/'));
        {
            let mut query = url.query_pairs_mut();
            for (k, v) in params {
                if v.is_empty() {
                    query.append_key_only(k);
                } else {
                    query.append_pair(k, v);
                }
            }
            if let Some(dc) = &self.datacenter {
                query.append_pair("dc", dc);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self
            .http
            .request(method, url)
            .timeout(self.request_timeout);
        if let Some(token) = &self.token {
            req = req.header(TOKEN_HEADER, token);
        }
        req
    }
}

impl std::fmt::Debug for ConsulClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsulClient")
            .field("address", &self.base.as_str())
            .field("datacenter", &self.datacenter)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

async fn check_status(path: &str, resp: Response) -> ConsulResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ConsulError::Status {
        path: path.to_string(),
        status: status.as_u16(),
        body,
    })
}

async fn expect_bool(path: &str, resp: Response) -> ConsulResult<bool> {
    let resp = check_status(path, resp).await?;
    let text = resp.text().await?;
    match text.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ConsulError::Decode {
            path: path.to_string(),
            reason: format!("expected boolean body, got '{}'", other),
        }),
    }
}
