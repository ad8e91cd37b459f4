// src/core/net.rs

// Blocking JSON GET against the parliament REST APIs.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::consts::{REQUEST_TIMEOUT_SECS, USER_AGENT};
use crate::config::options::ApiOptions;
use crate::error::FetchError;

pub struct ApiClient {
    http: Client,
    bills_base: String,
    members_base: String,
}

impl ApiClient {
    pub fn new(api: &ApiOptions) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|source| FetchError::Transport { url: s!("(client builder)"), source })?;

        Ok(Self {
            http,
            bills_base: s!(api.bills_base.trim_end_matches('/')),
            members_base: s!(api.members_base.trim_end_matches('/')),
        })
    }

    /// `<bills base>/Bills/<path>`
    pub fn bills_url(&self, path: &str) -> String {
        join!(self.bills_base.as_str(), "/Bills/", path)
    }

    /// `<members base>/<path>`
    pub fn members_url(&self, path: &str) -> String {
        join!(self.members_base.as_str(), "/", path)
    }

    /// One GET, no retry. Non-2xx and non-JSON bodies are errors.
    pub fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        logd!("GET {url}");
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|source| FetchError::Transport { url: s!(url), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: s!(url), status: status.as_u16() });
        }

        let body = resp
            .text()
            .map_err(|source| FetchError::Transport { url: s!(url), source })?;
        serde_json::from_str(&body).map_err(|source| FetchError::Json { url: s!(url), source })
    }
}
