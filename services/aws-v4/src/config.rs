// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::constants::*;
use awsfetch_core::utils::Redact;
use awsfetch_core::Context;
use std::fmt::{Debug, Formatter};

/// Config is the environment-derived configuration of a client.
///
/// It is captured once via [`Config::from_env`] when a client is built and
/// passed down from there; nothing below the client reads the environment
/// again.
#[derive(Clone)]
pub struct Config {
    /// Access key id from `AWS_ACCESS_KEY_ID`.
    pub access_key_id: Option<String>,
    /// Secret access key from `AWS_SECRET_ACCESS_KEY`.
    pub secret_access_key: Option<String>,
    /// Session token from `AWS_SESSION_TOKEN` or the legacy `AWS_SECURITY_TOKEN`.
    pub session_token: Option<String>,
    /// Region from `AWS_DEFAULT_REGION` or `AWS_REGION`.
    pub region: Option<String>,
    /// Profile from `AWS_DEFAULT_PROFILE` or `AWS_PROFILE`.
    pub profile: Option<String>,
    /// Path of the config file, `~/.aws/config` by default.
    pub config_file: String,
    /// Path of the shared credentials file, `~/.aws/credentials` by default.
    pub shared_credentials_file: String,
    /// Base URL of the instance metadata service.
    pub metadata_endpoint: String,
    /// Disable every call to the instance metadata service.
    pub metadata_disabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            region: None,
            profile: None,
            config_file: DEFAULT_CONFIG_FILE.to_string(),
            shared_credentials_file: DEFAULT_SHARED_CREDENTIALS_FILE.to_string(),
            metadata_endpoint: DEFAULT_METADATA_ENDPOINT.to_string(),
            metadata_disabled: false,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("region", &self.region)
            .field("profile", &self.profile)
            .field("config_file", &self.config_file)
            .field("shared_credentials_file", &self.shared_credentials_file)
            .field("metadata_endpoint", &self.metadata_endpoint)
            .field("metadata_disabled", &self.metadata_disabled)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Empty values are treated as unset.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let get = |key: &str| envs.get(key).filter(|v| !v.is_empty()).cloned();

        if let Some(v) = get(AWS_ACCESS_KEY_ID) {
            self.access_key_id = Some(v);
        }
        if let Some(v) = get(AWS_SECRET_ACCESS_KEY) {
            self.secret_access_key = Some(v);
        }
        if let Some(v) = get(AWS_SESSION_TOKEN).or_else(|| get(AWS_SECURITY_TOKEN)) {
            self.session_token = Some(v);
        }
        if let Some(v) = get(AWS_DEFAULT_REGION).or_else(|| get(AWS_REGION)) {
            self.region = Some(v);
        }
        if let Some(v) = get(AWS_DEFAULT_PROFILE).or_else(|| get(AWS_PROFILE)) {
            self.profile = Some(v);
        }
        if let Some(v) = get(AWS_CONFIG_FILE) {
            self.config_file = v;
        }
        if let Some(v) = get(AWS_SHARED_CREDENTIALS_FILE) {
            self.shared_credentials_file = v;
        }
        if let Some(v) = get(AWS_EC2_METADATA_SERVICE_ENDPOINT) {
            self.metadata_endpoint = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get(AWS_EC2_METADATA_DISABLED) {
            self.metadata_disabled = v.eq_ignore_ascii_case("true");
        }

        self
    }

    /// Resolve the profile name: `explicit`, then the environment, then `default`.
    pub fn profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE)
            .to_string()
    }
}
