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

//! Credential and region resolution.

mod imds;
pub use imds::InstanceMetadata;

mod profile;
pub use profile::load_shared_credentials;

mod region;
pub use region::resolve_region;

use crate::{Config, Credential};
use awsfetch_core::{Context, Error, Result};
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

/// Where the credentials of a [`CredentialProvider`] come from.
///
/// Decided once when the provider is built and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialOrigin {
    /// Passed in by the caller.
    Explicit,
    /// Read from `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`.
    Environment,
    /// Read from the shared credentials file.
    SharedFile,
    /// Fetched on demand from the instance metadata service.
    Dynamic,
}

impl CredentialOrigin {
    /// Returns true if credentials can be fetched again.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, CredentialOrigin::Dynamic)
    }
}

impl Display for CredentialOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialOrigin::Explicit => write!(f, "explicit"),
            CredentialOrigin::Environment => write!(f, "environment"),
            CredentialOrigin::SharedFile => write!(f, "shared_file"),
            CredentialOrigin::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Access key, secret key and token passed in by the caller.
#[derive(Debug, Clone, Default)]
pub struct ExplicitKeys {
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Session token.
    pub session_token: Option<String>,
}

/// CredentialProvider owns the credentials of a client.
///
/// Static credentials are resolved once at construction. Dynamic credentials
/// start empty and are fetched from instance metadata by [`ensure_credentials`]
/// or [`refresh`]; concurrent callers share a single fetch.
///
/// [`ensure_credentials`]: CredentialProvider::ensure_credentials
/// [`refresh`]: CredentialProvider::refresh
#[derive(Debug)]
pub struct CredentialProvider {
    origin: CredentialOrigin,
    metadata: Option<InstanceMetadata>,

    credential: Mutex<Credential>,
    refresh_lock: tokio::sync::Mutex<()>,
}

impl CredentialProvider {
    /// Resolve credentials the way the AWS CLI does.
    ///
    /// Precedence: `explicit` keys, then the environment, then the shared
    /// credentials file, then instance metadata.
    pub async fn resolve(
        ctx: &Context,
        config: &Config,
        explicit: &ExplicitKeys,
        profile: &str,
    ) -> Result<Self> {
        if let (Some(ak), Some(sk)) = (&explicit.access_key_id, &explicit.secret_access_key) {
            if ak.is_empty() || sk.is_empty() {
                return Err(Error::credential_not_found(
                    "explicit access key and secret key must not be empty",
                )
                .with_context(format!("origin: {}", CredentialOrigin::Explicit)));
            }
            debug!("using explicit credentials");
            return Ok(Self::new_static(
                CredentialOrigin::Explicit,
                Credential::new(ak, sk, explicit.session_token.clone()),
            ));
        }

        if let (Some(ak), Some(sk)) = (&config.access_key_id, &config.secret_access_key) {
            debug!("using credentials from env");
            return Ok(Self::new_static(
                CredentialOrigin::Environment,
                Credential::new(ak, sk, config.session_token.clone()),
            ));
        }

        if let Some(cred) =
            load_shared_credentials(ctx, &config.shared_credentials_file, profile).await?
        {
            return Ok(Self::new_static(CredentialOrigin::SharedFile, cred));
        }

        debug!("no static credentials found, using instance metadata");
        if config.metadata_disabled {
            warn!("instance metadata is disabled, requests will fail without credentials");
            return Ok(Self::new_dynamic(None));
        }
        Ok(Self::new_dynamic(Some(InstanceMetadata::new(
            &config.metadata_endpoint,
        ))))
    }

    /// Create a provider that always uses `credential`.
    pub fn new_static(origin: CredentialOrigin, credential: Credential) -> Self {
        debug_assert!(!origin.is_dynamic(), "static credentials need a static origin");

        Self {
            origin,
            metadata: None,
            credential: Mutex::new(credential),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Create a provider that fetches credentials from `metadata`.
    ///
    /// With `None` every fetch fails.
    pub fn new_dynamic(metadata: Option<InstanceMetadata>) -> Self {
        Self {
            origin: CredentialOrigin::Dynamic,
            metadata,
            credential: Mutex::new(Credential::default()),
            refresh_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Where the credentials come from.
    pub fn origin(&self) -> CredentialOrigin {
        self.origin
    }

    /// A snapshot of the current credentials.
    pub fn credential(&self) -> Credential {
        self.credential.lock().expect("lock poisoned").clone()
    }

    /// Returns true if dynamic credentials are missing or about to expire.
    ///
    /// Always false for static credentials.
    pub fn needs_credentials(&self) -> bool {
        if !self.origin.is_dynamic() {
            return false;
        }
        let cred = self.credential.lock().expect("lock poisoned");
        cred.access_key_id.is_empty() || cred.is_expiring()
    }

    /// Fetch dynamic credentials again.
    ///
    /// A no-op returning the current credentials for static origins. For
    /// dynamic origins the role name and then the role credentials are
    /// fetched; the stored credentials only change when both calls succeed.
    pub async fn refresh(&self, ctx: &Context) -> Result<Credential> {
        if !self.origin.is_dynamic() {
            return Ok(self.credential());
        }

        let _guard = self.refresh_lock.lock().await;
        self.fetch(ctx).await
    }

    /// Refresh only if [`needs_credentials`](Self::needs_credentials).
    ///
    /// The check is repeated after taking the refresh lock so that callers
    /// waiting on an in-flight refresh reuse its result.
    pub async fn ensure_credentials(&self, ctx: &Context) -> Result<Credential> {
        if !self.needs_credentials() {
            return Ok(self.credential());
        }

        let _guard = self.refresh_lock.lock().await;
        if !self.needs_credentials() {
            debug!("credentials refreshed by another task");
            return Ok(self.credential());
        }
        self.fetch(ctx).await
    }

    /// Drop dynamic credentials so that the next request fetches new ones.
    ///
    /// Static credentials can't be fetched again, so resetting them is an
    /// [`ErrorKind::InvalidState`](awsfetch_core::ErrorKind::InvalidState) error.
    pub fn reset(&self) -> Result<()> {
        if !self.origin.is_dynamic() {
            return Err(
                Error::invalid_state("static credentials can not be reset")
                    .with_context(format!("origin: {}", self.origin)),
            );
        }

        debug!("resetting dynamic credentials");
        *self.credential.lock().expect("lock poisoned") = Credential::default();
        Ok(())
    }

    async fn fetch(&self, ctx: &Context) -> Result<Credential> {
        let Some(metadata) = &self.metadata else {
            return Err(Error::credential_not_found(
                "no static credentials and instance metadata is disabled",
            ));
        };

        let role = metadata.role_name(ctx).await.map_err(|e| {
            Error::credential_not_found("failed to fetch IAM role from instance metadata")
                .with_context(format!("endpoint: {}", metadata.endpoint()))
                .with_source(e)
        })?;
        let cred = metadata.role_credentials(ctx, &role).await.map_err(|e| {
            Error::credential_not_found("failed to fetch IAM role credentials")
                .with_context(format!("role: {role}"))
                .with_context(format!("endpoint: {}", metadata.endpoint()))
                .with_source(e)
        })?;
        debug!("fetched credentials for role {role}: {cred:?}");

        *self.credential.lock().expect("lock poisoned") = cred.clone();
        Ok(cred)
    }
}
