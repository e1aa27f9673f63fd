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
use crate::Credential;
use awsfetch_core::time::parse_rfc3339;
use awsfetch_core::{Context, Error, Result, Timeout};
use bytes::Bytes;
use http::header::ACCEPT;
use http::{Method, StatusCode};
use log::debug;
use serde::Deserialize;
use std::time::Duration;

/// InstanceMetadata talks to the EC2 instance metadata service.
///
/// Every call is a single GET with a short timeout and no retry; callers
/// decide how to degrade when the service is unreachable.
#[derive(Debug, Clone)]
pub struct InstanceMetadata {
    endpoint: String,
}

impl InstanceMetadata {
    /// Create a new `InstanceMetadata` against `endpoint`, e.g. `http://169.254.169.254`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// The base url of the metadata service.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the region of the running instance from the identity document.
    pub async fn region(&self, ctx: &Context) -> Result<String> {
        let body = self
            .get(
                ctx,
                "fetch_identity_document",
                METADATA_IDENTITY_DOCUMENT_PATH,
                METADATA_REGION_TIMEOUT,
            )
            .await?;

        let doc: IdentityDocument = serde_json::from_str(&body).map_err(|e| {
            Error::unexpected("failed to parse instance identity document")
                .with_context(format!("response_length: {}", body.len()))
                .with_source(e)
        })?;
        Ok(doc.region)
    }

    /// Fetch the name of the IAM role attached to the running instance.
    pub async fn role_name(&self, ctx: &Context) -> Result<String> {
        let body = self
            .get(
                ctx,
                "list_instance_profiles",
                METADATA_SECURITY_CREDENTIALS_PATH,
                METADATA_TIMEOUT,
            )
            .await?;

        body.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::credential_not_found("no IAM role attached to EC2 instance")
                    .with_context("hint: attach an IAM role to your EC2 instance")
            })
    }

    /// Fetch temporary credentials issued for `role`.
    pub async fn role_credentials(&self, ctx: &Context, role: &str) -> Result<Credential> {
        let path = format!("{METADATA_SECURITY_CREDENTIALS_PATH}{role}");
        let body = self
            .get(ctx, "fetch_credentials", &path, METADATA_TIMEOUT)
            .await
            .map_err(|e| e.with_context(format!("role: {role}")))?;

        let resp: Ec2MetadataIamSecurityCredentials =
            serde_json::from_str(&body).map_err(|e| {
                Error::unexpected("failed to parse IMDS credentials response")
                    .with_context(format!("response_length: {}", body.len()))
                    .with_context(format!("role: {role}"))
                    .with_source(e)
            })?;

        if let Some(code) = resp.code.as_deref().filter(|c| *c != "Success") {
            return Err(Error::credential_not_found(format!(
                "IMDS returned error: [{code}] {}",
                resp.message.unwrap_or_default()
            ))
            .with_context(format!("role: {role}")));
        }
        if resp.access_key_id.is_empty() || resp.secret_access_key.is_empty() {
            return Err(Error::credential_not_found("IMDS returned empty credentials")
                .with_context(format!("role: {role}")));
        }

        let expires_in = parse_rfc3339(&resp.expiration).map_err(|e| {
            Error::unexpected("failed to parse IMDS credential expiration time")
                .with_context(format!("expiration_value: {}", resp.expiration))
                .with_source(e)
        })?;

        Ok(Credential {
            access_key_id: resp.access_key_id,
            secret_access_key: resp.secret_access_key,
            session_token: Some(resp.token),
            expires_in: Some(expires_in),
        })
    }

    async fn get(
        &self,
        ctx: &Context,
        operation: &str,
        path: &str,
        timeout: Duration,
    ) -> Result<String> {
        let url = format!("{}{path}", self.endpoint);
        debug!("{operation}: GET {url}");

        let req = http::Request::builder()
            .method(Method::GET)
            .uri(&url)
            .header(ACCEPT, "application/json")
            .extension(Timeout(timeout))
            .body(Bytes::new())
            .map_err(|e| {
                Error::request_invalid("failed to build IMDS request")
                    .with_context(format!("url: {url}"))
                    .with_source(e)
            })?;

        let resp = ctx.http_send_as_string(req).await.map_err(|e| {
            Error::transport("failed to connect to IMDS")
                .with_context(format!("operation: {operation}"))
                .with_context(format!("endpoint: {}", self.endpoint))
                .with_context("hint: check if running on EC2 instance")
                .with_source(e)
        })?;

        if resp.status() != StatusCode::OK {
            return Err(parse_imds_error(operation, resp.status(), resp.body()));
        }
        Ok(resp.into_body())
    }
}

fn parse_imds_error(operation: &str, status: StatusCode, body: &str) -> Error {
    Error::unexpected(format!("IMDS {operation} failed with status {status}"))
        .with_context(format!("operation: {operation}"))
        .with_context(format!("status: {}", status.as_u16()))
        .with_context(format!("body: {}", body.chars().take(256).collect::<String>()))
}

#[derive(Debug, Deserialize)]
struct IdentityDocument {
    region: String,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct Ec2MetadataIamSecurityCredentials {
    access_key_id: String,
    secret_access_key: String,
    token: String,
    expiration: String,

    code: Option<String>,
    message: Option<String>,
}
