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

use crate::classify::classify;
use crate::constants::REQUEST_TIMEOUT;
use crate::provide_credential::{
    resolve_region, CredentialProvider, ExplicitKeys, InstanceMetadata,
};
use crate::{Config, FetchRequest, RequestSigner};
use awsfetch_core::time::now;
use awsfetch_core::{Context, Error, ErrorKind, Result, Timeout};
use bytes::Bytes;
use log::{debug, error, warn};

/// Endpoint is where a client sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// `https` unless overridden.
    pub scheme: String,
    /// Service name used for signing.
    pub service: String,
    /// Region used for signing.
    pub region: String,
    /// Authority sent as the `Host` header.
    pub host: String,
    url: String,
}

impl Endpoint {
    /// Build the endpoint of `service` in `region`.
    ///
    /// Without an override the endpoint is `https://{service}.{region}.amazonaws.com`.
    pub fn new(service: &str, region: &str, override_url: Option<&str>) -> Result<Self> {
        let Some(url) = override_url else {
            let host = format!("{service}.{region}.amazonaws.com");
            return Ok(Self {
                scheme: "https".to_string(),
                service: service.to_string(),
                region: region.to_string(),
                url: format!("https://{host}"),
                host,
            });
        };

        let url = url.trim_end_matches('/');
        let uri: http::Uri = url.parse().map_err(|e| {
            Error::config_invalid("invalid endpoint url")
                .with_context(format!("endpoint: {url}"))
                .with_source(e)
        })?;
        let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) else {
            return Err(Error::config_invalid("endpoint url must be absolute")
                .with_context(format!("endpoint: {url}")));
        };

        Ok(Self {
            scheme: scheme.to_string(),
            service: service.to_string(),
            region: region.to_string(),
            host: authority.to_string(),
            url: url.to_string(),
        })
    }

    /// The base url requests are sent to, without trailing slash.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// ClientBuilder collects the explicit settings of a [`Client`].
///
/// Everything left unset is resolved from the environment and the AWS
/// config files when [`ClientBuilder::build`] runs.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    service: String,
    profile: Option<String>,
    region: Option<String>,
    keys: ExplicitKeys,
    endpoint: Option<String>,
}

impl ClientBuilder {
    /// Create a builder for `service`, e.g. `ec2` or `dynamodb`.
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            ..Default::default()
        }
    }

    /// Use `profile` from the AWS config files.
    pub fn with_profile(mut self, profile: &str) -> Self {
        self.profile = Some(profile.to_string());
        self
    }

    /// Use `region` instead of resolving it.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    /// Set the access key id.
    pub fn with_access_key(mut self, access_key_id: &str) -> Self {
        self.keys.access_key_id = Some(access_key_id.to_string());
        self
    }

    /// Set the secret access key.
    pub fn with_secret_key(mut self, secret_access_key: &str) -> Self {
        self.keys.secret_access_key = Some(secret_access_key.to_string());
        self
    }

    /// Set the session token that goes with the explicit keys.
    pub fn with_security_token(mut self, token: &str) -> Self {
        self.keys.session_token = Some(token.to_string());
        self
    }

    /// Send requests to `endpoint` instead of the AWS endpoint, e.g. `http://localhost:4566`.
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    /// Resolve configuration and credentials and build the client.
    pub async fn build(self, ctx: Context) -> Result<Client> {
        let config = Config::default().from_env(&ctx);
        debug!("building {} client with {config:?}", self.service);

        let profile = config.profile_name(self.profile.as_deref());
        let metadata = (!config.metadata_disabled)
            .then(|| InstanceMetadata::new(&config.metadata_endpoint));

        let region = resolve_region(
            &ctx,
            &config,
            self.region.as_deref(),
            &profile,
            metadata.as_ref(),
        )
        .await?;
        let provider = CredentialProvider::resolve(&ctx, &config, &self.keys, &profile).await?;
        let endpoint = Endpoint::new(&self.service, &region, self.endpoint.as_deref())?;
        debug!(
            "{} client uses region {region}, endpoint {} and {} credentials",
            self.service,
            endpoint.url(),
            provider.origin()
        );

        Ok(Client {
            signer: RequestSigner::new(&self.service, &region),
            ctx,
            config,
            service: self.service,
            region,
            profile,
            endpoint,
            provider,
        })
    }

    /// Build a [`BlockingClient`](crate::BlockingClient) that drives requests on its own runtime.
    #[cfg(feature = "blocking")]
    pub fn build_blocking(self, ctx: Context) -> Result<crate::BlockingClient> {
        crate::BlockingClient::new(self, ctx)
    }
}

/// Client signs and sends requests to one AWS service.
///
/// Dynamic credentials are fetched before the first request. If the service
/// rejects them, they are dropped and the request is retried exactly once
/// with fresh credentials.
///
/// A client owns its [`Context`] and with it the transport. Share it between
/// tasks with an `Arc`.
#[derive(Debug)]
pub struct Client {
    ctx: Context,
    config: Config,
    service: String,
    region: String,
    profile: String,
    endpoint: Endpoint,
    signer: RequestSigner,
    provider: CredentialProvider,
}

impl Client {
    /// The service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The resolved region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// The resolved profile name.
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The environment snapshot taken at build time.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The credential provider of this client.
    pub fn provider(&self) -> &CredentialProvider {
        &self.provider
    }

    /// Sign and send `req`, returning the 2xx response.
    ///
    /// - Non-2xx responses are decoded into a [`ServiceError`](crate::ServiceError)
    ///   carried by an [`ErrorKind::Service`] error.
    /// - Bodies that can't be decoded give an [`ErrorKind::HttpStatus`] error.
    /// - Transport failures give an [`ErrorKind::Transport`] error and are never retried.
    pub async fn fetch(&self, req: FetchRequest) -> Result<http::Response<Bytes>> {
        let mut retried = false;

        loop {
            let cred = self.provider.ensure_credentials(&self.ctx).await?;

            // Every attempt is signed with the current time.
            let signed = self.signer.sign(&req, &self.endpoint.host, &cred, now())?;
            debug!("signed url: {} {}", signed.method, signed.url(self.endpoint.url()));
            let mut http_req = signed.into_http(self.endpoint.url())?;
            http_req.extensions_mut().insert(Timeout(REQUEST_TIMEOUT));

            let resp = self.ctx.http_send(http_req).await.map_err(|e| {
                error!("error making request to {}: {e}", self.endpoint.url());
                if e.kind() == ErrorKind::Transport {
                    e
                } else {
                    Error::transport("failed to send request").with_source(e)
                }
            })?;

            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            let classified = classify(&resp).map_err(|e| {
                Error::http_status(format!("request failed with status {status}"))
                    .with_context(format!("status: {}", status.as_u16()))
                    .with_context(format!("url: {}", self.endpoint.url()))
                    .with_source(e)
            })?;

            if classified.refreshable && self.provider.origin().is_dynamic() && !retried {
                warn!(
                    "{} rejected credentials with {}, fetching new credentials",
                    self.service, classified.error.code
                );
                self.provider.reset()?;
                retried = true;
                continue;
            }

            return Err(classified.error.into_error(status));
        }
    }

    /// Release the transport held by this client.
    pub fn close(self) {
        let Client { ctx, service, .. } = self;
        debug!("closing {service} client");
        drop(ctx);
    }
}
