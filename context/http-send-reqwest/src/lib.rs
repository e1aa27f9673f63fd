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

//! Reqwest-based HTTP client implementation for awsfetch.
//!
//! This crate provides `ReqwestHttpSend`, an HTTP client that implements
//! the `HttpSend` trait from `awsfetch_core` using the popular reqwest library.
//!
//! ## Timeouts
//!
//! The default client uses a 10 seconds connect timeout. A per request
//! deadline can be attached with the [`Timeout`] extension; it covers the
//! whole exchange including reading the body.
//!
//! ## Example
//!
//! ```no_run
//! use awsfetch_core::Context;
//! use awsfetch_http_send_reqwest::ReqwestHttpSend;
//! use reqwest::Client;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), reqwest::Error> {
//! let client = Client::builder()
//!     .connect_timeout(Duration::from_secs(5))
//!     .build()?;
//!
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::new(client));
//! # Ok(())
//! # }
//! ```
//!
//! Every failure that happens before a response is received is reported as
//! [`ErrorKind::Transport`](awsfetch_core::ErrorKind::Transport).

use async_trait::async_trait;
use awsfetch_core::{Error, HttpSend, Result, Timeout};
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use std::time::Duration;

/// Connect timeout used by [`ReqwestHttpSend::default`].
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl Default for ReqwestHttpSend {
    fn default() -> Self {
        // Building a client only fails when the TLS backend cannot be initialized.
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a custom reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let timeout = Timeout::from_request(&req);
        let method = req.method().clone();
        let uri = req.uri().to_string();

        let mut req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert http request")
                .with_context(format!("uri: {uri}"))
                .with_source(e)
        })?;
        if let Some(timeout) = timeout {
            *req.timeout_mut() = Some(timeout);
        }

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| transport_error(&method, &uri, e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| transport_error(&method, &uri, e))?;

        log::debug!("{method} {uri} returned {}", parts.status);
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn transport_error(method: &http::Method, uri: &str, err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "failed to connect"
    } else {
        "failed to send request"
    };

    Error::transport(message)
        .with_context(format!("method: {method}"))
        .with_context(format!("uri: {uri}"))
        .with_source(err)
}
