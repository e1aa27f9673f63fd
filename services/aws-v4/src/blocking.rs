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

use crate::{Client, ClientBuilder, CredentialProvider, Endpoint, FetchRequest};
use awsfetch_core::{Context, Error, Result};
use bytes::Bytes;
use tokio::runtime::Runtime;

/// BlockingClient runs the [`Client`] request flow to completion on the
/// calling thread.
///
/// It owns a current-thread Tokio runtime. Don't call it from inside another
/// async runtime; use [`Client`] there.
#[derive(Debug)]
pub struct BlockingClient {
    runtime: Runtime,
    client: Client,
}

impl BlockingClient {
    /// Build the client described by `builder` on a fresh runtime.
    pub fn new(builder: ClientBuilder, ctx: Context) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::unexpected("failed to build tokio runtime").with_source(e))?;
        let client = runtime.block_on(builder.build(ctx))?;

        Ok(Self { runtime, client })
    }

    /// Sign and send `req`, blocking until it completes.
    ///
    /// See [`Client::fetch`] for the error and retry behavior.
    pub fn fetch(&self, req: FetchRequest) -> Result<http::Response<Bytes>> {
        self.runtime.block_on(self.client.fetch(req))
    }

    /// The service name.
    pub fn service(&self) -> &str {
        self.client.service()
    }

    /// The resolved region.
    pub fn region(&self) -> &str {
        self.client.region()
    }

    /// The resolved profile name.
    pub fn profile(&self) -> &str {
        self.client.profile()
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    /// The credential provider.
    pub fn provider(&self) -> &CredentialProvider {
        self.client.provider()
    }

    /// Release the transport and shut the runtime down.
    pub fn close(self) {
        self.client.close();
        self.runtime.shutdown_background();
    }
}
