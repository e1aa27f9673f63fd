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

use awsfetch_core::{Error, Result};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};

/// FetchRequest describes one call to an AWS API.
///
/// Headers live in a [`HeaderMap`], so names are case-insensitive and a
/// later [`FetchRequest::with_header`] for the same name replaces the
/// earlier value.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path, used verbatim in the canonical request.
    pub path: String,
    /// Query pairs, unencoded.
    pub query: Vec<(String, String)>,
    /// Caller supplied headers.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Bytes,
}

impl FetchRequest {
    /// Create a request for `path`.
    ///
    /// A `?query` suffix is split off and decoded into query pairs.
    pub fn new(method: Method, path: &str) -> Self {
        let (path, query) = match path.split_once('?') {
            Some((path, query)) => (
                path,
                form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect(),
            ),
            None => (path, Vec::new()),
        };

        let path = if path.is_empty() { "/" } else { path };

        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Shortcut for a `GET` request.
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shortcut for a `POST` request.
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a query pair.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a header, replacing any earlier value of the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::request_invalid("invalid header name")
                .with_context(format!("header: {name}"))
                .with_source(e)
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::request_invalid("invalid header value")
                .with_context(format!("header: {name}"))
                .with_source(e)
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}
