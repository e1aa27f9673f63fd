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

//! Scripted `HttpSend` used by unit tests.

use async_trait::async_trait;
use awsfetch_core::{Error, HttpSend, Result, Timeout};
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Default)]
struct State {
    script: VecDeque<Result<http::Response<Bytes>>>,
    requests: Vec<Recorded>,
}

/// Replies with scripted responses in order and records every request.
#[derive(Debug, Clone, Default)]
pub struct MockHttpSend {
    state: Arc<Mutex<State>>,
}

impl MockHttpSend {
    pub fn respond(&self, status: u16, content_type: &str, body: &str) -> &Self {
        let resp = http::Response::builder()
            .status(StatusCode::from_u16(status).unwrap())
            .header(http::header::CONTENT_TYPE, content_type)
            .body(Bytes::from(body.to_string()))
            .unwrap();
        self.state.lock().unwrap().script.push_back(Ok(resp));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .script
            .push_back(Err(Error::transport(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        std::mem::take(&mut self.state.lock().unwrap().requests)
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(Recorded {
            method: req.method().clone(),
            uri: req.uri().to_string(),
            headers: req.headers().clone(),
            body: req.body().clone(),
            timeout: Timeout::from_request(&req),
        });
        state
            .script
            .pop_front()
            .unwrap_or_else(|| Err(Error::transport("no scripted response left")))
    }
}
