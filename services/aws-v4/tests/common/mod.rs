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

use async_trait::async_trait;
use awsfetch_core::{Context, Error, HttpSend, Result, StaticEnv, Timeout};
use awsfetch_file_read_tokio::TokioFileRead;
use bytes::Bytes;
use http::{HeaderMap, Method};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ROLE_LIST_URL: &str =
    "http://169.254.169.254/latest/meta-data/iam/security-credentials/";
pub const IDENTITY_DOCUMENT_URL: &str =
    "http://169.254.169.254/latest/dynamic/instance-identity/document";

/// A request observed by [`ScriptedHttpSend`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub timeout: Option<Duration>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Response {
        status: u16,
        content_type: String,
        body: String,
    },
    Fail(String),
}

#[derive(Debug, Default)]
struct State {
    routes: Vec<(String, Vec<Reply>)>,
    requests: Vec<Recorded>,
}

/// HttpSend that answers from a script keyed by url prefix.
///
/// Replies for a prefix are consumed in order and the last one repeats.
/// The longest matching prefix wins.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHttpSend {
    state: Arc<Mutex<State>>,
}

impl ScriptedHttpSend {
    fn push(&self, prefix: &str, reply: Reply) -> &Self {
        let mut state = self.state.lock().unwrap();
        match state.routes.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, replies)) => replies.push(reply),
            None => state.routes.push((prefix.to_string(), vec![reply])),
        }
        drop(state);
        self
    }

    pub fn respond(
        &self,
        prefix: &str,
        status: u16,
        content_type: &str,
        body: &str,
    ) -> &Self {
        self.push(
            prefix,
            Reply::Response {
                status,
                content_type: content_type.to_string(),
                body: body.to_string(),
            },
        )
    }

    pub fn fail(&self, prefix: &str, message: &str) -> &Self {
        self.push(prefix, Reply::Fail(message.to_string()))
    }

    /// Serve the role `web-role` and credentials for it from instance metadata.
    pub fn instance_role(&self, access_key_id: &str) -> &Self {
        self.respond(ROLE_LIST_URL, 200, "text/plain", "web-role\n");
        self.role_credentials(access_key_id)
    }

    /// Queue one more credentials reply for `web-role`.
    ///
    /// The token of the served credential is `token-<access_key_id>`.
    pub fn role_credentials(&self, access_key_id: &str) -> &Self {
        let body = format!(
            concat!(
                r#"{{"Code":"Success","AccessKeyId":"{0}","SecretAccessKey":"secret","#,
                r#""Token":"token-{0}","Expiration":"2099-01-01T00:00:00Z"}}"#,
            ),
            access_key_id
        );
        self.respond(&format!("{ROLE_LIST_URL}web-role"), 200, "text/plain", &body)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.uri.starts_with(prefix))
            .collect()
    }

    /// Number of live handles sharing this transport's state.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.state)
    }
}

#[async_trait]
impl HttpSend for ScriptedHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let uri = req.uri().to_string();
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(Recorded {
                method: req.method().clone(),
                uri: uri.clone(),
                headers: req.headers().clone(),
                body: req.body().clone(),
                timeout: Timeout::from_request(&req),
            });

            state
                .routes
                .iter_mut()
                .filter(|(p, _)| uri.starts_with(p.as_str()))
                .max_by_key(|(p, _)| p.len())
                .map(|(_, replies)| {
                    if replies.len() > 1 {
                        replies.remove(0)
                    } else {
                        replies[0].clone()
                    }
                })
        };

        match reply {
            Some(Reply::Response {
                status,
                content_type,
                body,
            }) => Ok(http::Response::builder()
                .status(status)
                .header(http::header::CONTENT_TYPE, content_type)
                .body(Bytes::from(body))
                .unwrap()),
            Some(Reply::Fail(message)) => Err(Error::transport(message)),
            None => Err(Error::transport(format!("connection refused: {uri}"))),
        }
    }
}

/// Build a context rooted at `home` with `envs` and `http` as transport.
pub fn context(home: &Path, envs: &[(&str, &str)], http: &ScriptedHttpSend) -> Context {
    let _ = env_logger::builder().is_test(true).try_init();

    Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(http.clone())
        .with_env(StaticEnv {
            home_dir: Some(home.to_path_buf()),
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
}

/// Write `content` to `<home>/.aws/<name>`.
pub fn write_aws_file(home: &Path, name: &str, content: &str) {
    let dir = home.join(".aws");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(name), content).unwrap();
}
