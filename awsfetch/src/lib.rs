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

//! Signed HTTP client for AWS-style APIs.
//!
//! This crate bundles [`awsfetch_core`], the AWS client from
//! [`awsfetch_aws_v4`] and, with the `default-context` feature, the
//! tokio and reqwest based [`Context`] implementations.
//!
//! ## Example
//!
//! ```no_run
//! use awsfetch::aws::{ClientBuilder, FetchRequest};
//!
//! # async fn example() -> awsfetch::Result<()> {
//! let client = ClientBuilder::new("sqs")
//!     .with_region("eu-west-1")
//!     .build(awsfetch::default_context())
//!     .await?;
//!
//! let resp = client
//!     .fetch(FetchRequest::get("/?Action=ListQueues&Version=2012-11-05"))
//!     .await?;
//! println!("{}", String::from_utf8_lossy(resp.body()));
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use awsfetch_core::*;

/// The AWS client, signer, credential provider and error classifier.
pub mod aws {
    pub use awsfetch_aws_v4::*;
}

#[cfg(feature = "default-context")]
pub use awsfetch_file_read_tokio::TokioFileRead;
#[cfg(feature = "default-context")]
pub use awsfetch_http_send_reqwest::ReqwestHttpSend;

/// Build a [`Context`] that reads files with tokio, sends requests with
/// reqwest and reads the process environment.
#[cfg(feature = "default-context")]
pub fn default_context() -> Context {
    Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv)
}
