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
//! Credentials and region are resolved the way the AWS CLI does, requests
//! are signed with SigV4 and failed responses are decoded into
//! [`ServiceError`]s. When a service rejects credentials fetched from the
//! instance metadata service, they are fetched again and the request is
//! retried once.
//!
//! ## Example
//!
//! ```no_run
//! use awsfetch_aws_v4::{ClientBuilder, FetchRequest};
//! use awsfetch_core::{Context, Result};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let client = ClientBuilder::new("ec2")
//!     .with_region("us-east-1")
//!     .build(ctx)
//!     .await?;
//!
//! let resp = client
//!     .fetch(FetchRequest::get("/?Action=DescribeRegions&Version=2016-11-15"))
//!     .await?;
//! println!("{}", String::from_utf8_lossy(resp.body()));
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod profile_file;
pub use profile_file::ProfileFile;

mod provide_credential;
pub use provide_credential::*;

mod request;
pub use request::FetchRequest;

mod sign_request;
pub use sign_request::{RequestSigner, SignedRequest};

mod xml;
pub use xml::XmlNode;

mod classify;
pub use classify::{classify, Classified, ServiceError};

mod client;
pub use client::{Client, ClientBuilder, Endpoint};

#[cfg(feature = "blocking")]
mod blocking;
#[cfg(feature = "blocking")]
pub use blocking::BlockingClient;

#[cfg(test)]
mod mock;
