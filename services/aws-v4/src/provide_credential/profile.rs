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

use crate::profile_file::ProfileFile;
use crate::Credential;
use awsfetch_core::{Context, Error, Result};
use log::debug;

/// Load static credentials for `profile` from the shared credentials file.
///
/// - A missing file yields `Ok(None)` so resolution can move on.
/// - A file without a `[<profile>]` section is
///   [`ErrorKind::ProfileNotFound`](awsfetch_core::ErrorKind::ProfileNotFound).
/// - Every key falls back to `[default]` individually.
pub async fn load_shared_credentials(
    ctx: &Context,
    path: &str,
    profile: &str,
) -> Result<Option<Credential>> {
    let Some(file) = ProfileFile::load_optional(ctx, path).await? else {
        return Ok(None);
    };

    if file.section(profile).is_none() {
        return Err(
            Error::profile_not_found("profile not found in shared credentials file")
                .with_context(format!("profile: {profile}"))
                .with_context(format!("path: {}", file.path())),
        );
    }

    let access_key_id = file.get_with_default(profile, "aws_access_key_id");
    let secret_access_key = file.get_with_default(profile, "aws_secret_access_key");
    let session_token = file
        .get_with_default(profile, "aws_session_token")
        .or_else(|| file.get_with_default(profile, "aws_security_token"));

    match (access_key_id, secret_access_key) {
        (Some(ak), Some(sk)) => {
            debug!("loaded credentials of profile {profile} from {}", file.path());
            Ok(Some(Credential::new(
                ak,
                sk,
                session_token.map(str::to_string),
            )))
        }
        _ => {
            debug!(
                "profile {profile} in {} has no complete key pair",
                file.path()
            );
            Ok(None)
        }
    }
}
