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

use crate::constants::DEFAULT_REGION;
use crate::profile_file::ProfileFile;
use crate::provide_credential::InstanceMetadata;
use crate::Config;
use awsfetch_core::{Context, Error, Result};
use log::{debug, warn};

/// Resolve the region a client talks to.
///
/// Precedence: `explicit`, then the environment, then the `region` key of
/// the config file (`[profile <name>]` falling back to `[default]`), then
/// the instance identity document, then [`DEFAULT_REGION`].
///
/// A config file that exists but holds neither the profile nor a `[default]`
/// section is an error. A config file without any `region` key resolves to
/// the default without asking the metadata service.
pub async fn resolve_region(
    ctx: &Context,
    config: &Config,
    explicit: Option<&str>,
    profile: &str,
    metadata: Option<&InstanceMetadata>,
) -> Result<String> {
    if let Some(region) = explicit {
        return Ok(region.to_string());
    }
    if let Some(region) = &config.region {
        debug!("using region {region} from env");
        return Ok(region.clone());
    }

    if let Some(file) = ProfileFile::load_optional(ctx, &config.config_file).await? {
        let section = file.config_section(profile);
        let default = file.section("default");
        if section.is_none() && default.is_none() {
            return Err(
                Error::profile_not_found("profile not found in config file")
                    .with_context(format!("profile: {profile}"))
                    .with_context(format!("path: {}", file.path())),
            );
        }

        let region = section
            .and_then(|s| s.get("region"))
            .or_else(|| default.and_then(|s| s.get("region")))
            .filter(|r| !r.is_empty());
        return Ok(match region {
            Some(region) => {
                debug!("using region {region} from {}", file.path());
                region.to_string()
            }
            None => {
                debug!("no region in {}, using {DEFAULT_REGION}", file.path());
                DEFAULT_REGION.to_string()
            }
        });
    }

    let Some(metadata) = metadata else {
        debug!("instance metadata disabled, using {DEFAULT_REGION}");
        return Ok(DEFAULT_REGION.to_string());
    };
    match metadata.region(ctx).await {
        Ok(region) => {
            debug!("using region {region} from instance identity document");
            Ok(region)
        }
        Err(err) => {
            warn!("failed to fetch region from instance metadata, using {DEFAULT_REGION}: {err}");
            Ok(DEFAULT_REGION.to_string())
        }
    }
}
