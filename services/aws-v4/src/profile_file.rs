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

use awsfetch_core::{Context, Error, ErrorKind, Result};
use ini::{Ini, Properties};
use log::debug;

/// ProfileFile is a parsed INI-style AWS configuration file.
///
/// The shared credentials file uses `[default]` and `[<name>]` sections; the
/// config file uses `[default]` and `[profile <name>]` sections.
#[derive(Debug)]
pub struct ProfileFile {
    path: String,
    ini: Ini,
}

impl ProfileFile {
    /// Load and parse the file at `path`, expanding a leading `~`.
    ///
    /// - A missing file (or an unresolvable home dir) returns [`ErrorKind::ConfigNotFound`].
    /// - A file that is not valid INI returns [`ErrorKind::ConfigInvalid`].
    pub async fn load(ctx: &Context, path: &str) -> Result<Self> {
        let Some(expanded) = ctx.expand_home_dir(path) else {
            return Err(Error::config_not_found("home dir could not be resolved")
                .with_context(format!("path: {path}")));
        };
        debug!("loading aws config from {expanded}");

        let content = ctx.file_read_as_string(&expanded).await?;
        let ini = Ini::load_from_str(&content).map_err(|e| {
            Error::config_invalid("failed to parse config file")
                .with_context(format!("path: {expanded}"))
                .with_source(anyhow::Error::new(e))
        })?;

        Ok(Self {
            path: expanded,
            ini,
        })
    }

    /// Load the file, mapping a missing file to `Ok(None)`.
    pub async fn load_optional(ctx: &Context, path: &str) -> Result<Option<Self>> {
        match Self::load(ctx, path).await {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.kind() == ErrorKind::ConfigNotFound => {
                debug!("config file {path} not found, skipped");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// The expanded path this file was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the section with exactly this name.
    pub fn section(&self, name: &str) -> Option<&Properties> {
        self.ini.section(Some(name))
    }

    /// Get the section of `profile` in a config file.
    ///
    /// `[profile <name>]` is preferred, a bare `[<name>]` is accepted too.
    /// The `default` profile lives in `[default]`.
    pub fn config_section(&self, profile: &str) -> Option<&Properties> {
        if profile == "default" {
            return self.section("default");
        }
        self.section(&format!("profile {profile}"))
            .or_else(|| self.section(profile))
    }

    /// Lookup `key` in the `profile` section of a credentials file, falling
    /// back to `[default]` when the key is absent.
    pub fn get_with_default(&self, profile: &str, key: &str) -> Option<&str> {
        self.section(profile)
            .and_then(|props| props.get(key))
            .or_else(|| self.section("default").and_then(|props| props.get(key)))
            .filter(|v| !v.is_empty())
    }
}
