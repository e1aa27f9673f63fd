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

use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use std::time::Duration;

// Headers used in aws services.
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
pub const X_AMZN_REQUEST_ID: &str = "x-amzn-requestid";
pub const X_AMZ_REQUEST_ID: &str = "x-amz-request-id";

// Env values used in aws services.
pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_SECURITY_TOKEN: &str = "AWS_SECURITY_TOKEN";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_PROFILE: &str = "AWS_DEFAULT_PROFILE";
pub const AWS_PROFILE: &str = "AWS_PROFILE";
pub const AWS_CONFIG_FILE: &str = "AWS_CONFIG_FILE";
pub const AWS_SHARED_CREDENTIALS_FILE: &str = "AWS_SHARED_CREDENTIALS_FILE";
pub const AWS_EC2_METADATA_SERVICE_ENDPOINT: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";
pub const AWS_EC2_METADATA_DISABLED: &str = "AWS_EC2_METADATA_DISABLED";

// Defaults used when nothing is configured.
pub const DEFAULT_PROFILE: &str = "default";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_CONFIG_FILE: &str = "~/.aws/config";
pub const DEFAULT_SHARED_CREDENTIALS_FILE: &str = "~/.aws/credentials";
pub const DEFAULT_METADATA_ENDPOINT: &str = "http://169.254.169.254";

// Instance metadata paths.
pub const METADATA_IDENTITY_DOCUMENT_PATH: &str = "/latest/dynamic/instance-identity/document";
pub const METADATA_SECURITY_CREDENTIALS_PATH: &str = "/latest/meta-data/iam/security-credentials/";

/// Timeout for the signed API call itself.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for the role name and role credential metadata calls.
pub const METADATA_TIMEOUT: Duration = Duration::from_millis(250);
/// Timeout for the instance identity document used for region discovery.
pub const METADATA_REGION_TIMEOUT: Duration = Duration::from_secs(3);

/// Dynamic credentials expiring within this many seconds are fetched again.
pub const CREDENTIAL_EXPIRY_BUFFER_SECS: i64 = 120;

/// Content types that carry the JSON ("AWZ") error shape.
pub const JSON_CONTENT_TYPES: &[&str] = &[
    "application/json",
    "application/x-amz-json-1.0",
    "application/x-amz-json-1.1",
];

/// JSON error codes that signal missing, expired or invalid credentials.
pub const JSON_REFRESH_CODES: &[&str] = &[
    "AuthFailure",
    "AuthMissingFailure",
    "AWS.InvalidAccount",
    "ExpiredTokenException",
    "InvalidSignatureException",
    "MissingAuthenticationTokenException",
    "UnrecognizedClientException",
];

/// XML error codes that signal missing, expired or invalid credentials.
pub const XML_REFRESH_CODES: &[&str] = &[
    "AuthFailure",
    "ExpiredToken",
    "InvalidClientTokenId",
    "InvalidSecurity",
    "MissingAuthenticationToken",
    "SignatureDoesNotMatch",
];

/// AsciiSet for [AWS UriEncode]
///
/// [AWS UriEncode]: https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html
///
/// But used in query: every byte except `A-Z a-z 0-9 - . _ ~` is encoded.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
