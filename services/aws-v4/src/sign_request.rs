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

use crate::constants::*;
use crate::{Credential, FetchRequest};
use awsfetch_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use awsfetch_core::time::{format_date, format_iso8601, DateTime};
use awsfetch_core::{Error, Result};
use bytes::Bytes;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use log::debug;
use percent_encoding::utf8_percent_encode;
use std::collections::BTreeMap;
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process][sigv4]
///
/// [sigv4]: https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html
///
/// Signing is pure: the same request, credential and time always produce
/// the same signature.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
}

/// SignedRequest is the output of [`RequestSigner::sign`].
///
/// It is built fresh for every attempt and never reused.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Encoded and sorted query string, without the leading `?`.
    pub canonical_query: String,
    /// Every header sent with the request, `Authorization` included.
    pub headers: HeaderMap,
    /// Raw request body.
    pub body: Bytes,
}

impl SignedRequest {
    /// The value of the `Authorization` header.
    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    /// Build the url of this request against `endpoint`,
    /// e.g. `https://ec2.us-east-1.amazonaws.com`.
    pub fn url(&self, endpoint: &str) -> String {
        let mut url = format!("{}{}", endpoint.trim_end_matches('/'), self.path);
        if !self.canonical_query.is_empty() {
            url.push('?');
            url.push_str(&self.canonical_query);
        }
        url
    }

    /// Convert into an [`http::Request`] against `endpoint`.
    pub fn into_http(self, endpoint: &str) -> Result<http::Request<Bytes>> {
        let url = self.url(endpoint);
        let mut req = http::Request::builder()
            .method(self.method)
            .uri(&url)
            .body(self.body)
            .map_err(|e| {
                Error::request_invalid("failed to build signed request")
                    .with_context(format!("url: {url}"))
                    .with_source(e)
            })?;
        *req.headers_mut() = self.headers;
        Ok(req)
    }
}

impl RequestSigner {
    /// Create a new signer for `service` in `region`.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
        }
    }

    /// The service name used in the scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The region used in the scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign `req` for `host` at `now`.
    ///
    /// `Date`, `Content-Length` and `X-Amz-Content-sha256` always overwrite
    /// caller values; `Host` is only added when the caller didn't set one.
    /// If a header has several values only the last one is signed and sent.
    pub fn sign(
        &self,
        req: &FetchRequest,
        host: &str,
        cred: &Credential,
        now: DateTime,
    ) -> Result<SignedRequest> {
        let payload_hash = hex_sha256(&req.body);
        let amz_date = format_iso8601(now);

        // canonicalize context
        let mut headers = canonicalize_header(&req.headers)?;
        headers
            .entry(header::HOST.as_str().to_string())
            .or_insert_with(|| host.to_string());
        headers.insert(header::DATE.as_str().to_string(), amz_date.clone());
        headers.insert(
            header::CONTENT_LENGTH.as_str().to_string(),
            req.body.len().to_string(),
        );
        headers.insert(X_AMZ_CONTENT_SHA_256.to_string(), payload_hash.clone());
        if let Some(token) = &cred.session_token {
            headers.insert(X_AMZ_SECURITY_TOKEN.to_string(), token.clone());
        }
        let canonical_query = canonicalize_query(&req.query);

        // build canonical request and string to sign.
        let signed_headers = headers.keys().map(String::as_str).collect::<Vec<_>>().join(";");
        let creq = canonical_request_string(
            &req.method,
            &req.path,
            &canonical_query,
            &headers,
            &signed_headers,
            &payload_hash,
        );
        debug!("calculated canonical request: {creq}");
        let encoded_req = hex_sha256(creq.as_bytes());

        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/aws4_request",
            format_date(now),
            self.region,
            self.service
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20220313T072004Z
        // 20220313/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = format!("AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{encoded_req}");
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key =
            generate_signing_key(&cred.secret_access_key, now, &self.region, &self.service);
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes());

        let authorization = format!(
            "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
            cred.access_key_id, scope, signed_headers, signature
        );

        let mut header_map = HeaderMap::with_capacity(headers.len() + 1);
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::request_invalid("invalid header name")
                    .with_context(format!("header: {name}"))
                    .with_source(e)
            })?;
            let mut value = HeaderValue::from_str(&value).map_err(|e| {
                Error::request_invalid("invalid header value")
                    .with_context(format!("header: {name}"))
                    .with_source(e)
            })?;
            // Set token value sensitive to avoid leaking.
            if name == X_AMZ_SECURITY_TOKEN {
                value.set_sensitive(true);
            }
            header_map.insert(name, value);
        }
        let mut authorization = HeaderValue::from_str(&authorization).map_err(|e| {
            Error::request_invalid("failed to create authorization header").with_source(e)
        })?;
        authorization.set_sensitive(true);
        header_map.insert(header::AUTHORIZATION, authorization);

        Ok(SignedRequest {
            method: req.method.clone(),
            path: req.path.clone(),
            canonical_query,
            headers: header_map,
            body: req.body.clone(),
        })
    }
}

/// Lower-cased header names mapped to trimmed values, sorted by name.
fn canonicalize_header(headers: &HeaderMap) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for name in headers.keys() {
        // Duplicated names collapse into the last value.
        let Some(value) = headers.get_all(name).iter().last() else {
            continue;
        };
        let value = value.to_str().map_err(|e| {
            Error::request_invalid("header value is not visible ascii")
                .with_context(format!("header: {name}"))
                .with_source(e)
        })?;
        out.insert(name.as_str().to_ascii_lowercase(), value.trim().to_string());
    }
    Ok(out)
}

/// Percent-encode every key and value, sort by the encoded pair, join with `&`.
fn canonicalize_query(query: &[(String, String)]) -> String {
    let mut pairs = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    // Sort by param name
    pairs.sort();

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_request_string(
    method: &Method,
    path: &str,
    canonical_query: &str,
    headers: &BTreeMap<String, String>,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Writing into a String is infallible.
    let _ = writeln!(f, "{method}");
    let _ = writeln!(f, "{path}");
    let _ = writeln!(f, "{canonical_query}");
    for (name, value) in headers {
        let _ = writeln!(f, "{name}:{value}");
    }
    let _ = writeln!(f);
    let _ = writeln!(f, "{signed_headers}");
    f.push_str(payload_hash);

    f
}

fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), "aws4_request".as_bytes())
}
