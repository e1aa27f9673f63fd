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
use crate::xml::XmlNode;
use awsfetch_core::{Error, Result};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use log::debug;
use serde_json::Value;

/// ServiceError is an error answered by an AWS service.
///
/// It is carried as the source of an [`ErrorKind::Service`](awsfetch_core::ErrorKind::Service)
/// error; use [`ServiceError::from_error`] to get it back.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Error code like `ExpiredToken`, without any namespace.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Request id assigned by the service.
    pub request_id: Option<String>,
    /// The resource the error is about, or the S3 host id.
    pub resource: Option<String>,
}

impl ServiceError {
    /// Get the service error carried by `err`.
    pub fn from_error(err: &Error) -> Option<&ServiceError> {
        err.source_ref()?.downcast_ref::<ServiceError>()
    }

    /// Wrap into an [`Error`] of kind `Service`.
    pub fn into_error(self, status: http::StatusCode) -> Error {
        let mut err = Error::service(format!("service returned {}", self.code))
            .with_context(format!("status: {}", status.as_u16()))
            .with_context(format!("code: {}", self.code));
        if let Some(request_id) = &self.request_id {
            err = err.with_context(format!("request_id: {request_id}"));
        }
        err.with_source(self)
    }
}

/// The result of classifying a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// The decoded error.
    pub error: ServiceError,
    /// Whether the error says the credentials are missing, expired or invalid.
    pub refreshable: bool,
}

/// Decode the error carried by a non-2xx response.
///
/// JSON content types are first decoded as `{"__type": ..., "message": ...}`,
/// anything else is decoded as one of the XML error shapes AWS services use.
/// A body matching no known shape is an
/// [`ErrorKind::ResponseInvalid`](awsfetch_core::ErrorKind::ResponseInvalid) error.
pub fn classify(resp: &http::Response<Bytes>) -> Result<Classified> {
    let headers = resp.headers();

    if is_json_content_type(headers) {
        if let Some(error) = parse_json_error(resp.body(), headers) {
            let refreshable = JSON_REFRESH_CODES.contains(&error.code.as_str());
            debug!("classified json error {} (refreshable: {refreshable})", error.code);
            return Ok(Classified { error, refreshable });
        }
    }

    let body = String::from_utf8_lossy(resp.body());
    let root = XmlNode::parse(&body)
        .map_err(|e| e.with_context(format!("status: {}", resp.status().as_u16())))?;
    let error = parse_xml_error(&root, headers).ok_or_else(|| {
        Error::response_invalid("response body is not a known AWS error shape")
            .with_context(format!("status: {}", resp.status().as_u16()))
            .with_context(format!("root: {}", root.name))
    })?;

    let refreshable = XML_REFRESH_CODES.contains(&error.code.as_str());
    debug!("classified xml error {} (refreshable: {refreshable})", error.code);
    Ok(Classified { error, refreshable })
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let media_type = value.split(';').next().unwrap_or_default().trim();
    JSON_CONTENT_TYPES
        .iter()
        .any(|v| v.eq_ignore_ascii_case(media_type))
}

fn parse_json_error(body: &[u8], headers: &HeaderMap) -> Option<ServiceError> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    let type_ = object.get("__type")?.as_str()?;

    // "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException"
    let code = match type_.rfind('#') {
        Some(idx) => &type_[idx + 1..],
        None => type_,
    };
    let message = object
        .get("message")
        .or_else(|| object.get("Message"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    Some(ServiceError {
        code: code.to_string(),
        message: message.to_string(),
        request_id: request_id_from_headers(headers),
        resource: None,
    })
}

fn parse_xml_error(root: &XmlNode, headers: &HeaderMap) -> Option<ServiceError> {
    let (node, sibling_request_id) = match root.name.as_str() {
        // <Error><Code>..</Code></Error>
        "Error" => (root, None),
        // <Errors><Error>..</Error></Errors>
        "Errors" => (root.child("Error")?, None),
        // <Response><Errors><Error>..</Error></Errors><RequestID>..</RequestID></Response>
        "Response" => (
            root.child("Errors")?.child("Error")?,
            root.child_text("RequestID")
                .or_else(|| root.child_text("RequestId")),
        ),
        // <SomeException><Message>..</Message></SomeException>
        _ => {
            return match root.children.as_slice() {
                [only] if only.name == "Message" => Some(ServiceError {
                    code: root.name.clone(),
                    message: only.text.clone(),
                    request_id: request_id_from_headers(headers),
                    resource: None,
                }),
                _ => None,
            };
        }
    };

    let code = node.child_text("Code")?;
    let request_id = node
        .child_text("RequestId")
        .or_else(|| node.child_text("RequestID"))
        .or(sibling_request_id)
        .map(str::to_string)
        .or_else(|| request_id_from_headers(headers));

    Some(ServiceError {
        code: code.to_string(),
        message: node.child_text("Message").unwrap_or_default().to_string(),
        request_id,
        resource: node
            .child_text("Resource")
            .or_else(|| node.child_text("HostId"))
            .map(str::to_string),
    })
}

fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_AMZN_REQUEST_ID)
        .or_else(|| headers.get(X_AMZ_REQUEST_ID))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
