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

use crate::common::{context, write_aws_file, Recorded, ScriptedHttpSend, ROLE_LIST_URL};
use awsfetch_aws_v4::{ClientBuilder, CredentialOrigin, FetchRequest, ServiceError};
use awsfetch_core::ErrorKind;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const EC2: &str = "https://ec2.us-east-1.amazonaws.com";

const AUTH_FAILURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Response><Errors><Error><Code>AuthFailure</Code><Message>AWS was not able to validate the provided access credentials</Message></Error></Errors><RequestID>59dbff89-35bd-4eac-99ed-be587EXAMPLE</RequestID></Response>"#;

const DESCRIBE_REGIONS: &str =
    r#"<DescribeRegionsResponse><regionInfo/></DescribeRegionsResponse>"#;

const ENV_KEYS: [(&str, &str); 2] = [
    ("AWS_ACCESS_KEY_ID", "env-ak"),
    ("AWS_SECRET_ACCESS_KEY", "env-sk"),
];

fn describe_regions() -> FetchRequest {
    FetchRequest::get("/?Action=DescribeRegions&Version=2016-11-15")
}

/// Assert `req` was signed with the instance role credential `access_key_id`.
fn assert_signed_with(req: &Recorded, access_key_id: &str) {
    let authorization = req.header("authorization").unwrap_or_default();
    assert!(
        authorization.contains(&format!("Credential={access_key_id}/")),
        "{authorization}"
    );
    assert_eq!(
        req.header("x-amz-security-token"),
        Some(format!("token-{access_key_id}").as_str())
    );
}

#[tokio::test]
async fn test_fetch_signs_and_sends() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.respond(EC2, 200, "text/xml", DESCRIBE_REGIONS);
    let ctx = context(home.path(), &ENV_KEYS, &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    assert_eq!(client.provider().origin(), CredentialOrigin::Environment);

    let resp = client.fetch(describe_regions()).await?;
    assert_eq!(resp.status(), 200);
    assert_eq!(&resp.body()[..], DESCRIBE_REGIONS.as_bytes());

    let requests = http.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, http::Method::GET);
    assert!(req.body.is_empty());
    assert_eq!(
        req.uri,
        format!("{EC2}/?Action=DescribeRegions&Version=2016-11-15")
    );
    assert_eq!(req.header("host"), Some("ec2.us-east-1.amazonaws.com"));
    assert!(req
        .header("authorization")
        .is_some_and(|v| v.starts_with("AWS4-HMAC-SHA256 Credential=env-ak/")));
    assert_eq!(req.timeout, Some(Duration::from_secs(30)));
    Ok(())
}

#[tokio::test]
async fn test_fetch_with_endpoint_override() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.respond("http://localhost:4566", 200, "application/x-amz-json-1.0", "{}");
    let ctx = context(home.path(), &ENV_KEYS, &http);

    let client = ClientBuilder::new("dynamodb")
        .with_region("us-west-2")
        .with_endpoint("http://localhost:4566")
        .build(ctx)
        .await?;
    let req = FetchRequest::post("/")
        .with_header("X-Amz-Target", "DynamoDB_20120810.ListTables")?
        .with_header("Content-Type", "application/x-amz-json-1.0")?
        .with_body("{}");
    client.fetch(req).await?;

    let requests = http.requests();
    assert_eq!(requests[0].method, http::Method::POST);
    assert_eq!(requests[0].uri, "http://localhost:4566/");
    assert_eq!(&requests[0].body[..], b"{}");
    assert_eq!(requests[0].header("host"), Some("localhost:4566"));
    assert!(requests[0]
        .header("authorization")
        .is_some_and(|v| v.contains("/us-west-2/dynamodb/aws4_request")));
    Ok(())
}

#[tokio::test]
async fn test_retry_once_after_refresh() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.instance_role("first-ak").role_credentials("second-ak");
    http.respond(EC2, 401, "text/xml", AUTH_FAILURE)
        .respond(EC2, 200, "text/xml", DESCRIBE_REGIONS);
    let ctx = context(home.path(), &[], &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    assert_eq!(client.provider().origin(), CredentialOrigin::Dynamic);

    let resp = client.fetch(describe_regions()).await?;
    assert_eq!(resp.status(), 200);

    // Initial fetch plus one refresh, two metadata calls each.
    assert_eq!(http.requests_to(ROLE_LIST_URL).len(), 4);
    let attempts = http.requests_to(EC2);
    assert_eq!(attempts.len(), 2);
    assert_signed_with(&attempts[0], "first-ak");
    assert_signed_with(&attempts[1], "second-ak");
    assert_eq!(client.provider().credential().access_key_id, "second-ak");
    Ok(())
}

#[tokio::test]
async fn test_retry_at_most_once() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.instance_role("first-ak").role_credentials("second-ak");
    http.respond(EC2, 401, "text/xml", AUTH_FAILURE);
    let ctx = context(home.path(), &[], &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    let err = client
        .fetch(describe_regions())
        .await
        .expect_err("rejected credentials must fail");

    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.context_value("status"), Some("401"));
    let service_error = ServiceError::from_error(&err).expect("service error must be carried");
    assert_eq!(service_error.code, "AuthFailure");
    assert_eq!(
        service_error.request_id.as_deref(),
        Some("59dbff89-35bd-4eac-99ed-be587EXAMPLE")
    );

    let attempts = http.requests_to(EC2);
    assert_eq!(attempts.len(), 2);
    assert_signed_with(&attempts[0], "first-ak");
    assert_signed_with(&attempts[1], "second-ak");
    assert_eq!(http.requests_to(ROLE_LIST_URL).len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_static_credentials_are_not_retried() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.respond(
        "https://dynamodb.us-east-1.amazonaws.com",
        400,
        "application/x-amz-json-1.0",
        r#"{"__type":"com.amazonaws.dynamodb.v20120810#MissingAuthenticationTokenException","message":"Missing Authentication Token"}"#,
    );
    let ctx = context(home.path(), &ENV_KEYS, &http);

    let client = ClientBuilder::new("dynamodb")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    let err = client
        .fetch(FetchRequest::post("/").with_body("{}"))
        .await
        .expect_err("rejected credentials must fail");

    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(
        err.context_value("code"),
        Some("MissingAuthenticationTokenException")
    );
    assert_eq!(http.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_other_service_errors_are_not_retried() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.instance_role("imds-ak");
    http.respond(
        EC2,
        400,
        "text/xml",
        "<Response><Errors><Error><Code>InvalidParameterValue</Code><Message>bad filter</Message></Error></Errors><RequestID>req-1</RequestID></Response>",
    );
    let ctx = context(home.path(), &[], &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    let err = client.fetch(describe_regions()).await.expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.context_value("code"), Some("InvalidParameterValue"));
    assert_eq!(http.requests_to(EC2).len(), 1);
    assert_eq!(http.requests_to(ROLE_LIST_URL).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_transport_error_is_not_retried() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.instance_role("imds-ak");
    http.fail(EC2, "connection reset by peer");
    let ctx = context(home.path(), &[], &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    let err = client.fetch(describe_regions()).await.expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(http.requests_to(EC2).len(), 1);
    assert_eq!(http.requests_to(ROLE_LIST_URL).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_unparsable_error_body() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.respond(EC2, 503, "text/plain", "Service Unavailable");
    let ctx = context(home.path(), &ENV_KEYS, &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    let err = client.fetch(describe_regions()).await.expect_err("must fail");

    assert_eq!(err.kind(), ErrorKind::HttpStatus);
    assert_eq!(err.context_value("status"), Some("503"));
    assert!(ServiceError::from_error(&err).is_none());
    Ok(())
}

#[tokio::test]
async fn test_build_resolves_region_from_config_file() -> anyhow::Result<()> {
    let home = tempdir()?;
    write_aws_file(home.path(), "config", "[default]\nregion=us-west-2\n");
    let http = ScriptedHttpSend::default();
    let ctx = context(home.path(), &ENV_KEYS, &http);

    let client = ClientBuilder::new("sqs").build(ctx).await?;
    assert_eq!(client.region(), "us-west-2");
    assert_eq!(client.profile(), "default");
    assert_eq!(client.endpoint().host, "sqs.us-west-2.amazonaws.com");
    assert!(http.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_build_with_unknown_profile() -> anyhow::Result<()> {
    let home = tempdir()?;
    write_aws_file(
        home.path(),
        "credentials",
        "[default]\naws_access_key_id = ak\naws_secret_access_key = sk\n",
    );
    let ctx = context(home.path(), &[], &ScriptedHttpSend::default());

    let err = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .with_profile("staging")
        .build(ctx)
        .await
        .expect_err("unknown profile must fail");

    assert_eq!(err.kind(), ErrorKind::ProfileNotFound);
    assert_eq!(err.context_value("profile"), Some("staging"));
    let path = err.context_value("path").expect("path must be reported");
    assert!(path.ends_with("credentials"), "{path}");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_fetch_shares_refresh() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.instance_role("imds-ak");
    http.respond(EC2, 200, "text/xml", DESCRIBE_REGIONS);
    let ctx = context(home.path(), &[], &http);

    let client = Arc::new(
        ClientBuilder::new("ec2")
            .with_region("us-east-1")
            .build(ctx)
            .await?,
    );

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = Arc::clone(&client);
        tasks.push(tokio::spawn(
            async move { client.fetch(describe_regions()).await },
        ));
    }
    for task in tasks {
        task.await??;
    }

    assert_eq!(http.requests_to(EC2).len(), 8);
    assert_eq!(http.requests_to(ROLE_LIST_URL).len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_close_releases_transport() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    let ctx = context(home.path(), &ENV_KEYS, &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build(ctx)
        .await?;
    assert_eq!(http.handles(), 2);

    client.close();
    assert_eq!(http.handles(), 1);
    Ok(())
}

#[cfg(feature = "blocking")]
#[test]
fn test_blocking_client_retries_once() -> anyhow::Result<()> {
    let home = tempdir()?;
    let http = ScriptedHttpSend::default();
    http.instance_role("first-ak").role_credentials("second-ak");
    http.respond(EC2, 401, "text/xml", AUTH_FAILURE)
        .respond(EC2, 200, "text/xml", DESCRIBE_REGIONS);
    let ctx = context(home.path(), &[], &http);

    let client = ClientBuilder::new("ec2")
        .with_region("us-east-1")
        .build_blocking(ctx)?;
    assert_eq!(client.region(), "us-east-1");

    let resp = client.fetch(describe_regions())?;
    assert_eq!(resp.status(), 200);
    let attempts = http.requests_to(EC2);
    assert_eq!(attempts.len(), 2);
    assert_signed_with(&attempts[1], "second-ak");
    assert_eq!(http.requests_to(ROLE_LIST_URL).len(), 4);

    client.close();
    assert_eq!(http.handles(), 1);
    Ok(())
}
