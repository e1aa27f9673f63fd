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

use anyhow::Result;
use awsfetch::aws::{ClientBuilder, FetchRequest};

fn main() -> Result<()> {
    env_logger::init();

    let client = ClientBuilder::new("dynamodb")
        .with_region("us-east-1")
        .build_blocking(awsfetch::default_context())?;

    let req = FetchRequest::post("/")
        .with_header("Content-Type", "application/x-amz-json-1.0")?
        .with_header("X-Amz-Target", "DynamoDB_20120810.ListTables")?
        .with_body("{}");
    let resp = client.fetch(req)?;
    println!("{}", String::from_utf8_lossy(resp.body()));

    client.close();
    Ok(())
}
