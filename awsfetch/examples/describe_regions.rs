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
use awsfetch::aws::{ClientBuilder, FetchRequest, ServiceError};
use awsfetch::ErrorKind;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let client = ClientBuilder::new("ec2")
        .build(awsfetch::default_context())
        .await?;
    println!(
        "using region {} with {} credentials",
        client.region(),
        client.provider().origin()
    );

    match client
        .fetch(FetchRequest::get("/?Action=DescribeRegions&Version=2016-11-15"))
        .await
    {
        Ok(resp) => println!("{}", String::from_utf8_lossy(resp.body())),
        Err(err) if err.kind() == ErrorKind::Service => {
            if let Some(service_error) = ServiceError::from_error(&err) {
                eprintln!("service rejected request: {service_error}");
            }
        }
        Err(err) => return Err(err.into()),
    }

    client.close();
    Ok(())
}
