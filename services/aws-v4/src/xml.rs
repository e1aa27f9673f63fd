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

use awsfetch_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// XmlNode is a generic element tree decoded from an XML document.
///
/// Namespace prefixes are dropped from element names, surrounding
/// whitespace is trimmed from text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Local name of the element.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content of this element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse `input` into the tree of its root element.
    ///
    /// Fails with [`ErrorKind::ResponseInvalid`](awsfetch_core::ErrorKind::ResponseInvalid)
    /// if the input is not a single well formed element.
    pub fn parse(input: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;

        loop {
            match reader.read_event().map_err(parse_error)? {
                Event::Start(e) => stack.push(node_from_start(&e)?),
                Event::Empty(e) => {
                    let node = node_from_start(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| Error::response_invalid("unexpected closing tag"))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(parse_error)?;
                    match stack.last_mut() {
                        Some(node) => node.text.push_str(&text),
                        None => {
                            return Err(Error::response_invalid("text outside of root element"))
                        }
                    }
                }
                Event::CData(t) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no data.
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::response_invalid("unclosed element in xml document"));
        }
        root.ok_or_else(|| Error::response_invalid("xml document has no root element"))
    }

    /// The first child element named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The text of the first child named `name`, if it's not empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.as_str())
            .filter(|v| !v.is_empty())
    }

    /// The value of attribute `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn node_from_start(e: &BytesStart<'_>) -> Result<XmlNode> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(parse_error)?;
        let value = attr.unescape_value().map_err(parse_error)?;
        attributes.push((
            String::from_utf8_lossy(attr.key.as_ref()).to_string(),
            value.to_string(),
        ));
    }

    Ok(XmlNode {
        name: String::from_utf8_lossy(e.local_name().as_ref()).to_string(),
        attributes,
        ..Default::default()
    })
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(Error::response_invalid("xml document has multiple roots")),
    }
    Ok(())
}

fn parse_error(err: impl std::error::Error + Send + Sync + 'static) -> Error {
    Error::response_invalid("failed to parse xml").with_source(anyhow::Error::new(err))
}
