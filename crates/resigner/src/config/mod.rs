//! Signing configuration model.
//!
//! A [`SigningConfig`] is produced once by the [`ConfigLoader`] and is
//! read-only afterwards. Parse-parameter values discovered while scanning a
//! message live in the scanner's output, not here.

mod loader;
mod template;

use std::fmt;

use crate::encoding::OutputEncoding;
use crate::error::ResignError;

pub use loader::ConfigLoader;
pub use template::{Family, Template, TemplateRef};

/// Parse-parameter identifier meaning "the rest of the message body".
pub const BODY_SENTINEL: &str = "[BCTt:message_body]";

/// A named value that can be referenced from the final-string template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameter {
    /// For parse parameters, the marker searched for in the message.
    pub identifier: String,
    /// Raw bytes; values copied out of a message need not be UTF-8.
    pub value: Vec<u8>,
}

impl Parameter {
    pub fn new(identifier: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
        }
    }

    /// A parse parameter whose value is not known yet.
    pub fn marker(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Vec::new())
    }

    pub fn is_body_sentinel(&self) -> bool {
        self.identifier == BODY_SENTINEL
    }
}

/// One stage of the digest chain.
#[derive(Clone, PartialEq, Eq)]
pub struct AlgorithmSpec {
    /// Registry name, e.g. `sha256` or `hmac<sha1>`.
    pub name: String,
    /// MAC key, written after `*` in the directive.
    pub key: Option<Vec<u8>>,
    pub encoding: OutputEncoding,
}

impl AlgorithmSpec {
    /// Parse the value of an `algorithm:` directive: `name[*key][:encoding]`.
    ///
    /// Only the first `:` separates the encoding, so keys cannot contain one.
    pub fn parse(value: &str) -> Result<Self, ResignError> {
        let (name, encoding) = match value.split_once(':') {
            Some((name, encoding)) if !encoding.trim().is_empty() => (name, encoding.trim().parse::<OutputEncoding>()?),
            Some((name, _)) => (name, OutputEncoding::None),
            None => (value, OutputEncoding::None),
        };

        let (name, key) = match name.split_once('*') {
            Some((name, key)) => (name, Some(key.as_bytes().to_vec())),
            None => (name, None),
        };

        Ok(Self {
            name: name.trim().to_string(),
            key,
            encoding,
        })
    }
}

// Keys stay out of logs.
impl fmt::Debug for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmSpec")
            .field("name", &self.name)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl fmt::Display for AlgorithmSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.encoding)
    }
}

#[derive(Debug, Clone)]
pub struct SigningConfig {
    algorithms: Vec<AlgorithmSpec>,
    signature_marker: String,
    parse_parameters: Vec<Parameter>,
    post_parse_parameters: Vec<Parameter>,
    template: Template,
}

impl SigningConfig {
    pub fn algorithms(&self) -> &[AlgorithmSpec] {
        &self.algorithms
    }

    pub fn signature_marker(&self) -> &str {
        &self.signature_marker
    }

    pub fn parse_parameters(&self) -> &[Parameter] {
        &self.parse_parameters
    }

    pub fn post_parse_parameters(&self) -> &[Parameter] {
        &self.post_parse_parameters
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}
