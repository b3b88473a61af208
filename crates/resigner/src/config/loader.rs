use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ResignError;
use crate::signing::DigestProvider;

use super::{AlgorithmSpec, Parameter, SigningConfig, Template};

const ALGORITHM: &str = "algorithm:";
const SIGNATURE_PARAMETER: &str = "signatureParameter:";
const PARSE_PARAMETER: &str = "parseParameter:";
const POST_PARSE_PARAMETER: &str = "postParseParameter:";
const DO_FINAL_STRING: &str = "doFinalString:";

/// Builds a [`SigningConfig`] from directive text.
///
/// Algorithm names are checked against the provider as they are read, so an
/// unsupported name fails the load before any message is touched.
pub struct ConfigLoader<'a> {
    provider: &'a dyn DigestProvider,
}

#[derive(Default)]
struct Draft {
    algorithms: Vec<AlgorithmSpec>,
    signature_marker: String,
    parse_parameters: Vec<Parameter>,
    post_parse_parameters: Vec<Parameter>,
    template: String,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(provider: &'a dyn DigestProvider) -> Self {
        Self { provider }
    }

    pub fn load(&self, path: &Path) -> Result<SigningConfig, ResignError> {
        let text = fs::read_to_string(path).map_err(|source| ResignError::ConfigNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading signing configuration");
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<SigningConfig, ResignError> {
        let mut draft = Draft::default();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim_end_matches(['\r', '\n']);
            self.apply(&mut draft, line.trim_start(), number + 1)?;
        }
        draft.finish()
    }

    fn apply(&self, draft: &mut Draft, line: &str, number: usize) -> Result<(), ResignError> {
        if let Some(value) = line.strip_prefix(ALGORITHM) {
            let spec = AlgorithmSpec::parse(value)?;
            self.check_supported(&spec)?;
            debug!(line = number, stage = draft.algorithms.len(), algorithm = %spec, "algorithm stage");
            draft.algorithms.push(spec);
        } else if let Some(value) = line.strip_prefix(SIGNATURE_PARAMETER) {
            draft.signature_marker = value.to_string();
        } else if let Some(value) = line.strip_prefix(PARSE_PARAMETER) {
            debug!(line = number, marker = value, "parse parameter");
            draft.parse_parameters.push(Parameter::marker(value));
        } else if let Some(value) = line.strip_prefix(POST_PARSE_PARAMETER) {
            match value.split_once(':') {
                Some((identifier, value)) if !identifier.is_empty() && !value.is_empty() => {
                    debug!(line = number, identifier, "post-parse parameter");
                    draft.post_parse_parameters.push(Parameter::new(identifier, value));
                }
                _ => warn!(line = number, "skipping postParseParameter without identifier:value"),
            }
        } else if let Some(value) = line.strip_prefix(DO_FINAL_STRING) {
            draft.template = value.to_string();
        } else if !line.is_empty() {
            debug!(line = number, "ignoring non-directive line");
        }
        Ok(())
    }

    fn check_supported(&self, spec: &AlgorithmSpec) -> Result<(), ResignError> {
        let capability = self
            .provider
            .capability(&spec.name)
            .ok_or_else(|| ResignError::AlgorithmUnsupported(spec.name.clone()))?;

        match (capability.keyed, spec.key.is_some()) {
            (true, false) => Err(ResignError::AlgorithmUnsupported(format!(
                "{} requires a key (write it as {}*<key>)",
                spec.name, spec.name
            ))),
            (false, true) => Err(ResignError::AlgorithmUnsupported(format!(
                "{} does not take a key",
                spec.name
            ))),
            _ => Ok(()),
        }
    }
}

impl Draft {
    fn finish(self) -> Result<SigningConfig, ResignError> {
        let mut missing = Vec::new();
        if self.algorithms.is_empty() {
            missing.push("no algorithm directive");
        }
        if self.parse_parameters.is_empty() && self.post_parse_parameters.is_empty() {
            missing.push("no parseParameter or postParseParameter directive");
        }
        if self.template.is_empty() {
            missing.push("doFinalString is missing or empty");
        }
        if self.signature_marker.is_empty() {
            missing.push("signatureParameter is missing or empty");
        }
        if !missing.is_empty() {
            return Err(ResignError::ConfigInvalid(missing.join("; ")));
        }

        let template = Template::parse(&self.template)?;

        Ok(SigningConfig {
            algorithms: self.algorithms,
            signature_marker: self.signature_marker,
            parse_parameters: self.parse_parameters,
            post_parse_parameters: self.post_parse_parameters,
            template,
        })
    }
}
