use crate::error::ResignError;

use super::Parameter;

const PARSE_PREFIX: &str = "parseParameter-";
const POST_PARSE_PREFIX: &str = "postParseParameter-";

/// Which parameter list a template token points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Parse,
    PostParse,
}

/// A single `parseParameter-NN` / `postParseParameter-NN` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    pub family: Family,
    pub index: usize,
    pub token: String,
}

impl TemplateRef {
    fn parse(token: &str) -> Result<Self, ResignError> {
        let (family, digits) = if let Some(digits) = token.strip_prefix(POST_PARSE_PREFIX) {
            (Family::PostParse, digits)
        } else if let Some(digits) = token.strip_prefix(PARSE_PREFIX) {
            (Family::Parse, digits)
        } else {
            return Err(ResignError::ConfigInvalid(format!(
                "doFinalString token {token:?} is neither {PARSE_PREFIX}NN nor {POST_PARSE_PREFIX}NN"
            )));
        };

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ResignError::ConfigInvalid(format!(
                "doFinalString token {token:?} has no numeric index"
            )));
        }
        let index = digits.parse().map_err(|_| {
            ResignError::ConfigInvalid(format!("doFinalString token {token:?} index is too large"))
        })?;

        Ok(Self {
            family,
            index,
            token: token.to_string(),
        })
    }
}

/// The `doFinalString` layout: dot-separated references to parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    refs: Vec<TemplateRef>,
}

impl Template {
    /// Tokenize on `.`, dropping empty tokens.
    pub fn parse(source: &str) -> Result<Self, ResignError> {
        let refs = source
            .split('.')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(TemplateRef::parse)
            .collect::<Result<_, _>>()?;

        Ok(Self {
            source: source.to_string(),
            refs,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn refs(&self) -> &[TemplateRef] {
        &self.refs
    }

    /// Concatenate the referenced values, in token order, with no separators.
    pub fn compose(&self, parse: &[Parameter], post_parse: &[Parameter]) -> Result<Vec<u8>, ResignError> {
        let mut digest_input = Vec::new();
        for reference in &self.refs {
            let family = match reference.family {
                Family::Parse => parse,
                Family::PostParse => post_parse,
            };
            let parameter = family.get(reference.index).ok_or_else(|| ResignError::IndexOutOfRange {
                token: reference.token.clone(),
            })?;
            digest_input.extend_from_slice(&parameter.value);
        }
        Ok(digest_input)
    }
}
