use tracing::debug;

use crate::config::AlgorithmSpec;
use crate::error::ResignError;

use super::provider::DigestProvider;

/// Runs the configured algorithm stages back to back.
///
/// Each stage digests the *encoded* output of the previous one; the first
/// stage digests the composed digest input.
pub struct DigestChain<'a> {
    provider: &'a dyn DigestProvider,
    stages: &'a [AlgorithmSpec],
}

impl<'a> DigestChain<'a> {
    pub fn new(provider: &'a dyn DigestProvider, stages: &'a [AlgorithmSpec]) -> Self {
        Self { provider, stages }
    }

    /// Run every stage and return the final stage's encoded bytes, which are
    /// the new signature exactly as it will be spliced.
    pub fn digest(&self, input: &[u8]) -> Result<Vec<u8>, ResignError> {
        let mut current = input.to_vec();
        for (index, stage) in self.stages.iter().enumerate() {
            if self.provider.capability(&stage.name).is_none() {
                return Err(ResignError::AlgorithmUnsupported(stage.name.clone()));
            }
            let raw = self
                .provider
                .compute_digest(&stage.name, stage.key.as_deref(), &current)
                .map_err(|e| ResignError::Digest {
                    algorithm: stage.name.clone(),
                    reason: format!("{e:#}"),
                })?;
            current = stage.encoding.encode(&raw);
            debug!(stage = index, algorithm = %stage, raw_len = raw.len(), out_len = current.len(), "digest stage");
        }
        Ok(current)
    }
}
