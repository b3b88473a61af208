/// What a provider knows about one algorithm name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Algorithm name as written in directives (e.g. "hmac<sha256>").
    pub name: &'static str,
    /// Raw digest length in bytes.
    pub digest_size: usize,
    /// Whether the algorithm is a MAC that needs key material.
    pub keyed: bool,
}

/// Trait for the digest/MAC primitives used by the signing chain.
///
/// Implementations are sync. Hashing is CPU-bound and a run handles a
/// single message.
pub trait DigestProvider: Send + Sync {
    /// Look up an algorithm by name. `None` means unsupported.
    fn capability(&self, algorithm: &str) -> Option<Capability>;

    /// Compute the raw digest (or MAC, when `key` is given) of `input`.
    fn compute_digest(
        &self,
        algorithm: &str,
        key: Option<&[u8]>,
        input: &[u8],
    ) -> anyhow::Result<Vec<u8>>;
}
