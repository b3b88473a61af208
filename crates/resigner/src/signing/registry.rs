use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use hmac::digest::Digest;
use hmac::digest::core_api::BlockSizeUser;
use hmac::{Mac, SimpleHmac};
use md2::Md2;
use md4::Md4;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use super::provider::{Capability, DigestProvider};

pub type DigestFn = fn(Option<&[u8]>, &[u8]) -> Result<Vec<u8>>;

struct Entry {
    capability: Capability,
    digest: DigestFn,
}

/// Name-keyed table of digest capabilities.
///
/// Every entry pairs a [`Capability`] with the function that computes it,
/// so dispatch is a single map lookup instead of a chain of name checks.
pub struct Registry {
    entries: BTreeMap<&'static str, Entry>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Hashes and HMACs backed by the RustCrypto crates.
    pub fn rust_crypto() -> Self {
        let mut registry = Self::empty();

        registry.register_hash::<Md2>("md2");
        registry.register_hash::<Md4>("md4");
        registry.register_hash::<Md5>("md5");
        registry.register_hash::<Sha1>("sha1");
        registry.register_hash::<Sha256>("sha256");
        registry.register_hash::<Sha384>("sha384");
        registry.register_hash::<Sha512>("sha512");

        registry.register_hmac::<Md2>("hmac<md2>");
        registry.register_hmac::<Md4>("hmac<md4>");
        registry.register_hmac::<Md5>("hmac<md5>");
        registry.register_hmac::<Sha1>("hmac<sha1>");
        registry.register_hmac::<Sha256>("hmac<sha256>");
        registry.register_hmac::<Sha384>("hmac<sha384>");
        registry.register_hmac::<Sha512>("hmac<sha512>");

        registry
    }

    /// Register (or replace) an algorithm.
    pub fn register(&mut self, capability: Capability, digest: DigestFn) {
        self.entries.insert(capability.name, Entry { capability, digest });
    }

    fn register_hash<D: Digest>(&mut self, name: &'static str) {
        self.register(
            Capability {
                name,
                digest_size: <D as Digest>::output_size(),
                keyed: false,
            },
            hash_digest::<D>,
        );
    }

    fn register_hmac<D: Digest + BlockSizeUser>(&mut self, name: &'static str) {
        self.register(
            Capability {
                name,
                digest_size: <D as Digest>::output_size(),
                keyed: true,
            },
            hmac_digest::<D>,
        );
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::rust_crypto()
    }
}

impl DigestProvider for Registry {
    fn capability(&self, algorithm: &str) -> Option<Capability> {
        self.entries.get(algorithm).map(|entry| entry.capability)
    }

    fn compute_digest(&self, algorithm: &str, key: Option<&[u8]>, input: &[u8]) -> Result<Vec<u8>> {
        let entry = self
            .entries
            .get(algorithm)
            .ok_or_else(|| anyhow!("no digest registered under {algorithm:?}"))?;
        (entry.digest)(key, input)
    }
}

fn hash_digest<D: Digest>(_key: Option<&[u8]>, input: &[u8]) -> Result<Vec<u8>> {
    Ok(D::digest(input).to_vec())
}

fn hmac_digest<D: Digest + BlockSizeUser>(key: Option<&[u8]>, input: &[u8]) -> Result<Vec<u8>> {
    let key = key.context("HMAC stage has no key")?;
    let mut mac = <SimpleHmac<D> as Mac>::new_from_slice(key)
        .map_err(|e| anyhow!("invalid HMAC key: {e}"))?;
    Mac::update(&mut mac, input);
    Ok(mac.finalize().into_bytes().to_vec())
}
