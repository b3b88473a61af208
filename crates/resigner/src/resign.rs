use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::config::{ConfigLoader, SigningConfig};
use crate::error::ResignError;
use crate::scanner::MessageScanner;
use crate::signing::{DigestChain, DigestProvider, Registry};
use crate::splice::{splice_signature, write_staged};

pub const DEFAULT_CONFIG_PATH: &str = "config.txt";

/// Per-run settings. Nothing here is process-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub message_path: PathBuf,
    pub config_path: PathBuf,
    /// Where the rewritten message is staged before it replaces the
    /// original. Defaults to the message's own directory.
    pub staging_dir: Option<PathBuf>,
    /// Compute the signature but leave the message alone.
    pub dry_run: bool,
}

impl RunConfig {
    pub fn new(message_path: impl Into<PathBuf>) -> Self {
        Self {
            message_path: message_path.into(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            staging_dir: None,
            dry_run: false,
        }
    }

    pub fn with_config_path(mut self, config_path: impl Into<PathBuf>) -> Self {
        self.config_path = config_path.into();
        self
    }

    pub fn with_staging_dir(mut self, staging_dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(staging_dir.into());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A message signed in memory, before anything is written.
///
/// Signatures and digest input are raw bytes; they serialize as text with
/// invalid UTF-8 replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedMessage {
    pub signature_marker: String,
    #[serde(serialize_with = "lossy_text")]
    pub old_signature: Vec<u8>,
    #[serde(serialize_with = "lossy_text")]
    pub new_signature: Vec<u8>,
    #[serde(serialize_with = "lossy_text")]
    pub digest_input: Vec<u8>,
}

impl SignedMessage {
    /// Bytes searched for in the message.
    pub fn search_bytes(&self) -> Vec<u8> {
        [self.signature_marker.as_bytes(), &self.old_signature[..]].concat()
    }

    /// Bytes that replace [`Self::search_bytes`].
    pub fn replace_bytes(&self) -> Vec<u8> {
        [self.signature_marker.as_bytes(), &self.new_signature[..]].concat()
    }
}

fn lossy_text<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    #[serde(flatten)]
    pub signed: SignedMessage,
    pub lines_rewritten: usize,
    /// Whether the message file was rewritten.
    pub spliced: bool,
}

/// Drives one run: load, scan, compose, digest, splice.
pub struct Resigner {
    provider: Arc<dyn DigestProvider>,
}

impl Default for Resigner {
    fn default() -> Self {
        Self::new(Arc::new(Registry::rust_crypto()))
    }
}

impl Resigner {
    pub fn new(provider: Arc<dyn DigestProvider>) -> Self {
        Self { provider }
    }

    pub fn load_config(&self, path: &Path) -> Result<SigningConfig, ResignError> {
        ConfigLoader::new(self.provider.as_ref()).load(path)
    }

    /// Scan, compose and digest `message` without touching any file.
    pub fn sign(&self, config: &SigningConfig, message: &[u8]) -> Result<SignedMessage, ResignError> {
        debug!(stage = "scan", "scanning message");
        let scanned = MessageScanner::new(config).scan(message);

        debug!(stage = "compose", template = config.template().source(), "composing digest input");
        let digest_input = config
            .template()
            .compose(&scanned.parse_parameters, config.post_parse_parameters())?;

        debug!(stage = "digest", stages = config.algorithms().len(), "running digest chain");
        let new_signature = DigestChain::new(self.provider.as_ref(), config.algorithms()).digest(&digest_input)?;

        Ok(SignedMessage {
            signature_marker: config.signature_marker().to_string(),
            old_signature: scanned.old_signature,
            new_signature,
            digest_input,
        })
    }

    pub fn run(&self, run: &RunConfig) -> Result<RunReport, ResignError> {
        debug!(stage = "config", path = %run.config_path.display(), "loading configuration");
        let config = self.load_config(&run.config_path)?;

        let message = read_message(&run.message_path)?;
        let signed = self.sign(&config, &message)?;

        let spliced = splice_signature(
            &message,
            signed.signature_marker.as_bytes(),
            &signed.old_signature,
            &signed.new_signature,
        );

        let search = String::from_utf8_lossy(&signed.search_bytes()).into_owned();
        let replace = String::from_utf8_lossy(&signed.replace_bytes()).into_owned();
        let changed = spliced.content != message;
        if run.dry_run {
            info!(%search, %replace, "dry run; message left unchanged");
        } else if changed {
            debug!(stage = "splice", lines = spliced.lines_rewritten, "writing signed message");
            write_staged(&run.message_path, run.staging_dir.as_deref(), &spliced.content)?;
            info!(%search, %replace, "signature replaced");
        } else {
            info!("message already carries the computed signature");
        }

        Ok(RunReport {
            signed,
            lines_rewritten: spliced.lines_rewritten,
            spliced: changed && !run.dry_run,
        })
    }
}

fn read_message(path: &Path) -> Result<Vec<u8>, ResignError> {
    fs::read(path).map_err(|source| ResignError::MessageUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Re-sign the message at `run.message_path` with the default provider.
pub fn run(run: &RunConfig) -> Result<RunReport, ResignError> {
    Resigner::default().run(run)
}
