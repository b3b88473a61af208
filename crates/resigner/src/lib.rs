pub mod config;
pub mod encoding;
pub mod error;
pub mod resign;
pub mod scanner;
pub mod signing;
pub mod splice;

pub use config::{AlgorithmSpec, ConfigLoader, Parameter, SigningConfig, BODY_SENTINEL};
pub use encoding::OutputEncoding;
pub use error::ResignError;
pub use resign::{DEFAULT_CONFIG_PATH, Resigner, RunConfig, RunReport, SignedMessage, run};
pub use scanner::{MessageScanner, ScanOutcome};
pub use signing::{Capability, DigestChain, DigestProvider, Registry};
pub use splice::{Spliced, splice_signature, write_staged};
