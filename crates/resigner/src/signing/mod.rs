mod provider;
mod registry;
mod chain;

pub use provider::{Capability, DigestProvider};
pub use registry::{DigestFn, Registry};
pub use chain::DigestChain;
