#![deny(missing_docs)]
#![doc = "Core error, seeding and feature-set types shared by the TFA analysis crates."]

pub mod errors;
pub mod features;
pub mod rng;

pub use errors::{ErrorInfo, TfaError};
pub use features::FeatureSet;
pub use rng::{derive_substream_seed, RngHandle};
