//! Crypto asset node model.
//!
//! Defines the payloads stored in the asset graph, the descriptive vocabularies
//! they use, and the identifiers that name graph nodes.

mod asset;
mod identifiers;
mod properties;

pub use asset::*;
pub use identifiers::*;
pub use properties::*;
