//! # spt-core
//! Foundation types, collaborator traits, and codecs for the SPT asset index.

pub mod address;
pub mod balance_store;
pub mod constants;
pub mod error;
pub mod payload;
pub mod traits;
pub mod types;
