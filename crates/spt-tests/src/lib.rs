//! Scenario and property test suite for the SPT asset index.
//!
//! Integration tests live under `tests/`; shared builders for blocks,
//! payload scripts, and seeded stores live in [`helpers`].

pub mod helpers;
