//! # spt-store — Persistence and runtime setup for the SPT asset index.
//!
//! - [`storage::RocksBalanceStore`] — RocksDB-backed [`BalanceStore`](spt_core::traits::BalanceStore)
//! - [`config::IndexerConfig`] — layered file + environment configuration
//! - [`config::init_logging`] — tracing subscriber setup

pub mod config;
pub mod storage;

pub use config::IndexerConfig;
pub use storage::RocksBalanceStore;
