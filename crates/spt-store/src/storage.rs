//! RocksDB-backed balance storage.
//!
//! Implements [`BalanceStore`] with two column families: `balances`, keyed
//! by raw address descriptor bytes with bincode-encoded [`AddrBalance`]
//! values, and `metadata` for store-level counters. A pass is committed as a
//! single atomic [`WriteBatch`].

use std::collections::HashMap;
use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use tracing::debug;

use spt_core::error::StoreError;
use spt_core::traits::BalanceStore;
use spt_core::types::{AddrBalance, AddressDescriptor, BalanceDetail};

// --- Column family names ---

const CF_BALANCES: &str = "balances";
const CF_METADATA: &str = "metadata";

const ALL_CFS: &[&str] = &[CF_BALANCES, CF_METADATA];

// --- Metadata keys ---

const META_COMMIT_COUNT: &[u8] = b"commit_count";

/// Persistent per-address balance records.
pub struct RocksBalanceStore {
    db: DB,
}

impl RocksBalanceStore {
    /// Open or create a database at `path`, creating missing column families.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        debug!(path = %path.as_ref().display(), "balance store opened");
        Ok(Self { db })
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(|e| StoreError::Backend(e.to_string()))
    }

    /// Number of commits applied over the lifetime of the database.
    pub fn commit_count(&self) -> Result<u64, StoreError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self
            .db
            .get_cf(cf, META_COMMIT_COUNT)
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => {
                let bytes: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Codec("invalid commit counter length".into()))?;
                Ok(u64::from_le_bytes(bytes))
            }
            None => Ok(0),
        }
    }

    /// Number of stored balance records.
    pub fn balance_count(&self) -> Result<usize, StoreError> {
        let cf = self.cf_handle(CF_BALANCES)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item.map_err(|e| StoreError::Backend(e.to_string()))?;
            count += 1;
        }
        Ok(count)
    }

    // --- Internal helpers ---

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("missing column family: {name}")))
    }

    fn encode_balance(balance: &AddrBalance) -> Result<Vec<u8>, StoreError> {
        bincode::encode_to_vec(balance, bincode::config::standard())
            .map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn decode_balance(bytes: &[u8]) -> Result<AddrBalance, StoreError> {
        let (balance, _): (AddrBalance, _) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| StoreError::Codec(e.to_string()))?;
        Ok(balance)
    }
}

impl BalanceStore for RocksBalanceStore {
    fn get_balance(
        &self,
        descriptor: &AddressDescriptor,
        detail: BalanceDetail,
    ) -> Result<Option<AddrBalance>, StoreError> {
        let cf = self.cf_handle(CF_BALANCES)?;
        let Some(bytes) = self
            .db
            .get_cf(cf, descriptor.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
        else {
            return Ok(None);
        };
        let balance = Self::decode_balance(&bytes)?;
        Ok(Some(match detail {
            BalanceDetail::Summary => balance.summary(),
            BalanceDetail::AssetsIndexed => balance,
        }))
    }

    fn commit(&mut self, balances: HashMap<AddressDescriptor, AddrBalance>) -> Result<(), StoreError> {
        let cf_balances = self.cf_handle(CF_BALANCES)?;
        let cf_meta = self.cf_handle(CF_METADATA)?;

        let mut batch = WriteBatch::default();
        let records = balances.len();
        for (descriptor, balance) in &balances {
            batch.put_cf(cf_balances, descriptor.as_bytes(), Self::encode_balance(balance)?);
        }
        let commits = self.commit_count()? + 1;
        batch.put_cf(cf_meta, META_COMMIT_COUNT, commits.to_le_bytes());

        self.db.write(batch).map_err(|e| StoreError::Backend(e.to_string()))?;
        debug!(records, commits, "balances committed");
        Ok(())
    }
}
