//! Sources for previous transactions
//!
//! Verification needs the outputs an input spends. Where those come from
//! (a node, a block explorer, a fixture) is up to the caller; this module
//! defines the seam plus an in-memory source and a caching wrapper.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use log::debug;

use crate::transaction::Tx;
use crate::types::*;

/// Resolves transaction ids to parsed transactions.
///
/// Implementations may be called from several verifications at once and
/// must synchronize any internal state themselves.
pub trait TxProvider {
    fn fetch(&self, tx_id: &Hash, network: Network) -> anyhow::Result<Tx>;
}

impl<P: TxProvider + ?Sized> TxProvider for &P {
    fn fetch(&self, tx_id: &Hash, network: Network) -> anyhow::Result<Tx> {
        (**self).fetch(tx_id, network)
    }
}

/// Fixed set of transactions held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryTxProvider {
    txs: HashMap<Hash, Tx>,
}

impl MemoryTxProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `tx` under its own hash
    pub fn insert(&mut self, tx: Tx) {
        self.txs.insert(tx.hash(), tx);
    }

    /// Stores `tx` under an explicit id, for fixtures that only carry the
    /// outputs of a transaction
    pub fn insert_with_id(&mut self, tx_id: Hash, tx: Tx) {
        self.txs.insert(tx_id, tx);
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}

impl TxProvider for MemoryTxProvider {
    fn fetch(&self, tx_id: &Hash, network: Network) -> anyhow::Result<Tx> {
        match self.txs.get(tx_id) {
            Some(tx) if tx.network == network => Ok(tx.clone()),
            Some(_) => Err(anyhow!(
                "transaction {} is not on {:?}",
                hex::encode(tx_id),
                network
            )),
            None => Err(anyhow!("transaction {} not found", hex::encode(tx_id))),
        }
    }
}

/// Remembers every transaction fetched through an inner provider
#[derive(Debug)]
pub struct CachingTxProvider<P> {
    inner: P,
    cache: Mutex<HashMap<(Hash, Network), Tx>>,
}

impl<P: TxProvider> CachingTxProvider<P> {
    pub fn new(inner: P) -> Self {
        CachingTxProvider {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn into_inner(self) -> P {
        self.inner
    }
}

impl<P: TxProvider> TxProvider for CachingTxProvider<P> {
    fn fetch(&self, tx_id: &Hash, network: Network) -> anyhow::Result<Tx> {
        let key = (*tx_id, network);
        {
            let cache = self
                .cache
                .lock()
                .map_err(|_| anyhow!("transaction cache lock poisoned"))?;
            if let Some(tx) = cache.get(&key) {
                debug!("cache hit for {}", hex::encode(tx_id));
                return Ok(tx.clone());
            }
        }

        // Fetch without holding the lock; a concurrent miss on the same id
        // just stores an identical value.
        debug!("cache miss for {}", hex::encode(tx_id));
        let tx = self.inner.fetch(tx_id, network)?;
        self.cache
            .lock()
            .map_err(|_| anyhow!("transaction cache lock poisoned"))?
            .insert(key, tx.clone());
        Ok(tx)
    }
}
