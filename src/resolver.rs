//! Previous-transaction resolution.
//!
//! Computing a transaction's fee, or a legacy/BIP143 sighash for a given
//! input, requires looking up the transaction an input spends from. This
//! crate has no network or storage layer of its own, so that lookup is an
//! injected capability: implement [`PrevTxProvider`] against whatever
//! backend a caller has (an RPC client, a local block index, a test
//! fixture) and hand it to [`crate::tx::Tx`] methods that need it.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::ResolverError;
use crate::tx::Tx;

/// Looks up a previous transaction by its txid.
pub trait PrevTxProvider {
    /// Fetches the transaction identified by `txid` (32 bytes in display
    /// / big-endian order, matching [`Tx::txid`] and
    /// `crate::tx::TxIn::prev_txid`).
    ///
    /// `testnet` selects which network to query; `fresh` asks the
    /// provider to bypass any cache of its own and hit the underlying
    /// source, which matters when a caller needs to observe a
    /// just-broadcast transaction rather than a stale cached miss.
    fn fetch(&self, txid: &[u8; 32], testnet: bool, fresh: bool) -> Result<Tx, ResolverError>;
}

/// Blanket impl so a plain closure can stand in for a [`PrevTxProvider`]
/// without a wrapper type.
impl<F> PrevTxProvider for F
where
    F: Fn(&[u8; 32], bool, bool) -> Result<Tx, ResolverError>,
{
    fn fetch(&self, txid: &[u8; 32], testnet: bool, fresh: bool) -> Result<Tx, ResolverError> {
        self(txid, testnet, fresh)
    }
}

/// An in-memory [`PrevTxProvider`] that wraps an inner resolver behind a
/// synchronized cache: a `fresh = false` lookup is served from the cache
/// when present, and any lookup that misses the cache (or explicitly asks
/// for `fresh = true`) falls through to the inner resolver, whose result
/// is cached for next time.
pub struct CachingResolver {
    inner: Box<dyn PrevTxProvider + Send + Sync>,
    cache: Mutex<HashMap<[u8; 32], Tx>>,
}

impl CachingResolver {
    /// Wraps `inner`, consulting it on a cache miss or a `fresh = true`
    /// request.
    pub fn new(inner: impl PrevTxProvider + Send + Sync + 'static) -> Self {
        CachingResolver {
            inner: Box::new(inner),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Wraps an inner resolver that always fails, for callers that only
    /// ever want to serve previously [`CachingResolver::insert`]ed
    /// transactions and treat anything else as missing.
    pub fn without_inner() -> Self {
        Self::new(|txid: &[u8; 32], _testnet: bool, _fresh: bool| {
            Err(ResolverError(format!("transaction {} not cached", hex_txid(txid))))
        })
    }

    /// Seeds the cache directly, bypassing the inner resolver.
    pub fn insert(&self, txid: [u8; 32], tx: Tx) {
        let mut cache = self.cache.lock().expect("resolver cache mutex poisoned");
        cache.insert(txid, tx);
    }

    /// Returns the number of cached transactions.
    pub fn len(&self) -> usize {
        self.cache.lock().expect("resolver cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PrevTxProvider for CachingResolver {
    fn fetch(&self, txid: &[u8; 32], testnet: bool, fresh: bool) -> Result<Tx, ResolverError> {
        if !fresh {
            let cache = self.cache.lock().expect("resolver cache mutex poisoned");
            if let Some(tx) = cache.get(txid) {
                return Ok(tx.clone());
            }
        }

        let tx = self.inner.fetch(txid, testnet, fresh)?;
        let mut cache = self.cache.lock().expect("resolver cache mutex poisoned");
        cache.insert(*txid, tx.clone());
        Ok(tx)
    }
}

fn hex_txid(txid: &[u8; 32]) -> String {
    // txid is already stored in display (big-endian) order.
    txid.iter().map(|b| format!("{b:02x}")).collect()
}
