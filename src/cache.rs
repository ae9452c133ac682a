// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Debounce cache for last-known switch states.
//!
//! The cache remembers, per (device, button), the state most recently
//! observed or commanded, long enough to decide whether a candidate still
//! needs a command during fan-out. It is advisory only: the physical device
//! is the ground truth, and an entry that has expired reads as "unknown",
//! which compares unequal to every candidate target and forces a republish
//! rather than trusting stale data.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::group::SwitchKey;

/// A cached state value with its expiry deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// TTL-bound store of last-known states, keyed by switch identity.
///
/// Reads at or after an entry's expiry behave as if the entry were absent;
/// the entry is removed on that read. Thread-safe via interior mutability.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use switchsync_lib::cache::StateCache;
/// use switchsync_lib::group::SwitchKey;
/// use switchsync_lib::types::ButtonName;
///
/// let cache = StateCache::new();
/// let key = SwitchKey::new("0x1234", ButtonName::unnamed());
///
/// cache.set(key.clone(), "ON", Duration::from_secs(2));
/// assert_eq!(cache.get(&key), Some("ON".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct StateCache {
    entries: Mutex<HashMap<SwitchKey, CacheEntry>>,
}

impl StateCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached state for a key, or `None` when absent or expired.
    ///
    /// An expired entry is removed by this read.
    #[must_use]
    pub fn get(&self, key: &SwitchKey) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                let _ = entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores a state for a key, valid for `ttl` from now.
    ///
    /// A later write replaces the previous value and restarts the clock; an
    /// entry never outlives its last write by more than the TTL.
    pub fn set(&self, key: SwitchKey, value: impl Into<String>, ttl: Duration) {
        let entry = CacheEntry {
            value: value.into(),
            expires_at: Instant::now() + ttl,
        };
        let _ = self.entries.lock().insert(key, entry);
    }

    /// Returns the number of entries, counting expired ones not yet reaped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
