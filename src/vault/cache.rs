//! In-memory master-password cache and its eviction policies.
//!
//! After a vault operation validates a password hash, a copy of that
//! hash may be kept here so follow-up operations need no re-prompt.
//! The cache is a two-state machine (`NotCached` / `Cached`) whose
//! transitions are driven by the vault operations and, under the
//! expiration policy, by a background timer.
//!
//! The cache itself never spawns threads or takes locks — it lives
//! inside the vault's single mutex, and the store layer spawns the
//! expiration timer from the `TimerRequest` returned by `populate`.
//! A `generation` counter makes stale timers harmless: a timer only
//! clears the cache if no repopulation happened since it was armed.

use std::time::Duration;

use crate::crypto::hash::MasterHash;

/// When a cached password hash is purged from memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep the hash until the process exits or the cache is cleared
    /// explicitly.
    Never,
    /// Evict after the cached hash has been used more than `n` times.
    MaxUses(u32),
    /// Evict after the given duration, counted from population.
    Expiration(Duration),
}

/// Instruction to arm an eviction timer for a freshly populated cache.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimerRequest {
    pub generation: u64,
    pub ttl: Duration,
}

/// The cache state, owned exclusively by the vault's mutex.
pub(crate) struct PasswordCache {
    hash: Option<MasterHash>,
    use_count: u32,
    generation: u64,
    policy: EvictionPolicy,
    enabled: bool,
}

impl PasswordCache {
    pub fn new(enabled: bool, policy: EvictionPolicy) -> Self {
        Self {
            hash: None,
            use_count: 0,
            generation: 0,
            policy,
            enabled,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.hash.is_some()
    }

    /// A value-copy of the cached hash, if any.  Never a reference —
    /// the stored copy stays under the vault lock.
    pub fn get(&self) -> Option<MasterHash> {
        self.hash.clone()
    }

    /// Store a copy of a just-validated hash.
    ///
    /// Resets the use count and bumps the generation, invalidating any
    /// timer still pending from an earlier population.  Returns a
    /// `TimerRequest` when the policy needs a background timer armed.
    pub fn populate(&mut self, hash: &MasterHash) -> Option<TimerRequest> {
        if !self.enabled {
            return None;
        }

        self.hash = Some(hash.clone());
        self.use_count = 0;
        self.generation += 1;

        match self.policy {
            EvictionPolicy::Expiration(ttl) => Some(TimerRequest {
                generation: self.generation,
                ttl,
            }),
            _ => None,
        }
    }

    /// Record one successful use of the cached hash.
    ///
    /// Under `MaxUses(n)` the cache clears once the count exceeds `n`;
    /// the operation that pushed it over still succeeds.
    pub fn note_use(&mut self) {
        if self.hash.is_none() {
            return;
        }
        self.use_count += 1;
        if let EvictionPolicy::MaxUses(max) = self.policy {
            if self.use_count > max {
                self.clear();
            }
        }
    }

    /// Drop the cached hash.  The `MasterHash` drop impl zeroizes the
    /// digest bytes before the memory is released.
    pub fn clear(&mut self) {
        self.hash = None;
        self.use_count = 0;
    }

    /// Timer callback entry point: clear only if the cache has not
    /// been repopulated since the timer was armed.
    pub fn clear_if_generation(&mut self, generation: u64) {
        if self.generation == generation {
            self.clear();
        }
    }

    /// Turn caching on or off.  Disabling wipes the current entry.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Swap the eviction policy.  The current entry is wiped; the next
    /// validated operation repopulates under the new rules.
    pub fn set_policy(&mut self, policy: EvictionPolicy) {
        self.policy = policy;
        self.clear();
    }
}
