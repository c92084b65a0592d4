//! Single-session fragment reassembly.
//!
//! The buffer holds fragments of the current session only, sorted by ordinal
//! with no duplicates. Anything that would break that (a duplicate ordinal, a
//! transfer whose count is reached without a terminator, a fragment from a new
//! session) clears the whole buffer; nothing is partially retained.
//!
//! Malformed fragments (bad ordinal, misplaced last flag) are dropped without
//! touching the buffer.
//!
//! Stale sessions are only expired when the caller asks via
//! [`Reassembler::expire`].

use std::time::{Duration, Instant};

use bytes::{BufMut, Bytes, BytesMut};
use tracing::{debug, trace};

use crate::fragment::Fragment;

/// Reassembler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReassemblerConfig {
    /// Age after which [`Reassembler::expire`] drops an incomplete session.
    /// `None` keeps sessions until completion or reset.
    pub session_timeout: Option<Duration>,
}

/// Why buffered fragments were discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// A fragment from a different session arrived.
    SessionTakeover,
    /// The same ordinal arrived twice.
    DuplicateOrdinal,
    /// The declared count was reached but the final fragment is not flagged last.
    MissingTerminator,
    /// The session outlived `session_timeout`.
    Expired,
    /// The caller cleared the buffer.
    Cleared,
}

/// Reassembler statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReassemblerStats {
    /// Fragments pushed.
    pub fragments_received: u64,
    /// Payloads completed.
    pub payloads_completed: u64,
    /// Malformed fragments dropped without a reset.
    pub malformed_dropped: u64,
    /// Resets caused by a duplicate ordinal.
    pub duplicate_resets: u64,
    /// Incomplete sessions abandoned for a new session.
    pub session_takeovers: u64,
    /// Resets caused by a missing terminator.
    pub terminator_resets: u64,
    /// Sessions dropped by [`Reassembler::expire`].
    pub expired: u64,
}

/// Collects the fragments of one transfer at a time.
///
/// One reassembler belongs to one device or connection; it is not meant to
/// be shared.
#[derive(Debug)]
pub struct Reassembler<F: Fragment> {
    buffer: Vec<F>,
    started_at: Option<Instant>,
    config: ReassemblerConfig,
    stats: ReassemblerStats,
    last_reset: Option<ResetReason>,
}

impl<F: Fragment> Default for Reassembler<F> {
    fn default() -> Self {
        Self::new(ReassemblerConfig::default())
    }
}

impl<F: Fragment> Reassembler<F> {
    /// Create a new reassembler.
    pub fn new(config: ReassemblerConfig) -> Self {
        Self {
            buffer: Vec::new(),
            started_at: None,
            config,
            stats: ReassemblerStats::default(),
            last_reset: None,
        }
    }

    /// Push a fragment, stamping a new session with the current time.
    ///
    /// Returns the reassembled payload when this fragment completes it.
    pub fn push(&mut self, fragment: F) -> Option<Bytes> {
        self.push_at(fragment, Instant::now())
    }

    /// Push a fragment received at `now`.
    pub fn push_at(&mut self, fragment: F, now: Instant) -> Option<Bytes> {
        self.stats.fragments_received += 1;

        if !fragment.is_well_formed() {
            debug!(
                session = ?fragment.session_id(),
                ordinal = fragment.ordinal(),
                count = fragment.count(),
                last = fragment.is_last(),
                "dropping malformed fragment"
            );
            self.stats.malformed_dropped += 1;
            return None;
        }

        if let Some(current) = self.session_id() {
            if current != fragment.session_id() {
                self.reset(ResetReason::SessionTakeover);
            }
        }

        let ordinal = fragment.ordinal();
        let position = self.buffer.partition_point(|f| f.ordinal() < ordinal);
        if self
            .buffer
            .get(position)
            .is_some_and(|f| f.ordinal() == ordinal)
        {
            self.reset(ResetReason::DuplicateOrdinal);
            return None;
        }

        if self.buffer.is_empty() {
            self.started_at = Some(now);
        }
        let count = fragment.count();
        self.buffer.insert(position, fragment);
        trace!(ordinal, count, buffered = self.buffer.len(), "fragment buffered");

        if self.buffer.len() as u64 != u64::from(count) {
            return None;
        }

        if !self.buffer.last().is_some_and(|f| f.is_last()) {
            self.reset(ResetReason::MissingTerminator);
            return None;
        }

        let payload = self.concat();
        self.buffer.clear();
        self.started_at = None;
        self.stats.payloads_completed += 1;
        debug!(size = payload.len(), fragments = count, "payload reassembled");
        Some(payload)
    }

    /// Drop the current session if it is older than `session_timeout`.
    ///
    /// Returns true if fragments were discarded.
    pub fn expire(&mut self, now: Instant) -> bool {
        let (Some(timeout), Some(started)) = (self.config.session_timeout, self.started_at) else {
            return false;
        };
        if now.saturating_duration_since(started) < timeout {
            return false;
        }
        self.reset(ResetReason::Expired);
        true
    }

    /// Discard all buffered fragments.
    pub fn clear(&mut self) {
        if !self.buffer.is_empty() {
            self.reset(ResetReason::Cleared);
        }
    }

    /// Session of the buffered fragments, if any.
    pub fn session_id(&self) -> Option<F::SessionId> {
        self.buffer.first().map(|f| f.session_id())
    }

    /// Number of buffered fragments.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// When the current session received its first fragment.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Reason for the most recent reset.
    pub fn last_reset(&self) -> Option<ResetReason> {
        self.last_reset
    }

    pub fn stats(&self) -> &ReassemblerStats {
        &self.stats
    }

    /// Current reassembler configuration.
    pub fn config(&self) -> &ReassemblerConfig {
        &self.config
    }

    fn concat(&self) -> Bytes {
        let size = self.buffer.iter().map(|f| f.data().len()).sum();
        let mut out = BytesMut::with_capacity(size);
        for fragment in &self.buffer {
            out.put_slice(fragment.data());
        }
        out.freeze()
    }

    fn reset(&mut self, reason: ResetReason) {
        debug!(
            ?reason,
            session = ?self.session_id(),
            dropped = self.buffer.len(),
            "reassembly reset"
        );
        match reason {
            ResetReason::SessionTakeover => self.stats.session_takeovers += 1,
            ResetReason::DuplicateOrdinal => self.stats.duplicate_resets += 1,
            ResetReason::MissingTerminator => self.stats.terminator_resets += 1,
            ResetReason::Expired => self.stats.expired += 1,
            ResetReason::Cleared => {}
        }
        self.buffer.clear();
        self.started_at = None;
        self.last_reset = Some(reason);
    }
}
