//! Fingerprinted diff request/response bookkeeping.
//!
//! Diffs are computed outside the view core, asynchronously, and may come back out of order.
//! Every request carries a [`Fingerprint`] of the buffer content it was issued for; a response is
//! only applied if its fingerprint is still the latest one requested. There are no cancel
//! tokens: issuing a newer request, or editing the buffer, is what makes older responses stale.
//!
//! Debouncing is expressed with host-supplied [`Instant`]s so it stays deterministic and testable.

use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use ahash::AHasher;

/// Default quiet period after the last edit before a diff is requested.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Content-derived token identifying one buffer snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Hash a line array. Equal content always yields an equal fingerprint.
    pub fn of_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut hasher = AHasher::default();
        lines.len().hash(&mut hasher);
        for line in lines {
            line.as_ref().hash(&mut hasher);
        }
        Self(hasher.finish())
    }

    /// Raw hash value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A request for the host to compute a diff of the content identified by `fingerprint`.
///
/// The host hands the fingerprint back together with the resulting diff lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffRequest {
    /// Fingerprint of the buffer snapshot the diff must be computed for.
    pub fingerprint: Fingerprint,
}

/// Debounce and staleness tracking for diff requests.
#[derive(Debug, Clone)]
pub struct DiffSync {
    debounce: Duration,
    dirty_since: Option<Instant>,
    latest: Option<Fingerprint>,
}

impl Default for DiffSync {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DiffSync {
    /// Create a tracker with the given debounce interval.
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            dirty_since: None,
            latest: None,
        }
    }

    /// The configured debounce interval.
    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a buffer edit at `now`.
    ///
    /// Restarts the debounce window and makes every in-flight response stale.
    pub fn note_edit(&mut self, now: Instant) {
        self.dirty_since = Some(now);
        self.latest = None;
    }

    /// Returns `true` while an edit is waiting for its debounce window to elapse.
    pub fn is_pending(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// Time left until [`poll`](Self::poll) will issue a request, if one is pending.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        let since = self.dirty_since?;
        Some(
            self.debounce
                .saturating_sub(now.saturating_duration_since(since)),
        )
    }

    /// Issue a request for `lines` if the debounce window has elapsed.
    pub fn poll<S: AsRef<str>>(&mut self, now: Instant, lines: &[S]) -> Option<DiffRequest> {
        let since = self.dirty_since?;
        if now.saturating_duration_since(since) < self.debounce {
            return None;
        }
        Some(self.request_now(lines))
    }

    /// Issue a request for `lines` immediately, bypassing the debounce.
    pub fn request_now<S: AsRef<str>>(&mut self, lines: &[S]) -> DiffRequest {
        let fingerprint = Fingerprint::of_lines(lines);
        self.dirty_since = None;
        self.latest = Some(fingerprint);
        DiffRequest { fingerprint }
    }

    /// Returns `true` if a response carrying `fingerprint` answers the latest request.
    pub fn is_current(&self, fingerprint: Fingerprint) -> bool {
        self.latest == Some(fingerprint)
    }

    /// Fingerprint of the latest outstanding request, if any.
    pub fn latest(&self) -> Option<Fingerprint> {
        self.latest
    }
}
