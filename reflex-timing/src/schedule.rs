use log::trace;

/// Identity a timer was scheduled under. A timer only applies while the
/// session it was created for is still live and has not moved past the
/// epoch it was armed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub session: u64,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<K> {
    pub token: TimerToken,
    pub deadline: u64,
    pub kind: K,
}

/// Pending deadlines, fired in deadline order by polling.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    pending: Vec<Scheduled<K>>,
}

impl<K: Clone + std::fmt::Debug> Scheduler<K> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, token: TimerToken, deadline: u64, kind: K) {
        trace!(target: "timing", "Scheduling {:?} at {} for {:?}", kind, deadline, token);
        self.pending.push(Scheduled {
            token,
            deadline,
            kind,
        });
    }

    /// Drops every timer armed under `token`. Returns how many were removed.
    pub fn cancel(&mut self, token: TimerToken) -> usize {
        let before = self.pending.len();
        self.pending.retain(|s| s.token != token);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Removes and returns the earliest timer due at `now`, if any.
    pub fn pop_due(&mut self, now: u64) -> Option<Scheduled<K>> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.deadline <= now)
            .min_by_key(|(_, s)| s.deadline)
            .map(|(i, _)| i)?;
        Some(self.pending.remove(idx))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Clone + std::fmt::Debug> Default for Scheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
