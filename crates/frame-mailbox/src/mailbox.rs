//! Mailbox Implementation

/// Counters kept over the mailbox lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MailboxStats {
    /// Values posted
    pub posted: u64,
    /// Values replaced before anyone took them
    pub overwritten: u64,
    /// Values taken by the consumer
    pub taken: u64,
    /// Values thrown away by `clear`
    pub discarded: u64,
}

/// Single-slot overwrite-on-full buffer
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Option<T>,
    stats: MailboxStats,
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Mailbox<T> {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self {
            slot: None,
            stats: MailboxStats::default(),
        }
    }

    /// Store a value, returning the unread value it replaced
    pub fn post(&mut self, value: T) -> Option<T> {
        self.stats.posted += 1;
        let displaced = self.slot.replace(value);
        if displaced.is_some() {
            self.stats.overwritten += 1;
        }
        displaced
    }

    /// Take the pending value, leaving the slot empty
    pub fn take(&mut self) -> Option<T> {
        let value = self.slot.take();
        if value.is_some() {
            self.stats.taken += 1;
        }
        value
    }

    /// Look at the pending value without consuming it
    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    /// Drop the pending value, returning it
    pub fn clear(&mut self) -> Option<T> {
        let value = self.slot.take();
        if value.is_some() {
            self.stats.discarded += 1;
        }
        value
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Lifetime counters
    pub fn stats(&self) -> MailboxStats {
        self.stats
    }
}
