// Lifecycle phases, UI flags and phase history

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const MAX_HISTORY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    LibraryLoading,
    SecretPending,
    RequestInitializing,
    FormMounting,
    AwaitingSubmission,
    Submitting,
    ResultPolling,
    Complete,
    Failed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// One flag per step of the widget sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleFlags {
    pub library_ready: bool,
    pub fetching_pay_secret: bool,
    pub pay_request_ready: bool,
    pub pay_form_ready: bool,
    pub submitting_overlay: bool,
    pub submitting: bool,
    pub pay_complete: bool,
    pub loading: bool,
}

impl LifecycleFlags {
    /// Mount guard: request ready on a loaded library, form not yet mounted.
    pub fn can_mount_form(&self) -> bool {
        self.library_ready && self.pay_request_ready && !self.pay_form_ready
    }

    /// Submit guard: mounted form, no submission in flight, not yet paid.
    pub fn can_submit(&self) -> bool {
        self.pay_form_ready && !self.submitting && !self.pay_complete
    }

    /// Reset applied at the start of every pay request initialization.
    pub fn reset_for_request(&mut self) {
        self.loading = true;
        self.pay_request_ready = false;
        self.pay_form_ready = false;
        self.submitting = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseChange {
    pub seq: u64,
    pub from: Phase,
    pub to: Phase,
}

/// Bounded record of phase transitions, oldest first.
#[derive(Debug, Clone, Default)]
pub struct PhaseHistory {
    entries: VecDeque<PhaseChange>,
    next_seq: u64,
}

impl PhaseHistory {
    pub fn record(&mut self, from: Phase, to: Phase) {
        self.entries.push_back(PhaseChange { seq: self.next_seq, from, to });
        self.next_seq += 1;
        while self.entries.len() > MAX_HISTORY {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> Vec<PhaseChange> {
        self.entries.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_guard() {
        let mut flags = LifecycleFlags::default();
        assert!(!flags.can_mount_form());
        flags.library_ready = true;
        flags.pay_request_ready = true;
        assert!(flags.can_mount_form());
        flags.pay_form_ready = true;
        assert!(!flags.can_mount_form());
    }

    #[test]
    fn test_submit_guard() {
        let mut flags = LifecycleFlags::default();
        assert!(!flags.can_submit());
        flags.pay_form_ready = true;
        assert!(flags.can_submit());
        flags.submitting = true;
        assert!(!flags.can_submit());
        flags.submitting = false;
        flags.pay_complete = true;
        assert!(!flags.can_submit());
    }

    #[test]
    fn test_reset_for_request() {
        let mut flags = LifecycleFlags {
            library_ready: true,
            pay_request_ready: true,
            pay_form_ready: true,
            submitting: true,
            ..Default::default()
        };
        flags.reset_for_request();
        assert!(flags.library_ready);
        assert!(flags.loading);
        assert!(!flags.pay_request_ready);
        assert!(!flags.pay_form_ready);
        assert!(!flags.submitting);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = PhaseHistory::default();
        for _ in 0..(MAX_HISTORY + 25) {
            history.record(Phase::Submitting, Phase::ResultPolling);
        }
        let entries = history.entries();
        assert_eq!(entries.len(), MAX_HISTORY);
        assert_eq!(entries[0].seq, 25);
        assert_eq!(entries.last().unwrap().seq, (MAX_HISTORY + 24) as u64);
    }
}
