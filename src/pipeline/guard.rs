// src/pipeline/guard.rs

//! Suspicious-diff guard.
//!
//! A page redesign can silently degrade extraction to an empty schedule,
//! which the diff engine reports as "everything deleted". When enabled, the
//! guard refuses to archive, publish, or commit such a diff so the prior
//! state survives until an operator looks at the page.

use tracing::error;

use crate::models::Schedule;
use crate::pipeline::diff::ScheduleDiff;

/// Result of the guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// Safe to proceed with the run
    Pass,
    /// The diff wipes the entire prior schedule without adding anything
    FullWipe { prior_count: usize },
}

/// Guard against publishing a diff that erases the whole known schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct WipeGuard {
    enabled: bool,
}

impl WipeGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Check a diff against the prior schedule it was computed from.
    pub fn check(&self, prior: &Schedule, diff: &ScheduleDiff) -> GuardVerdict {
        if !self.enabled || prior.is_empty() {
            return GuardVerdict::Pass;
        }

        if diff.deleted.len() == prior.len() && diff.added.is_empty() {
            return GuardVerdict::FullWipe {
                prior_count: prior.len(),
            };
        }

        GuardVerdict::Pass
    }

    /// Check and log; returns true when the run should continue.
    pub fn allows(&self, prior: &Schedule, diff: &ScheduleDiff) -> bool {
        match self.check(prior, diff) {
            GuardVerdict::Pass => true,
            GuardVerdict::FullWipe { prior_count } => {
                error!(
                    prior_count,
                    "diff deletes the entire known schedule and adds nothing; \
                     suppressing archive and notification"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEntry;
    use crate::pipeline::diff::compare_schedules;

    fn schedule(count: usize) -> Schedule {
        (0..count)
            .map(|i| {
                let entry = ScheduleEntry {
                    day_of_week: "TUESDAY".to_string(),
                    day_of_month: format!("10/{}", i + 1),
                    location: "Warren".to_string(),
                    time_block: "4:45-6:45".to_string(),
                    purpose: String::new(),
                    parsed_time: None,
                };
                (entry.key(), entry)
            })
            .collect()
    }

    #[test]
    fn test_disabled_guard_passes_everything() {
        let prior = schedule(4);
        let diff = compare_schedules(Some(&prior), &Schedule::new());
        assert_eq!(WipeGuard::new(false).check(&prior, &diff), GuardVerdict::Pass);
    }

    #[test]
    fn test_full_wipe_detected() {
        let prior = schedule(4);
        let diff = compare_schedules(Some(&prior), &Schedule::new());
        assert_eq!(
            WipeGuard::new(true).check(&prior, &diff),
            GuardVerdict::FullWipe { prior_count: 4 }
        );
        assert!(!WipeGuard::new(true).allows(&prior, &diff));
    }

    #[test]
    fn test_partial_deletion_passes() {
        let prior = schedule(4);
        let mut current = prior.clone();
        current.pop_first();
        let diff = compare_schedules(Some(&prior), &current);
        assert_eq!(WipeGuard::new(true).check(&prior, &diff), GuardVerdict::Pass);
    }

    #[test]
    fn test_wipe_with_additions_passes() {
        // A fully rewritten schedule (old keys gone, new keys present) is a
        // legitimate season rollover, not a broken capture.
        let prior = schedule(2);
        let mut current = Schedule::new();
        let entry = ScheduleEntry {
            day_of_week: "FRIDAY".to_string(),
            day_of_month: "11/1".to_string(),
            location: "Eliot".to_string(),
            time_block: "4:15".to_string(),
            purpose: String::new(),
            parsed_time: None,
        };
        current.insert(entry.key(), entry);
        let diff = compare_schedules(Some(&prior), &current);
        assert_eq!(WipeGuard::new(true).check(&prior, &diff), GuardVerdict::Pass);
    }

    #[test]
    fn test_empty_prior_passes() {
        let diff = compare_schedules(Some(&Schedule::new()), &schedule(3));
        assert_eq!(
            WipeGuard::new(true).check(&Schedule::new(), &diff),
            GuardVerdict::Pass
        );
    }
}
