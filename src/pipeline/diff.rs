// src/pipeline/diff.rs

//! Schedule diffing.
//!
//! Partitions the union of two schedules' keys into added, deleted,
//! modified, and unchanged sets. The partition drives the decision to
//! archive and publish.

use crate::models::Schedule;

/// Four-way partition of two schedules' keys.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDiff {
    /// Keys present only in the new schedule
    pub added: Schedule,
    /// Keys present only in the old schedule
    pub deleted: Schedule,
    /// Keys present in both with differing purpose, location, or time block
    pub modified: Schedule,
    /// Keys present in both with equal content
    pub unchanged: Schedule,
}

impl ScheduleDiff {
    /// Check if there are any changes.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.deleted.is_empty() || !self.modified.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.added.len() + self.deleted.len() + self.modified.len()
    }

    /// One-line summary for run logs.
    pub fn summary(&self) -> String {
        format!(
            "added={} modified={} deleted={} unchanged={}",
            self.added.len(),
            self.modified.len(),
            self.deleted.len(),
            self.unchanged.len()
        )
    }
}

/// Calculate the diff between the prior and current schedules.
///
/// An absent prior schedule (first run) puts every current entry in `added`.
/// Entry content is compared field-wise over purpose, location, and time
/// block; `parsedTime` never participates.
pub fn compare_schedules(old: Option<&Schedule>, new: &Schedule) -> ScheduleDiff {
    let mut diff = ScheduleDiff::default();

    let Some(old) = old else {
        diff.added = new.clone();
        return diff;
    };

    for (key, entry) in old {
        if !new.contains_key(key) {
            diff.deleted.insert(key.clone(), entry.clone());
        }
    }

    for (key, new_entry) in new {
        match old.get(key) {
            None => {
                diff.added.insert(key.clone(), new_entry.clone());
            }
            Some(old_entry) if old_entry.content_eq(new_entry) => {
                diff.unchanged.insert(key.clone(), new_entry.clone());
            }
            Some(_) => {
                diff.modified.insert(key.clone(), new_entry.clone());
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEntry;
    use std::collections::BTreeSet;

    fn entry(dow: &str, dom: &str, location: &str, time_block: &str) -> ScheduleEntry {
        ScheduleEntry {
            day_of_week: dow.to_string(),
            day_of_month: dom.to_string(),
            location: location.to_string(),
            time_block: time_block.to_string(),
            purpose: String::new(),
            parsed_time: None,
        }
    }

    fn schedule(entries: &[ScheduleEntry]) -> Schedule {
        entries.iter().map(|e| (e.key(), e.clone())).collect()
    }

    #[test]
    fn test_no_changes() {
        let old = schedule(&[
            entry("TUESDAY", "10/3", "Warren", "4:45-6:45"),
            entry("THURSDAY", "10/5", "Warren", "4:45-6:45"),
        ]);
        let diff = compare_schedules(Some(&old), &old.clone());
        assert!(!diff.has_changes());
        assert_eq!(diff.change_count(), 0);
        assert_eq!(diff.unchanged.len(), 2);
    }

    #[test]
    fn test_absent_prior_marks_everything_added() {
        let new = schedule(&[
            entry("TUESDAY", "10/3", "Warren", "4:45-6:45"),
            entry("THURSDAY", "10/5", "Warren", "4:45-6:45"),
        ]);
        let diff = compare_schedules(None, &new);
        assert_eq!(diff.added.len(), 2);
        assert!(diff.deleted.is_empty());
        assert!(diff.modified.is_empty());
        assert!(diff.unchanged.is_empty());
    }

    #[test]
    fn test_mixed_changes() {
        let old = schedule(&[
            entry("TUESDAY", "10/3", "Warren", "4:45-6:45"),
            entry("THURSDAY", "10/5", "Warren", "4:45-6:45"),
            entry("SATURDAY", "10/7", "Warren", "9:00"),
            entry("SUNDAY", "10/8", "Warren", "9:00"),
        ]);
        let new = schedule(&[
            entry("THURSDAY", "10/5", "Warren", "4:30-6:30"),
            entry("SATURDAY", "10/7", "Warren", "9:00"),
            entry("SUNDAY", "10/8", "Warren", "9:00"),
            entry("TUESDAY", "10/10", "Warren", "4:45-6:45"),
            entry("THURSDAY", "10/12", "Warren", "4:45-6:45"),
        ]);

        let diff = compare_schedules(Some(&old), &new);
        assert_eq!(diff.added.len(), 2);
        assert!(diff.added.contains_key("TUESDAY, 10/10"));
        assert!(diff.added.contains_key("THURSDAY, 10/12"));
        assert_eq!(diff.deleted.len(), 1);
        assert!(diff.deleted.contains_key("TUESDAY, 10/3"));
        assert_eq!(diff.modified.len(), 1);
        assert_eq!(diff.modified["THURSDAY, 10/5"].time_block, "4:30-6:30");
        assert_eq!(diff.unchanged.len(), 2);
    }

    #[test]
    fn test_partition_covers_key_union_disjointly() {
        let old = schedule(&[
            entry("TUESDAY", "10/3", "Warren", "4:45-6:45"),
            entry("THURSDAY", "10/5", "Warren", "4:45-6:45"),
            entry("SATURDAY", "10/7", "Warren", "9:00"),
        ]);
        let new = schedule(&[
            entry("THURSDAY", "10/5", "Eliot", "4:45-6:45"),
            entry("SATURDAY", "10/7", "Warren", "9:00"),
            entry("SUNDAY", "10/8", "Warren", "9:00"),
        ]);

        let diff = compare_schedules(Some(&old), &new);

        let mut union: BTreeSet<&String> = old.keys().collect();
        union.extend(new.keys());

        let mut partition: Vec<&String> = Vec::new();
        partition.extend(diff.added.keys());
        partition.extend(diff.deleted.keys());
        partition.extend(diff.modified.keys());
        partition.extend(diff.unchanged.keys());

        assert_eq!(partition.len(), union.len());
        let partition_set: BTreeSet<&String> = partition.into_iter().collect();
        assert_eq!(partition_set, union);
    }

    #[test]
    fn test_parsed_time_does_not_affect_diff() {
        let old = schedule(&[entry("FRIDAY", "10/13", "Eliot", "4:15")]);
        let mut new = old.clone();
        new.get_mut("FRIDAY, 10/13").unwrap().parsed_time =
            Some(chrono::Utc::now());

        let diff = compare_schedules(Some(&old), &new);
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_full_to_empty() {
        let old = schedule(&[entry("TUESDAY", "10/3", "Warren", "4:45-6:45")]);
        let diff = compare_schedules(Some(&old), &Schedule::new());
        assert!(diff.added.is_empty());
        assert_eq!(diff.deleted.len(), 1);
    }

    #[test]
    fn test_summary_format() {
        let old = schedule(&[entry("TUESDAY", "10/3", "Warren", "4:45-6:45")]);
        let diff = compare_schedules(Some(&old), &Schedule::new());
        assert_eq!(diff.summary(), "added=0 modified=0 deleted=1 unchanged=0");
    }
}
