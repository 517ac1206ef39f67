//! Bounded alarm history.
//!
//! Append-only FIFO over a `VecDeque`: when full, the oldest record is
//! evicted. Eviction is not acknowledgment and not clearing.

use rcs_panel_types::AlarmRecord;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct AlarmLog {
    entries: VecDeque<AlarmRecord>,
    max_entries: usize,
    evicted: u64,
}

impl AlarmLog {
    /// `max_entries` is clamped to at least 1
    pub fn new(max_entries: usize) -> Self {
        let max_entries = max_entries.max(1);
        Self {
            entries: VecDeque::with_capacity(max_entries + 1),
            max_entries,
            evicted: 0,
        }
    }

    /// Append a record, evicting oldest entries beyond capacity.
    ///
    /// Returns the number of records evicted.
    pub fn push(&mut self, record: AlarmRecord) -> usize {
        self.entries.push_back(record);
        let mut evicted = 0;
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
            evicted += 1;
        }
        self.evicted += evicted as u64;
        evicted
    }

    /// Mark every unacknowledged record acknowledged; returns how many changed
    pub fn acknowledge_all(&mut self) -> usize {
        let mut changed = 0;
        for record in self.entries.iter_mut().filter(|r| !r.acknowledged) {
            record.acknowledged = true;
            changed += 1;
        }
        changed
    }

    /// Mark unacknowledged records of one condition acknowledged
    pub fn acknowledge_condition(&mut self, condition_id: &str) -> usize {
        let mut changed = 0;
        for record in self
            .entries
            .iter_mut()
            .filter(|r| !r.acknowledged && r.condition_id == condition_id)
        {
            record.acknowledged = true;
            changed += 1;
        }
        changed
    }

    /// Records oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &AlarmRecord> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Records newest first
    pub fn newest_first(&self) -> impl Iterator<Item = &AlarmRecord> {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&AlarmRecord> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Total records evicted since creation
    pub fn evicted_total(&self) -> u64 {
        self.evicted
    }

    pub fn unacknowledged_count(&self) -> usize {
        self.entries.iter().filter(|r| !r.acknowledged).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcs_panel_types::Severity;
    use std::time::Duration;

    fn record(n: u64) -> AlarmRecord {
        AlarmRecord::new(&format!("c{}", n), &format!("ALARM {}", n), Severity::Alarm, Duration::from_secs(n))
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = AlarmLog::new(3);
        for n in 0..5 {
            log.push(record(n));
        }
        assert_eq!(log.len(), 3);
        let ids: Vec<&str> = log.iter().map(|r| r.condition_id.as_str()).collect();
        assert_eq!(ids, vec!["c2", "c3", "c4"]);
        assert_eq!(log.evicted_total(), 2);
        assert_eq!(log.latest().map(|r| r.condition_id.as_str()), Some("c4"));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut log = AlarmLog::new(20);
        for n in 0..1000 {
            log.push(record(n));
            assert!(log.len() <= 20);
        }
        assert_eq!(log.iter().next().map(|r| r.activated_at), Some(Duration::from_secs(980)));
    }

    #[test]
    fn test_eviction_does_not_touch_acknowledged_flags() {
        let mut log = AlarmLog::new(2);
        log.push(record(0));
        log.push(record(1));
        log.acknowledge_all();
        log.push(record(2));
        let flags: Vec<bool> = log.iter().map(|r| r.acknowledged).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn test_acknowledge_condition() {
        let mut log = AlarmLog::new(5);
        log.push(record(0));
        log.push(record(1));
        assert_eq!(log.acknowledge_condition("c1"), 1);
        assert_eq!(log.acknowledge_condition("c1"), 0);
        assert_eq!(log.unacknowledged_count(), 1);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut log = AlarmLog::new(0);
        log.push(record(0));
        log.push(record(1));
        assert_eq!(log.max_entries(), 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_newest_first_and_clear() {
        let mut log = AlarmLog::new(5);
        log.push(record(0));
        log.push(record(1));
        let first = log.newest_first().next().map(|r| r.condition_id.clone());
        assert_eq!(first.as_deref(), Some("c1"));
        log.clear();
        assert!(log.is_empty());
    }
}
