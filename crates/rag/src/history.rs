//! Bounded conversation window shared across requests.

use crate::types::ChatEntry;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

/// FIFO buffer of recent exchanges.
///
/// Every operation takes the lock for its full duration, so readers never
/// see a window larger than `max_entries` or a half-applied append.
#[derive(Debug)]
pub struct ConversationWindow {
    max_entries: usize,
    entries: Mutex<VecDeque<ChatEntry>>,
}

impl ConversationWindow {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            entries: Mutex::new(VecDeque::with_capacity(max_entries)),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Record an exchange, evicting the oldest entries past the bound.
    /// With a bound of zero nothing is kept.
    pub fn append(&self, question: impl Into<String>, answer: impl Into<String>) {
        let entry = ChatEntry::new(question, answer);
        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> Vec<ChatEntry> {
        let entries = self.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Every entry, oldest first.
    pub fn snapshot(&self) -> Vec<ChatEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ChatEntry>> {
        // A panic while holding the lock cannot leave the deque torn, so the
        // data is still usable.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_evicts_oldest_first() {
        let window = ConversationWindow::new(3);
        for i in 0..5 {
            window.append(format!("q{}", i), format!("a{}", i));
        }

        let questions: Vec<_> = window.snapshot().into_iter().map(|e| e.question).collect();
        assert_eq!(questions, vec!["q2", "q3", "q4"]);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn test_recent_returns_tail_oldest_first() {
        let window = ConversationWindow::new(10);
        for i in 0..4 {
            window.append(format!("q{}", i), "a");
        }

        let recent: Vec<_> = window.recent(2).into_iter().map(|e| e.question).collect();
        assert_eq!(recent, vec!["q2", "q3"]);
        assert_eq!(window.recent(50).len(), 4);
        assert!(window.recent(0).is_empty());
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let window = ConversationWindow::new(0);
        window.append("q", "a");
        assert!(window.is_empty());
        assert!(window.recent(5).is_empty());
    }

    #[test]
    fn test_clear() {
        let window = ConversationWindow::new(2);
        window.append("q", "a");
        window.clear();
        assert!(window.is_empty());
    }

    #[test]
    fn test_concurrent_appends_respect_bound() {
        let window = ConversationWindow::new(5);

        std::thread::scope(|scope| {
            for t in 0..4 {
                let window = &window;
                scope.spawn(move || {
                    for i in 0..50 {
                        window.append(format!("t{}-q{}", t, i), "a");
                        assert!(window.len() <= 5);
                        assert!(window.recent(10).len() <= 5);
                    }
                });
            }
        });

        assert_eq!(window.len(), 5);
    }
}
