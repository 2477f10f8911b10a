//! In-memory analysis session.
//!
//! All mutation goes through [`Session::apply`]. Records are kept newest batch
//! first with each batch in its original order; statistics are derived on
//! read and never stored.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use crate::aggregate::summarize;
use crate::models::{BatchStats, ClassifiedRecord};

/// State transitions of a session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user action started a remote call
    ActionStarted,
    /// A remote call succeeded with this batch
    BatchAnalyzed(Vec<ClassifiedRecord>),
    /// A remote call failed with this user-facing message
    ActionFailed(String),
    /// Drop every record
    Reset,
}

#[derive(Debug, Default, Clone)]
pub struct Session {
    records: Vec<ClassifiedRecord>,
    ids: HashSet<Uuid>,
    in_flight: usize,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ActionStarted => {
                self.in_flight += 1;
                self.last_error = None;
            }
            SessionEvent::BatchAnalyzed(batch) => {
                self.finish_action();
                self.prepend(batch);
            }
            SessionEvent::ActionFailed(message) => {
                self.finish_action();
                self.last_error = Some(message);
            }
            SessionEvent::Reset => {
                self.records.clear();
                self.ids.clear();
                self.last_error = None;
            }
        }
    }

    fn finish_action(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn prepend(&mut self, batch: Vec<ClassifiedRecord>) {
        let mut fresh = Vec::with_capacity(batch.len() + self.records.len());
        for record in batch {
            if self.ids.insert(record.id) {
                fresh.push(record);
            } else {
                warn!("Dropping record with duplicate id {}", record.id);
            }
        }
        fresh.append(&mut self.records);
        self.records = fresh;
    }

    /// Records, newest batch first.
    pub fn records(&self) -> &[ClassifiedRecord] {
        &self.records
    }

    pub fn stats(&self) -> BatchStats {
        summarize(&self.records)
    }

    /// Whether any remote call is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::record;
    use crate::models::{Sentiment, SourceTag};

    #[test]
    fn test_newest_batch_first_order_preserved() {
        let first = vec![
            record(Sentiment::Positive, 0.9, SourceTag::Manual),
            record(Sentiment::Negative, 0.8, SourceTag::Manual),
        ];
        let second = vec![
            record(Sentiment::Neutral, 0.5, SourceTag::X),
            record(Sentiment::Positive, 0.7, SourceTag::X),
        ];
        let mut session = Session::new();

        session.apply(SessionEvent::ActionStarted);
        session.apply(SessionEvent::BatchAnalyzed(first.clone()));
        session.apply(SessionEvent::ActionStarted);
        session.apply(SessionEvent::BatchAnalyzed(second.clone()));

        let ids: Vec<Uuid> = session.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second[0].id, second[1].id, first[0].id, first[1].id]);
        assert_eq!(session.stats().total, 4);
        assert!(!session.is_busy());
    }

    #[test]
    fn test_failure_keeps_records() {
        let mut session = Session::new();
        session.apply(SessionEvent::BatchAnalyzed(vec![record(
            Sentiment::Positive,
            0.9,
            SourceTag::Manual,
        )]));
        let before = session.records().to_vec();

        session.apply(SessionEvent::ActionStarted);
        assert!(session.is_busy());
        session.apply(SessionEvent::ActionFailed("Analysis failed.".to_string()));

        assert_eq!(session.records(), before.as_slice());
        assert_eq!(session.last_error(), Some("Analysis failed."));
        assert!(!session.is_busy());

        session.apply(SessionEvent::ActionStarted);
        assert_eq!(session.last_error(), None);
    }

    #[test]
    fn test_busy_until_last_action_resolves() {
        let mut session = Session::new();
        session.apply(SessionEvent::ActionStarted);
        session.apply(SessionEvent::ActionStarted);

        session.apply(SessionEvent::BatchAnalyzed(vec![]));
        assert!(session.is_busy());

        session.apply(SessionEvent::ActionFailed("Pulse fetch failed.".to_string()));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let rec = record(Sentiment::Neutral, 0.5, SourceTag::Manual);
        let mut session = Session::new();

        session.apply(SessionEvent::BatchAnalyzed(vec![rec.clone()]));
        session.apply(SessionEvent::BatchAnalyzed(vec![rec]));

        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn test_reset_clears_records() {
        let mut session = Session::new();
        session.apply(SessionEvent::BatchAnalyzed(vec![record(
            Sentiment::Negative,
            0.4,
            SourceTag::Instagram,
        )]));

        session.apply(SessionEvent::Reset);

        assert!(session.records().is_empty());
        assert_eq!(session.stats(), BatchStats::default());
    }
}
