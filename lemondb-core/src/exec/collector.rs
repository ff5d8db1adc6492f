//! Ordered collection of rendered query output, keyed by submission id.
//!
//! Grounded on `examples/original_source/src/threading/OutputPool.{h,cpp}`'s
//! mutex-guarded ordered map plus `output_all` drain-in-order behavior,
//! reimplemented over `parking_lot::Mutex<BTreeMap<u64, Entry>>` so ascending
//! iteration order falls out of the map itself rather than an explicit sort.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// One collected result: either rendered success text or a failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Ok(String),
    Err(String),
}

/// Thread-safe `query_id -> rendered result` map with in-order draining.
#[derive(Default)]
pub struct OutputCollector {
    entries: Mutex<BTreeMap<u64, Entry>>,
}

impl OutputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_ok(&self, id: u64, body: String) {
        self.entries.lock().insert(id, Entry::Ok(body));
    }

    pub fn record_err(&self, id: u64, message: String) {
        self.entries.lock().insert(id, Entry::Err(message));
    }

    /// Drains and returns every collected entry in ascending id order.
    pub fn drain_all(&self) -> Vec<(u64, Entry)> {
        std::mem::take(&mut *self.entries.lock()).into_iter().collect()
    }

    /// Drains the longest contiguous prefix starting at `next_expected`, for
    /// progress flushing ahead of final drain. Returns the entries drained
    /// and the next id the caller should ask for.
    pub fn drain_contiguous_prefix(&self, mut next_expected: u64) -> (Vec<(u64, Entry)>, u64) {
        let mut guard = self.entries.lock();
        let mut drained = Vec::new();
        while let Some(entry) = guard.remove(&next_expected) {
            drained.push((next_expected, entry));
            next_expected += 1;
        }
        (drained, next_expected)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Renders one collected entry as the final `"{id}\n{body}"` stdout block,
/// plus an optional `QUERY FAILED:` stderr block — matching spec.md §6.4 and
/// §4.9 (QUIT has no id/body at all and is filtered out before this is
/// called).
pub fn render_entry(id: u64, entry: &Entry) -> (String, Option<String>) {
    match entry {
        Entry::Ok(body) => (format!("{id}\n{body}\n"), None),
        Entry::Err(message) => {
            (format!("{id}\n"), Some(format!("QUERY FAILED:\n\t{message}\n")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_ascending_id_order_regardless_of_insertion_order() {
        let collector = OutputCollector::new();
        collector.record_ok(3, "third".into());
        collector.record_ok(1, "first".into());
        collector.record_err(2, "oops".into());

        let drained = collector.drain_all();
        assert_eq!(
            drained,
            vec![
                (1, Entry::Ok("first".into())),
                (2, Entry::Err("oops".into())),
                (3, Entry::Ok("third".into())),
            ]
        );
        assert!(collector.is_empty());
    }

    #[test]
    fn contiguous_prefix_stops_at_first_gap() {
        let collector = OutputCollector::new();
        collector.record_ok(0, "a".into());
        collector.record_ok(1, "b".into());
        collector.record_ok(3, "d".into());

        let (drained, next) = collector.drain_contiguous_prefix(0);
        assert_eq!(drained.len(), 2);
        assert_eq!(next, 2);
        assert!(!collector.is_empty());
    }

    #[test]
    fn render_entry_formats_success_and_failure() {
        let (out, err) = render_entry(5, &Entry::Ok("Affected 3 rows.".into()));
        assert_eq!(out, "5\nAffected 3 rows.\n");
        assert!(err.is_none());

        let (out, err) = render_entry(6, &Entry::Err("No such table".into()));
        assert_eq!(out, "6\n");
        assert_eq!(err.unwrap(), "QUERY FAILED:\n\tNo such table\n");
    }
}
