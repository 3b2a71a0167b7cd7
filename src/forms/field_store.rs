use std::fmt;

use crate::record::{Record, Value};

type ChangeListener = Box<dyn FnMut(&Record) + Send>;

/// Single source of truth for the record under construction or edit.
///
/// Storage only: nothing is validated here. Every mutation notifies the
/// registered listeners with the post-mutation snapshot.
#[derive(Default)]
pub struct FieldStore {
    record: Record,
    listeners: Vec<ChangeListener>,
}

impl fmt::Debug for FieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldStore")
            .field("record", &self.record)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FieldStore {
    pub fn new(initial: Record) -> Self {
        Self {
            record: initial,
            listeners: Vec::new(),
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> Record {
        self.record.clone()
    }

    /// Borrowed view of the current record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&Record) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replaces one field. Nested values merge into an existing nested value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.record.assign(field, value.into());
        self.notify();
    }

    /// Batch update, one notification for the whole batch.
    pub fn set_many(&mut self, partial: Record) {
        self.record.merge(partial);
        self.notify();
    }

    /// Appends a trimmed, non-duplicate item to a list field.
    pub fn push_item(&mut self, field: &str, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        let mut items = match self.record.get(field) {
            Some(Value::List(items)) => items.clone(),
            _ => Vec::new(),
        };
        if items.iter().any(|existing| existing.as_text() == Some(item)) {
            return false;
        }
        items.push(Value::from(item));
        self.set(field, Value::List(items));
        true
    }

    /// Removes the item at `index` from a list field.
    pub fn remove_item(&mut self, field: &str, index: usize) -> Option<Value> {
        let mut items = match self.record.get(field) {
            Some(Value::List(items)) if index < items.len() => items.clone(),
            _ => return None,
        };
        let removed = items.remove(index);
        self.set(field, Value::List(items));
        Some(removed)
    }

    /// Replaces the whole record without notifying listeners. Used when a
    /// draft is discarded, so the discarded state is not saved again.
    pub fn reset(&mut self, record: Record) {
        self.record = record;
    }

    fn notify(&mut self) {
        let snapshot = &self.record;
        for listener in self.listeners.iter_mut() {
            listener(snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn last_write_wins_per_field() {
        let mut store = FieldStore::default();
        store.set("title", "Engineer");
        store.set_many(Record::new().with("title", "Senior Engineer").with("company", "Acme"));
        store.set("company", "TechCorp");

        let record = store.get();
        assert_eq!(record.text("title"), "Senior Engineer");
        assert_eq!(record.text("company"), "TechCorp");
    }

    #[test]
    fn nested_set_keeps_siblings() {
        let mut store = FieldStore::new(
            Record::new().with("salary", Record::new().with("currency", "GBP")),
        );
        store.set("salary", Record::new().with("min", 50_000));
        let salary = store.get().nested("salary").cloned().unwrap();
        assert_eq!(salary.text("currency"), "GBP");
        assert_eq!(salary.number("min"), Some(50_000.0));
    }

    #[test]
    fn listeners_see_every_mutation() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = FieldStore::default();
        let sink = Arc::clone(&seen);
        store.subscribe(move |record| sink.lock().unwrap().push(record.text("title")));

        store.set("title", "A");
        store.set_many(Record::new().with("title", "B"));
        store.reset(Record::new());
        store.push_item("tags", "x");

        assert_eq!(*seen.lock().unwrap(), vec!["A", "B", ""]);
        assert_eq!(store.get().list("tags"), vec!["x"]);
    }

    #[test]
    fn get_returns_an_independent_snapshot() {
        let mut store = FieldStore::default();
        store.set("title", "A");
        let snapshot = store.get();
        store.set("title", "B");
        assert_eq!(snapshot.text("title"), "A");
    }

    #[test]
    fn list_helpers_trim_and_skip_duplicates() {
        let mut store = FieldStore::default();
        assert!(store.push_item("skills", " rust "));
        assert!(!store.push_item("skills", "rust"));
        assert!(!store.push_item("skills", "  "));
        assert!(store.push_item("skills", "sql"));
        assert_eq!(store.get().list("skills"), vec!["rust", "sql"]);

        assert_eq!(store.remove_item("skills", 0), Some(Value::from("rust")));
        assert_eq!(store.remove_item("skills", 5), None);
        assert_eq!(store.get().list("skills"), vec!["sql"]);
    }
}
