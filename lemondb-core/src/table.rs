//! The table store: a row vector plus key→index and field→index maps.
//!
//! Shape is grounded on
//! `examples/clockworklabs-SpacetimeDB/crates/core/src/db/datastore/locking_tx_datastore/table.rs`
//! (rows held alongside index maps owned by the table itself), generalized
//! from that teacher's typed `ProductValue` rows to LemonDB's fixed-arity
//! `Vec<i32>` rows, with swap-pop delete taken from
//! `examples/original_source/src/db/Table.cpp`'s `deleteByIndex`.

use rustc_hash::FxHashMap;

use crate::error::TableError;
use crate::value::Value;

/// The reserved column name referring to a row's key; never a real field.
pub const KEY: &str = "KEY";

/// One row: a unique string key plus a fixed-arity tuple of column values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub key: String,
    pub cells: Vec<Value>,
}

/// A named, ordered collection of rows sharing a column schema.
#[derive(Debug)]
pub struct Table {
    name: String,
    fields: Vec<String>,
    field_index: FxHashMap<String, usize>,
    rows: Vec<Row>,
    key_index: FxHashMap<String, usize>,
}

impl Table {
    /// Creates an empty table. Rejects the reserved column name `KEY` and
    /// duplicate field names, per `spec.md` §4.1.
    pub fn new(name: impl Into<String>, fields: Vec<String>) -> Result<Self, TableError> {
        let mut field_index = FxHashMap::default();
        for (idx, field) in fields.iter().enumerate() {
            if field == KEY {
                return Err(TableError::ReservedFieldName);
            }
            if field_index.insert(field.clone(), idx).is_some() {
                return Err(TableError::DuplicateFieldName(field.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            fields,
            field_index,
            rows: Vec::new(),
            key_index: FxHashMap::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of columns, not counting `KEY`.
    pub fn arity(&self) -> usize {
        self.fields.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Result<usize, TableError> {
        self.field_index
            .get(name)
            .copied()
            .ok_or_else(|| TableError::FieldNotFound(name.to_string()))
    }

    /// Reserves capacity ahead of a batch load.
    pub fn reserve(&mut self, additional: usize) {
        self.rows.reserve(additional);
        self.key_index.reserve(additional);
    }

    pub fn row_index(&self, key: &str) -> Option<usize> {
        self.key_index.get(key).copied()
    }

    pub fn row_at(&self, idx: usize) -> &Row {
        &self.rows[idx]
    }

    pub fn row_at_mut(&mut self, idx: usize) -> &mut Row {
        &mut self.rows[idx]
    }

    pub fn get(&self, key: &str) -> Option<&Row> {
        self.row_index(key).map(|idx| &self.rows[idx])
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Inserts a new row. `values.len()` must equal the table's arity.
    pub fn insert(&mut self, key: String, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.fields.len() {
            return Err(TableError::ArityMismatch {
                expected: self.fields.len(),
                actual: values.len(),
            });
        }
        if self.key_index.contains_key(&key) {
            return Err(TableError::ConflictingKey(key));
        }
        self.key_index.insert(key.clone(), self.rows.len());
        self.rows.push(Row { key, cells: values });
        Ok(())
    }

    /// Batch insert used by `LOAD`: rejects duplicate keys within the batch
    /// itself as well as against rows already present.
    pub fn insert_batch(&mut self, batch: Vec<(String, Vec<Value>)>) -> Result<(), TableError> {
        self.reserve(batch.len());
        for (key, values) in batch {
            self.insert(key, values)?;
        }
        Ok(())
    }

    /// Swap-pop delete: O(1), moves the last row into the deleted slot and
    /// repairs `key_index` for the moved row.
    pub fn delete(&mut self, key: &str) -> Result<(), TableError> {
        let idx = self
            .key_index
            .remove(key)
            .ok_or_else(|| TableError::NotFoundKey(key.to_string()))?;
        let last = self.rows.len() - 1;
        if idx != last {
            self.rows.swap(idx, last);
            let moved_key = self.rows[idx].key.clone();
            self.key_index.insert(moved_key, idx);
        }
        self.rows.pop();
        Ok(())
    }

    /// Renames a row's key in place. Fails if `new_key` is already taken.
    pub fn set_key(&mut self, old_key: &str, new_key: String) -> Result<(), TableError> {
        if new_key == old_key {
            return Ok(());
        }
        if self.key_index.contains_key(&new_key) {
            return Err(TableError::ConflictingKey(new_key));
        }
        let idx = self
            .key_index
            .remove(old_key)
            .ok_or_else(|| TableError::NotFoundKey(old_key.to_string()))?;
        self.key_index.insert(new_key.clone(), idx);
        self.rows[idx].key = new_key;
        Ok(())
    }

    /// Empties rows while preserving the schema (`TRUNCATE`).
    pub fn clear(&mut self) {
        self.rows.clear();
        self.key_index.clear();
    }

    /// Deep copy used by `COPYTABLE`: same schema, same rows, new name.
    pub fn duplicate_as(&self, new_name: impl Into<String>) -> Table {
        Table {
            name: new_name.into(),
            fields: self.fields.clone(),
            field_index: self.field_index.clone(),
            rows: self.rows.clone(),
            key_index: self.key_index.clone(),
        }
    }

    #[cfg(test)]
    fn assert_invariants(&self) {
        assert_eq!(self.rows.len(), self.key_index.len());
        for (idx, row) in self.rows.iter().enumerate() {
            assert_eq!(self.key_index.get(&row.key), Some(&idx));
            assert_eq!(row.cells.len(), self.fields.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Table {
        let mut t = Table::new("Student", vec!["studentID".into(), "class".into()]).unwrap();
        t.insert("Bill_Gates".into(), vec![400812312, 2014]).unwrap();
        t.insert("Steve_Jobs".into(), vec![400851751, 2014]).unwrap();
        t.insert("Jack_Ma".into(), vec![400882382, 2015]).unwrap();
        t
    }

    #[test]
    fn rejects_key_as_field_name() {
        let err = Table::new("T", vec!["KEY".into()]).unwrap_err();
        assert_eq!(err, TableError::ReservedFieldName);
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let err = Table::new("T", vec!["a".into(), "a".into()]).unwrap_err();
        assert_eq!(err, TableError::DuplicateFieldName("a".into()));
    }

    #[test]
    fn insert_enforces_arity_and_uniqueness() {
        let mut t = student();
        assert_eq!(
            t.insert("dup".into(), vec![1]).unwrap_err(),
            TableError::ArityMismatch { expected: 2, actual: 1 }
        );
        assert_eq!(
            t.insert("Bill_Gates".into(), vec![1, 1]).unwrap_err(),
            TableError::ConflictingKey("Bill_Gates".into())
        );
        t.assert_invariants();
    }

    #[test]
    fn swap_pop_delete_preserves_key_index() {
        let mut t = Table::new("T", vec!["age".into(), "score".into()]).unwrap();
        for i in 0..7 {
            t.insert(format!("k{i}"), vec![18 + i, 50 + i * 5]).unwrap();
        }
        // Delete a middle row; the last row should now occupy its slot.
        t.delete("k2").unwrap();
        t.assert_invariants();
        assert_eq!(t.len(), 6);
        assert!(t.get("k2").is_none());
        assert!(t.get("k6").is_some());

        let err = t.delete("k2").unwrap_err();
        assert_eq!(err, TableError::NotFoundKey("k2".into()));
    }

    #[test]
    fn set_key_rehomes_index() {
        let mut t = student();
        t.set_key("Jack_Ma", "Jack_Ma_2".into()).unwrap();
        assert!(t.get("Jack_Ma").is_none());
        assert_eq!(t.get("Jack_Ma_2").unwrap().cells, vec![400882382, 2015]);
        t.assert_invariants();

        let err = t.set_key("Jack_Ma_2", "Bill_Gates".into()).unwrap_err();
        assert_eq!(err, TableError::ConflictingKey("Bill_Gates".into()));
    }

    #[test]
    fn truncate_preserves_schema() {
        let mut t = student();
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.fields(), ["studentID", "class"]);
    }
}
