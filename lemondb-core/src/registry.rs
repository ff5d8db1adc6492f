//! The database: a name-indexed collection of [`Table`]s.
//!
//! Grounded on `examples/clockworklabs-SpacetimeDB/crates/core/src/host/host_controller.rs`'s
//! `parking_lot::RwLock`-guarded name map (lazily-populated registry of live
//! instances keyed by name), generalized from database instances to
//! in-memory tables. `file_table_name` memoizes the header-line table name
//! read from a `LOAD`ed file the way `original_source/src/db/Database.cpp`'s
//! `readTableName` caches a file's declared name against its path.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::RegistryError;
use crate::table::Table;

/// Owns every live table, keyed by name.
#[derive(Default)]
pub struct Registry {
    tables: RwLock<FxHashMap<String, Table>>,
    file_names: RwLock<FxHashMap<PathBuf, String>>,
    /// Set by `QUIT`; the script driver polls this to stop scheduling new
    /// top-level queries once it is set.
    end_input: AtomicBool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly built table. Fails if the name is already taken.
    pub fn register(&self, table: Table) -> Result<(), RegistryError> {
        let mut tables = self.tables.write();
        if tables.contains_key(table.name()) {
            return Err(RegistryError::DuplicatedTableName(table.name().to_string()));
        }
        tables.insert(table.name().to_string(), table);
        Ok(())
    }

    /// Removes and returns a table by name (`DROPTABLE`).
    pub fn drop_table(&self, name: &str) -> Result<Table, RegistryError> {
        self.tables
            .write()
            .remove(name)
            .ok_or_else(|| RegistryError::TableNameNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Runs `f` with shared read access to `name`'s table.
    pub fn with_table<R>(
        &self,
        name: &str,
        f: impl FnOnce(&Table) -> R,
    ) -> Result<R, RegistryError> {
        let tables = self.tables.read();
        let table = tables
            .get(name)
            .ok_or_else(|| RegistryError::TableNameNotFound(name.to_string()))?;
        Ok(f(table))
    }

    /// Runs `f` with exclusive write access to `name`'s table.
    pub fn with_table_mut<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Table) -> R,
    ) -> Result<R, RegistryError> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(name)
            .ok_or_else(|| RegistryError::TableNameNotFound(name.to_string()))?;
        Ok(f(table))
    }

    /// Inserts `table` under `new_name`, used by `COPYTABLE`.
    pub fn register_as(&self, table: Table, new_name: &str) -> Result<(), RegistryError> {
        self.register(table.duplicate_as(new_name))
    }

    /// Remembers which table name a `LOAD`ed file declared, so a later
    /// `DUMP` of the same path or a repeated `LOAD` doesn't need to re-read
    /// the header line.
    pub fn remember_file_table_name(&self, path: &Path, name: &str) {
        self.file_names
            .write()
            .insert(path.to_path_buf(), name.to_string());
    }

    pub fn file_table_name(&self, path: &Path) -> Option<String> {
        self.file_names.read().get(path).cloned()
    }

    pub fn set_end_input(&self) {
        self.end_input.store(true, Ordering::SeqCst);
    }

    pub fn end_input(&self) -> bool {
        self.end_input.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Table {
        Table::new(name, vec!["a".into()]).unwrap()
    }

    #[test]
    fn register_rejects_duplicate_names() {
        let reg = Registry::new();
        reg.register(table("T")).unwrap();
        let err = reg.register(table("T")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicatedTableName("T".into()));
    }

    #[test]
    fn drop_removes_and_returns() {
        let reg = Registry::new();
        reg.register(table("T")).unwrap();
        let t = reg.drop_table("T").unwrap();
        assert_eq!(t.name(), "T");
        assert!(!reg.contains("T"));
    }

    #[test]
    fn drop_missing_table_errors() {
        let reg = Registry::new();
        let err = reg.drop_table("Nope").unwrap_err();
        assert_eq!(err, RegistryError::TableNameNotFound("Nope".into()));
    }

    #[test]
    fn names_are_sorted() {
        let reg = Registry::new();
        reg.register(table("Zebra")).unwrap();
        reg.register(table("Apple")).unwrap();
        assert_eq!(reg.names(), vec!["Apple".to_string(), "Zebra".to_string()]);
    }

    #[test]
    fn end_input_flag_latches() {
        let reg = Registry::new();
        assert!(!reg.end_input());
        reg.set_end_input();
        assert!(reg.end_input());
    }

    #[test]
    fn file_table_name_round_trips() {
        let reg = Registry::new();
        let path = PathBuf::from("/tmp/student.db");
        assert_eq!(reg.file_table_name(&path), None);
        reg.remember_file_table_name(&path, "Student");
        assert_eq!(reg.file_table_name(&path), Some("Student".to_string()));
    }
}
