//! `INSERT` — grounded on `examples/original_source/src/query/data/InsertQuery.cpp`.

use crate::error::EngineError;
use crate::result::QuerySuccess;
use crate::table::Table;
use crate::value::Value;

pub fn execute(table: &mut Table, key: String, values: Vec<Value>) -> Result<QuerySuccess, EngineError> {
    table.insert(key, values)?;
    Ok(QuerySuccess::Ack { message: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_a_row() {
        let mut t = Table::new("T", vec!["a".into()]).unwrap();
        let out = execute(&mut t, "k".into(), vec![1]).unwrap();
        assert_eq!(out, QuerySuccess::Ack { message: None });
        assert_eq!(t.get("k").unwrap().cells, vec![1]);
    }

    #[test]
    fn rejects_duplicate_key() {
        let mut t = Table::new("T", vec!["a".into()]).unwrap();
        execute(&mut t, "k".into(), vec![1]).unwrap();
        assert!(execute(&mut t, "k".into(), vec![2]).is_err());
    }
}
