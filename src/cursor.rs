//! Statement execution and result iteration.
//!
//! A [`Cursor`] sends one complete statement at a time through its session
//! and buffers the decoded result set. Rows come back in server order via
//! [`Cursor::fetch_one`] and [`Cursor::fetch_all`]; executing again discards
//! whatever the previous statement produced.
use std::io::{Read, Write};

use log::debug;

use crate::error::{Error, Result};
use crate::marshal::{self, Value, WireType};
use crate::protocol::{Column, CqlResult, RawRow};
use crate::session::Session;

/// One decoded result row, positionally aligned with the result set's
/// column descriptors.
#[derive(Debug, Clone, PartialEq)]
pub struct Row(Vec<Value>);

impl Row {
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A statement execution handle bound to one session.
///
/// The exclusive borrow keeps one statement in flight per session at a time.
pub struct Cursor<'a, T: Read + Write> {
    session: &'a mut Session<T>,
    columns: Vec<Column>,
    rows: Vec<Row>,
    pos: usize,
    open: bool,
}

impl<'a, T: Read + Write> Cursor<'a, T> {
    pub(crate) fn new(session: &'a mut Session<T>) -> Self {
        Self {
            session,
            columns: Vec::new(),
            rows: Vec::new(),
            pos: 0,
            open: true,
        }
    }

    /// Executes one complete statement and buffers its decoded result set.
    ///
    /// Returns the statement's row count, or `None` when it has none to
    /// report. The previous result set is discarded before anything is sent.
    /// When a row fails to decode the whole call fails and the cursor
    /// exposes no partial result.
    pub fn execute(&mut self, query: &str) -> Result<Option<u64>> {
        self.guard()?;
        self.columns.clear();
        self.rows.clear();
        self.pos = 0;

        debug!("executing {} byte statement", query.len());
        match self.session.client_mut()?.execute(query.as_bytes())? {
            CqlResult::Void => Ok(None),
            CqlResult::Count(n) => Ok(Some(n)),
            CqlResult::Rows { columns, rows } => {
                let decoded = decode_rows(&columns, rows)?;
                debug!("statement returned {} row(s)", decoded.len());
                self.columns = columns;
                self.rows = decoded;
                Ok(Some(self.rows.len() as u64))
            }
        }
    }

    /// Next row of the current result set, in server-returned order.
    pub fn fetch_one(&mut self) -> Result<Option<&Row>> {
        self.guard()?;
        let row = self.rows.get(self.pos);
        if row.is_some() {
            self.pos += 1;
        }
        Ok(row)
    }

    /// All remaining rows of the current result set, drained.
    pub fn fetch_all(&mut self) -> Result<Vec<Row>> {
        self.guard()?;
        let rest = self.rows.split_off(self.pos);
        self.pos = self.rows.len();
        Ok(rest)
    }

    /// Descriptors of the current result set, one per output column.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Total rows buffered by the last execute.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Releases the buffered result set; the cursor cannot be used again.
    pub fn close(&mut self) {
        self.open = false;
        self.columns.clear();
        self.rows.clear();
        self.pos = 0;
    }

    fn guard(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::Programming("cursor has been closed".to_string()))
        }
    }
}

/// Resolves each column's wire type once, then decodes every row against
/// the resolved table. Column types of an empty result set are never
/// resolved, so a statement returning no rows cannot fail here.
fn decode_rows(columns: &[Column], rows: Vec<RawRow>) -> Result<Vec<Row>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let types = columns
        .iter()
        .map(|column| {
            WireType::from_tag(&column.type_tag).ok_or_else(|| {
                Error::NotSupported(format!(
                    "unknown wire type '{}' for column '{}'",
                    column.type_tag, column.name
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    rows.into_iter().map(|raw| decode_row(&types, raw)).collect()
}

fn decode_row(types: &[WireType], raw: RawRow) -> Result<Row> {
    if raw.len() != types.len() {
        return Err(Error::Decode {
            kind: "row".to_string(),
            reason: format!("expected {} cell(s), got {}", types.len(), raw.len()),
        });
    }
    raw.iter()
        .zip(types)
        .map(|(cell, ty)| marshal::decode(*ty, cell))
        .collect::<Result<Vec<Value>>>()
        .map(Row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Response;
    use crate::testutil::{rows_response, scripted_session};

    fn people_response() -> Response {
        rows_response(
            &[("name", "UTF8Type"), ("age", "LongType")],
            vec![
                vec![b"ada".to_vec(), 36_i64.to_be_bytes().to_vec()],
                vec![b"grace".to_vec(), 47_i64.to_be_bytes().to_vec()],
            ],
        )
    }

    #[test]
    fn execute_buffers_and_fetch_iterates_in_order() {
        let mut session = scripted_session(&[people_response()]);
        let mut cursor = session.cursor().unwrap();

        assert_eq!(cursor.execute("SELECT * FROM people;").unwrap(), Some(2));
        assert_eq!(cursor.row_count(), 2);
        assert_eq!(cursor.columns()[0].name, "name");
        assert_eq!(cursor.columns()[1].name, "age");

        let first = cursor.fetch_one().unwrap().unwrap();
        assert_eq!(first.get(0), Some(&Value::Text("ada".to_string())));
        assert_eq!(first.get(1), Some(&Value::Bigint(36)));

        let second = cursor.fetch_one().unwrap().unwrap();
        assert_eq!(second.get(0), Some(&Value::Text("grace".to_string())));

        assert!(cursor.fetch_one().unwrap().is_none());
        assert!(cursor.fetch_one().unwrap().is_none());
    }

    #[test]
    fn fetch_all_drains_whats_left() {
        let mut session = scripted_session(&[people_response()]);
        let mut cursor = session.cursor().unwrap();
        cursor.execute("SELECT * FROM people;").unwrap();

        cursor.fetch_one().unwrap();
        let rest = cursor.fetch_all().unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].get(0), Some(&Value::Text("grace".to_string())));

        assert!(cursor.fetch_all().unwrap().is_empty());
        assert!(cursor.fetch_one().unwrap().is_none());
    }

    #[test]
    fn void_results_report_no_count() {
        let mut session = scripted_session(&[Response::Result(CqlResult::Void)]);
        let mut cursor = session.cursor().unwrap();

        assert_eq!(cursor.execute("TRUNCATE people;").unwrap(), None);
        assert!(cursor.columns().is_empty());
        assert!(cursor.fetch_one().unwrap().is_none());
    }

    #[test]
    fn count_results_pass_through() {
        let mut session = scripted_session(&[Response::Result(CqlResult::Count(42))]);
        let mut cursor = session.cursor().unwrap();

        assert_eq!(
            cursor.execute("DELETE FROM people WHERE age > 1;").unwrap(),
            Some(42)
        );
        assert_eq!(cursor.row_count(), 0);
    }

    #[test]
    fn zero_row_results_keep_their_columns() {
        let response = rows_response(&[("name", "UTF8Type")], vec![]);
        let mut session = scripted_session(&[response]);
        let mut cursor = session.cursor().unwrap();

        assert_eq!(cursor.execute("SELECT * FROM people;").unwrap(), Some(0));
        assert_eq!(cursor.columns().len(), 1);
        assert!(cursor.fetch_one().unwrap().is_none());
    }

    #[test]
    fn unknown_column_type_with_rows_is_not_supported() {
        let response = rows_response(
            &[("payload", "x.y.VectorType")],
            vec![vec![b"whatever".to_vec()]],
        );
        let mut session = scripted_session(&[response]);
        let mut cursor = session.cursor().unwrap();

        let err = cursor.execute("SELECT * FROM exotic;").unwrap_err();
        assert!(matches!(err, Error::NotSupported(_)));
        assert_eq!(cursor.row_count(), 0);
    }

    #[test]
    fn unknown_column_type_without_rows_succeeds() {
        let response = rows_response(&[("payload", "x.y.VectorType")], vec![]);
        let mut session = scripted_session(&[response]);
        let mut cursor = session.cursor().unwrap();

        assert_eq!(cursor.execute("SELECT * FROM exotic;").unwrap(), Some(0));
    }

    #[test]
    fn empty_cells_decode_as_null() {
        let response = rows_response(
            &[("name", "UTF8Type"), ("age", "LongType")],
            vec![vec![Vec::new(), Vec::new()]],
        );
        let mut session = scripted_session(&[response]);
        let mut cursor = session.cursor().unwrap();

        cursor.execute("SELECT * FROM people;").unwrap();
        let row = cursor.fetch_one().unwrap().unwrap();
        assert_eq!(row.values(), &[Value::Null, Value::Null]);
    }

    #[test]
    fn malformed_cell_fails_without_partial_results() {
        let response = rows_response(
            &[("age", "LongType")],
            vec![
                vec![36_i64.to_be_bytes().to_vec()],
                vec![vec![0x01, 0x02]],
            ],
        );
        let mut session = scripted_session(&[response]);
        let mut cursor = session.cursor().unwrap();

        let err = cursor.execute("SELECT * FROM people;").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(cursor.row_count(), 0);
        assert!(cursor.fetch_one().unwrap().is_none());
    }

    #[test]
    fn cell_count_mismatch_is_a_decode_error() {
        let response = rows_response(
            &[("name", "UTF8Type"), ("age", "LongType")],
            vec![vec![b"ada".to_vec()]],
        );
        let mut session = scripted_session(&[response]);
        let mut cursor = session.cursor().unwrap();

        let err = cursor.execute("SELECT * FROM people;").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn re_execute_discards_previous_results() {
        let second = rows_response(
            &[("name", "UTF8Type")],
            vec![vec![b"hopper".to_vec()]],
        );
        let mut session = scripted_session(&[people_response(), second]);
        let mut cursor = session.cursor().unwrap();

        cursor.execute("SELECT * FROM people;").unwrap();
        cursor.fetch_one().unwrap();

        assert_eq!(cursor.execute("SELECT name FROM people;").unwrap(), Some(1));
        assert_eq!(cursor.columns().len(), 1);
        let row = cursor.fetch_one().unwrap().unwrap();
        assert_eq!(row.get(0), Some(&Value::Text("hopper".to_string())));
    }

    #[test]
    fn closed_cursor_refuses_everything() {
        let mut session = scripted_session(&[people_response()]);
        let mut cursor = session.cursor().unwrap();
        cursor.execute("SELECT * FROM people;").unwrap();
        cursor.close();

        assert!(matches!(
            cursor.execute("SELECT 1;").unwrap_err(),
            Error::Programming(_)
        ));
        assert!(matches!(
            cursor.fetch_one().unwrap_err(),
            Error::Programming(_)
        ));
        assert!(matches!(
            cursor.fetch_all().unwrap_err(),
            Error::Programming(_)
        ));
        assert_eq!(cursor.row_count(), 0);
    }

    #[test]
    fn session_survives_its_cursor() {
        let mut session = scripted_session(&[
            Response::Result(CqlResult::Void),
            Response::Result(CqlResult::Count(1)),
        ]);

        {
            let mut cursor = session.cursor().unwrap();
            cursor.execute("TRUNCATE people;").unwrap();
        }

        let mut cursor = session.cursor().unwrap();
        assert_eq!(
            cursor.execute("DELETE FROM people WHERE k = 1;").unwrap(),
            Some(1)
        );
    }
}
