use std::collections::HashMap;

use crate::{
    catalog::{Column, ColumnType},
    types::Row,
};

/// The result of any read against a null connection: zero rows, shaped
/// by whatever column metadata was known for the queried table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmptyResult {
    columns: Vec<Column>,
}

impl EmptyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind_column_meta(&mut self, columns: Vec<Column>) {
        self.columns = columns;
    }

    pub fn columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Logical type per column name; primary keys report as integers.
    pub fn column_types(&self) -> HashMap<String, ColumnType> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.column_type.logical()))
            .collect()
    }

    pub fn rows(&self) -> Vec<Row> {
        Vec::new()
    }

    pub fn cast_values(&self) -> Vec<Row> {
        self.rows()
    }

    /// Count logic downstream must see zero, never an absent value.
    pub fn count(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }
}
