use serde_derive::{Deserialize, Serialize};

use super::column::{Column, ColumnOptions, ColumnType};
use crate::config::SchemaProtocol;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Auto-add a primary-key column. On by default.
    pub id: bool,
    /// Name for the auto-added primary key; "id" when unset.
    pub primary_key: Option<String>,
    pub temporary: bool,
    pub force: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            id: true,
            primary_key: None,
            temporary: false,
            force: false,
        }
    }
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_id(mut self) -> Self {
        self.id = false;
        self
    }

    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key = Some(name.to_owned());
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Column set of one table, in declaration order. Built up inside a
/// `create_table` call and committed to the catalog when the call
/// returns; also what the catalog stores afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<Column>,
    pub temporary: bool,
}

impl TableDefinition {
    pub(crate) fn build(protocol: SchemaProtocol, name: &str, options: &TableOptions) -> Self {
        // legacy-protocol definitions never carried table options
        let temporary = match protocol {
            SchemaProtocol::Modern => options.temporary,
            SchemaProtocol::Legacy => false,
        };

        Self {
            name: name.to_owned(),
            columns: Vec::new(),
            temporary,
        }
    }

    /// Appends a column, or replaces it in place when one of the same
    /// name was already declared.
    pub fn column(&mut self, name: &str, column_type: ColumnType, opts: ColumnOptions) -> &mut Self {
        let column = Column::new(name, column_type, opts);
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
        self
    }

    pub fn primary_key(&mut self, name: &str) -> &mut Self {
        self.column(name, ColumnType::PrimaryKey, ColumnOptions::new())
    }

    pub fn string(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::String, opts)
    }

    pub fn text(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Text, opts)
    }

    pub fn integer(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Integer, opts)
    }

    pub fn float(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Float, opts)
    }

    pub fn decimal(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Decimal, opts)
    }

    pub fn date(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Date, opts)
    }

    pub fn datetime(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::DateTime, opts)
    }

    pub fn time(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Time, opts)
    }

    pub fn boolean(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Boolean, opts)
    }

    pub fn binary(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Binary, opts)
    }

    pub fn json(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Json, opts)
    }

    // postgres-flavored aliases
    pub fn citext(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.text(name, opts)
    }

    pub fn interval(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.text(name, opts)
    }

    pub fn geometry(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.text(name, opts)
    }

    pub fn jsonb(&mut self, name: &str, opts: ColumnOptions) -> &mut Self {
        self.json(name, opts)
    }
}
