use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::{
    catalog::{ColumnOptions, ColumnType, IndexOptions, IndexSelector, TableOptions},
    error::Result,
    types::Value,
};

/// One column of a `CreateTable` op.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    #[serde(default)]
    pub options: ColumnOptions,
}

impl ColumnSpec {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_owned(),
            column_type,
            options: ColumnOptions::new(),
        }
    }

    pub fn with_options(mut self, options: ColumnOptions) -> Self {
        self.options = options;
        self
    }
}

/// A single schema-definition call, reified so a whole schema can be
/// stored, shipped, and replayed against a catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SchemaOp {
    CreateTable {
        name: String,
        options: TableOptions,
        columns: Vec<ColumnSpec>,
    },
    AddColumn {
        table: String,
        name: String,
        column_type: ColumnType,
        options: ColumnOptions,
    },
    RemoveColumn {
        table: String,
        name: String,
    },
    RenameColumn {
        table: String,
        old: String,
        new: String,
    },
    ChangeColumn {
        table: String,
        name: String,
        column_type: ColumnType,
        options: ColumnOptions,
    },
    ChangeColumnDefault {
        table: String,
        name: String,
        default: Value,
    },
    RenameTable {
        old: String,
        new: String,
    },
    DropTable {
        name: String,
    },
    AddIndex {
        table: String,
        columns: Vec<String>,
        options: IndexOptions,
    },
    RemoveIndex {
        table: String,
        selector: IndexSelector,
    },
    EnableExtension {
        name: String,
    },
    AddFkConstraint {
        from_table: String,
        from_column: String,
        to_table: String,
        to_column: String,
    },
    AddPkConstraint {
        table: String,
        columns: Vec<String>,
    },
}

/// An ordered list of schema ops; replaying it in order reproduces the
/// declared schema.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaPlan {
    ops: Vec<SchemaOp>,
}

impl SchemaPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: SchemaOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn ops(&self) -> &[SchemaOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Collaborator hook that turns the configured schema path into a plan.
/// Invoked at most once per catalog, the first time table metadata is
/// requested.
pub trait SchemaSource {
    fn load(&self, path: &Path) -> Result<SchemaPlan>;
}

impl<F> SchemaSource for F
where
    F: Fn(&Path) -> Result<SchemaPlan>,
{
    fn load(&self, path: &Path) -> Result<SchemaPlan> {
        self(path)
    }
}
