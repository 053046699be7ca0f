use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    fmt_err,
    types::Value,
};

/// Declared column type. The set is open in the sense that unfamiliar
/// names can be aliased onto a member here; `from_name` carries the
/// aliases the adapter recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    PrimaryKey,
    String,
    Text,
    Integer,
    Float,
    Decimal,
    Date,
    DateTime,
    Time,
    Boolean,
    Binary,
    Json,
}

impl ColumnType {
    pub fn from_name(name: &str) -> Result<Self> {
        let column_type = match name {
            "primary_key" => Self::PrimaryKey,
            "string" => Self::String,
            "text" | "citext" | "interval" | "geometry" => Self::Text,
            "integer" | "bigint" => Self::Integer,
            "float" => Self::Float,
            "decimal" => Self::Decimal,
            "date" => Self::Date,
            "datetime" | "timestamp" => Self::DateTime,
            "time" => Self::Time,
            "boolean" => Self::Boolean,
            "binary" => Self::Binary,
            "json" | "jsonb" => Self::Json,
            t => {
                return Err(Error::ArgumentErr(fmt_err!("unknown column type: {}", t)));
            }
        };

        Ok(column_type)
    }

    /// The type reported in result metadata. Primary keys read as plain
    /// integers everywhere outside the schema itself.
    pub fn logical(&self) -> ColumnType {
        match self {
            Self::PrimaryKey => Self::Integer,
            t => *t,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnOptions {
    pub null: Option<bool>,
    pub default: Option<Value>,
    pub limit: Option<u32>,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub null: bool,
    pub default: Option<Value>,
    pub limit: Option<u32>,
    pub primary_key: bool,
}

impl Column {
    pub fn new(name: &str, column_type: ColumnType, opts: ColumnOptions) -> Self {
        let primary_key = column_type == ColumnType::PrimaryKey;
        Self {
            name: name.to_owned(),
            column_type,
            null: opts.null.unwrap_or(!primary_key),
            default: opts.default,
            limit: opts.limit,
            primary_key,
        }
    }
}
