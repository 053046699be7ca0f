use std::path::PathBuf;

use serde_derive::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    fmt_err,
};

/// Schema path used when the caller does not name one, relative to the
/// project root.
pub const DEFAULT_SCHEMA_PATH: &str = "db/schema.plan";

/// Which table-definition protocol of the host data-access layer the
/// catalog speaks. Selected explicitly through configuration instead of
/// sniffing the collaborator at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaProtocol {
    /// Majors 2 and 3: table definitions carry no per-table options.
    Legacy,
    /// Major 4: table definitions retain their options.
    Modern,
}

impl SchemaProtocol {
    pub fn from_major(major: u32) -> Result<Self> {
        match major {
            2 | 3 => Ok(Self::Legacy),
            4 => Ok(Self::Modern),
            v => Err(Error::UnsupportedErr(fmt_err!(
                "unsupported table-definition protocol major version: {}",
                v
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NullDbConfig {
    /// Path to the declarative schema definition, absolute or relative to
    /// `project_root`.
    pub schema: PathBuf,
    pub project_root: Option<PathBuf>,
    pub protocol: SchemaProtocol,
}

impl Default for NullDbConfig {
    fn default() -> Self {
        Self {
            schema: PathBuf::from(DEFAULT_SCHEMA_PATH),
            project_root: None,
            protocol: SchemaProtocol::Modern,
        }
    }
}

impl NullDbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.schema = path.into();
        self
    }

    pub fn with_project_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.project_root = Some(root.into());
        self
    }

    pub fn with_protocol(mut self, protocol: SchemaProtocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Absolute schema paths are used as-is; relative ones are joined to
    /// the project root supplied by the collaborator.
    pub fn resolve_schema_path(&self) -> PathBuf {
        if self.schema.is_absolute() {
            return self.schema.clone();
        }
        match &self.project_root {
            Some(root) => root.join(&self.schema),
            None => self.schema.clone(),
        }
    }
}
