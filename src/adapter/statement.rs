use core::fmt::Display;

use serde_derive::{Deserialize, Serialize};

/// High-level operation category a logged statement is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryPoint {
    Insert,
    Update,
    Delete,
    SelectAll,
    SelectOne,
    SelectValue,
    SelectValues,
    Execute,
}

impl Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::SelectAll => "select_all",
            Self::SelectOne => "select_one",
            Self::SelectValue => "select_value",
            Self::SelectValues => "select_values",
            Self::Execute => "execute",
        };
        write!(f, "{}", name)
    }
}

/// One entry of the execution log: either a statement that was
/// "executed", or the checkpoint marker dividing history so far from
/// history yet to come.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Statement {
    Checkpoint,
    Executed {
        entry_point: Option<EntryPoint>,
        content: String,
    },
}

impl Statement {
    pub fn new(entry_point: Option<EntryPoint>, content: &str) -> Self {
        Self::Executed {
            entry_point,
            content: content.to_owned(),
        }
    }

    pub fn entry_point(&self) -> Option<EntryPoint> {
        match self {
            Self::Checkpoint => None,
            Self::Executed { entry_point, .. } => *entry_point,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Checkpoint => None,
            Self::Executed { content, .. } => Some(content),
        }
    }

    pub fn is_checkpoint(&self) -> bool {
        matches!(self, Self::Checkpoint)
    }
}

// Executed statements match on their entry point alone, the text is
// opaque; a checkpoint only ever equals another checkpoint.
impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Checkpoint, Self::Checkpoint) => true,
            (
                Self::Executed { entry_point: a, .. },
                Self::Executed { entry_point: b, .. },
            ) => a == b,
            _ => false,
        }
    }
}
