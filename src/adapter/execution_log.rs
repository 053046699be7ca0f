use super::statement::{EntryPoint, Statement};

/// Everything a connection has been asked to "execute", in order.
/// Appending is the only way the log grows; `clear` exists so a test
/// harness can isolate logical sessions sharing one connection.
#[derive(Clone, Debug, Default)]
pub struct ExecutionLog {
    entries: Vec<Statement>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry_point: Option<EntryPoint>, content: &str) {
        self.entries.push(Statement::new(entry_point, content));
    }

    pub fn checkpoint(&mut self) {
        self.entries.push(Statement::Checkpoint);
    }

    pub fn all(&self) -> &[Statement] {
        &self.entries
    }

    /// Suffix after the last checkpoint, or the whole log when none has
    /// been inserted. Recomputed every call, the log moves underneath.
    pub fn since_checkpoint(&self) -> &[Statement] {
        match self.entries.iter().rposition(|s| *s == Statement::Checkpoint) {
            Some(i) => &self.entries[i + 1..],
            None => &self.entries,
        }
    }

    pub fn contains(&self, entry_point: EntryPoint) -> bool {
        let probe = Statement::new(Some(entry_point), "");
        self.entries.iter().any(|s| *s == probe)
    }

    pub fn contains_since_checkpoint(&self, entry_point: EntryPoint) -> bool {
        let probe = Statement::new(Some(entry_point), "");
        self.since_checkpoint().iter().any(|s| *s == probe)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
