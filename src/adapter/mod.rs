mod empty_result;
mod entry_point;
mod execution_log;
mod statement;

pub use empty_result::EmptyResult;
pub use execution_log::ExecutionLog;
pub use statement::{EntryPoint, Statement};

use log::debug;

use crate::{
    catalog::{
        Catalog, Column, ColumnOptions, ColumnType, Index, IndexOptions, IndexSelector,
        TableDefinition, TableOptions,
    },
    config::NullDbConfig,
    error::Result,
    schema::SchemaSource,
    types::{Row, Value},
};

pub const ADAPTER_NAME: &str = "NullDB";

/// A connection that talks to nobody. Schema-definition calls build the
/// in-memory catalog, statement-execution calls land in the execution
/// log and come back empty, inserts hand out surrogate ids. One instance
/// owns all of its state; drop it and the session is gone.
pub struct NullDbAdapter {
    config: NullDbConfig,
    catalog: Catalog,
    execution_log: ExecutionLog,
    last_unique_id: u64,
}

impl NullDbAdapter {
    pub fn new(config: NullDbConfig) -> Self {
        Self::build(config, None)
    }

    /// Like `new`, with a source for the one-shot schema load that fires
    /// the first time table metadata is requested.
    pub fn with_schema_source(config: NullDbConfig, source: Box<dyn SchemaSource>) -> Self {
        Self::build(config, Some(source))
    }

    fn build(config: NullDbConfig, source: Option<Box<dyn SchemaSource>>) -> Self {
        let catalog = Catalog::new(config.protocol, config.resolve_schema_path(), source);
        Self {
            config,
            catalog,
            execution_log: ExecutionLog::new(),
            last_unique_id: 0,
        }
    }

    pub fn adapter_name(&self) -> &'static str {
        ADAPTER_NAME
    }

    pub fn supports_migrations(&self) -> bool {
        true
    }

    pub fn config(&self) -> &NullDbConfig {
        &self.config
    }

    // ---- schema definition ----

    pub fn create_table<F>(&mut self, name: &str, options: TableOptions, body: F)
    where
        F: FnOnce(&mut TableDefinition),
    {
        self.catalog.create_table(name, options, body);
    }

    pub fn drop_table(&mut self, name: &str) -> bool {
        self.catalog.drop_table(name)
    }

    pub fn add_column(
        &mut self,
        table: &str,
        name: &str,
        column_type: ColumnType,
        opts: ColumnOptions,
    ) -> Result<()> {
        self.catalog.add_column(table, name, column_type, opts)
    }

    pub fn remove_column(&mut self, table: &str, name: &str) -> Result<()> {
        self.catalog.remove_column(table, name)
    }

    pub fn rename_column(&mut self, table: &str, old: &str, new: &str) -> Result<()> {
        self.catalog.rename_column(table, old, new)
    }

    pub fn change_column(
        &mut self,
        table: &str,
        name: &str,
        column_type: ColumnType,
        opts: ColumnOptions,
    ) -> Result<()> {
        self.catalog.change_column(table, name, column_type, opts)
    }

    pub fn change_column_default(&mut self, table: &str, name: &str, default: Value) -> Result<()> {
        self.catalog.change_column_default(table, name, default)
    }

    pub fn rename_table(&mut self, old: &str, new: &str) -> Result<()> {
        self.catalog.rename_table(old, new)
    }

    pub fn add_index(&mut self, table: &str, columns: &[&str], opts: IndexOptions) -> Result<Index> {
        self.catalog.add_index(table, columns, opts)
    }

    pub fn remove_index(&mut self, table: &str, selector: &IndexSelector) {
        self.catalog.remove_index(table, selector);
    }

    pub fn enable_extension(&mut self, name: &str) {
        self.catalog.enable_extension(name);
    }

    pub fn add_fk_constraint(
        &mut self,
        from_table: &str,
        from_column: &str,
        to_table: &str,
        to_column: &str,
    ) {
        self.catalog
            .add_fk_constraint(from_table, from_column, to_table, to_column);
    }

    pub fn add_pk_constraint(&mut self, table: &str, columns: &[&str]) {
        self.catalog.add_pk_constraint(table, columns);
    }

    // ---- introspection ----

    pub fn tables(&self) -> Vec<String> {
        self.catalog.table_names()
    }

    pub fn columns(&mut self, table: &str) -> Result<Vec<Column>> {
        self.catalog.columns(table)
    }

    pub fn indexes(&self, table: &str) -> &[Index] {
        self.catalog.indexes(table)
    }

    pub fn primary_key(&mut self, table: &str) -> Result<Option<String>> {
        self.catalog.primary_key(table)
    }

    pub fn execution_log(&self) -> &[Statement] {
        self.execution_log.all()
    }

    pub fn execution_log_since_checkpoint(&self) -> &[Statement] {
        self.execution_log.since_checkpoint()
    }

    /// Inserts a checkpoint into the log; see
    /// `execution_log_since_checkpoint`.
    pub fn checkpoint(&mut self) {
        self.execution_log.checkpoint();
    }

    /// Discard hook for harnesses that reuse one connection across
    /// logical sessions.
    pub fn clear_execution_log(&mut self) {
        self.execution_log.clear();
    }

    // ---- statement execution ----

    pub fn execute(&mut self, statement: &str) -> EmptyResult {
        self.with_entry_point(EntryPoint::Execute, |conn| {
            conn.log_statement(statement);
        });
        EmptyResult::new()
    }

    pub fn exec_query(&mut self, statement: &str) -> EmptyResult {
        self.log_statement(statement);
        EmptyResult::new()
    }

    /// Returns the caller's identity when it already has one, else the
    /// next surrogate id.
    pub fn insert(&mut self, statement: &str, identity: Option<u64>) -> u64 {
        let id = match identity {
            Some(id) => id,
            None => self.next_unique_id(),
        };
        self.with_entry_point(EntryPoint::Insert, |conn| {
            conn.log_statement(statement);
        });
        id
    }

    pub fn update(&mut self, statement: &str) -> usize {
        self.with_entry_point(EntryPoint::Update, |conn| {
            conn.log_statement(statement);
        });
        0
    }

    pub fn delete(&mut self, statement: &str) -> usize {
        self.with_entry_point(EntryPoint::Delete, |conn| {
            conn.log_statement(statement);
        });
        0
    }

    /// `name` is the table the query is understood to target, when the
    /// caller knows it; it shapes the column metadata of the result.
    pub fn select_all(&mut self, statement: &str, name: Option<&str>) -> EmptyResult {
        self.with_entry_point(EntryPoint::SelectAll, |conn| conn.select(statement, name))
    }

    pub fn select_one(&mut self, statement: &str, name: Option<&str>) -> EmptyResult {
        self.with_entry_point(EntryPoint::SelectOne, |conn| conn.select(statement, name))
    }

    pub fn select_value(&mut self, statement: &str) -> Value {
        self.with_entry_point(EntryPoint::SelectValue, |conn| {
            conn.log_statement(statement);
        });
        // count-style reads see zero, never an absent value
        Value::Int(0)
    }

    pub fn select_values(&mut self, statement: &str) -> Vec<Value> {
        self.with_entry_point(EntryPoint::SelectValues, |conn| {
            conn.log_statement(statement);
        });
        Vec::new()
    }

    pub fn select_rows(&mut self, statement: &str) -> Vec<Row> {
        self.log_statement(statement);
        Vec::new()
    }

    // ---- entry-point tagging ----

    /// Runs `body` with the ambient entry point set to `entry_point` for
    /// this call stack. Nested machinery that logs while `body` runs is
    /// attributed to the outermost tag; the prior state comes back on
    /// every exit path.
    pub fn with_entry_point<T, F>(&mut self, entry_point: EntryPoint, body: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let _guard = entry_point::enter(entry_point);
        body(self)
    }

    pub fn current_entry_point(&self) -> Option<EntryPoint> {
        entry_point::current()
    }

    fn select(&mut self, statement: &str, name: Option<&str>) -> EmptyResult {
        let mut result = EmptyResult::new();
        if let Some(table) = name {
            result.bind_column_meta(self.catalog.columns_for(table));
        }
        self.log_statement(statement);
        result
    }

    fn log_statement(&mut self, statement: &str) {
        let entry_point = entry_point::current();
        debug!("log_statement [{:?}]: {}", entry_point, statement);
        self.execution_log.append(entry_point, statement);
    }

    fn next_unique_id(&mut self) -> u64 {
        self.last_unique_id += 1;
        self.last_unique_id
    }
}
