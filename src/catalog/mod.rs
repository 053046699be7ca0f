mod column;
mod index;
mod table;

pub use column::{Column, ColumnOptions, ColumnType};
pub use index::{Index, IndexOptions, IndexSelector};
pub use table::{TableDefinition, TableOptions};

use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;

use crate::{
    config::SchemaProtocol,
    error::{Error, Result},
    fmt_err,
    schema::{SchemaOp, SchemaPlan, SchemaSource},
    types::Value,
};

/// Predefined so migration-tracking probes succeed before any schema has
/// been loaded. Also the sentinel for "nothing loaded yet".
pub const BOOTSTRAP_TABLE: &str = "schema_info";

const INDEX_NAME_LENGTH: usize = 64;

/// In-memory mirror of the schema a collaborator has declared: tables in
/// declaration order, their columns, and their indexes. Nothing here ever
/// touches real storage.
pub struct Catalog {
    table_vec: Vec<TableDefinition>,
    table_slots: HashMap<String, usize>,
    indexes: HashMap<String, Vec<Index>>,
    protocol: SchemaProtocol,
    schema_path: PathBuf,
    schema_source: Option<Box<dyn SchemaSource>>,
}

impl Catalog {
    pub fn new(
        protocol: SchemaProtocol,
        schema_path: PathBuf,
        schema_source: Option<Box<dyn SchemaSource>>,
    ) -> Self {
        let bootstrap = TableDefinition::build(protocol, BOOTSTRAP_TABLE, &TableOptions::new());
        let mut table_slots = HashMap::new();
        table_slots.insert(bootstrap.name.clone(), 0);

        Self {
            table_vec: vec![bootstrap],
            table_slots,
            indexes: HashMap::new(),
            protocol,
            schema_path,
            schema_source,
        }
    }

    /// Declares a table, overwriting any prior definition of the same
    /// name. The builder only lives for the duration of `body`; whatever
    /// it accumulated is committed when `body` returns.
    pub fn create_table<F>(&mut self, name: &str, options: TableOptions, body: F)
    where
        F: FnOnce(&mut TableDefinition),
    {
        let mut table = TableDefinition::build(self.protocol, name, &options);
        if options.id {
            let pk_name = options.primary_key.as_deref().unwrap_or("id");
            table.primary_key(pk_name);
        }
        body(&mut table);

        debug!("create_table: {} ({} columns)", name, table.columns.len());
        self.commit_table(table);
    }

    pub fn drop_table(&mut self, name: &str) -> bool {
        match self.table_slots.remove(name) {
            Some(slot) => {
                self.table_vec.remove(slot);
                for s in self.table_slots.values_mut() {
                    if *s > slot {
                        *s -= 1;
                    }
                }
                self.indexes.remove(name);
                true
            }
            None => false,
        }
    }

    pub fn add_column(
        &mut self,
        table: &str,
        name: &str,
        column_type: ColumnType,
        opts: ColumnOptions,
    ) -> Result<()> {
        self.table_mut(table)?.column(name, column_type, opts);
        Ok(())
    }

    /// Removing a column that was never declared is a no-op, matching the
    /// absent-data rule for lookups.
    pub fn remove_column(&mut self, table: &str, name: &str) -> Result<()> {
        self.table_mut(table)?.columns.retain(|c| c.name != name);
        Ok(())
    }

    pub fn rename_column(&mut self, table: &str, old: &str, new: &str) -> Result<()> {
        let table_def = self.table_mut(table)?;
        match table_def.columns.iter_mut().find(|c| c.name == old) {
            Some(column) => {
                column.name = new.to_owned();
                Ok(())
            }
            None => Err(Error::ArgumentErr(fmt_err!(
                "no column '{}' on table '{}'",
                old,
                table
            ))),
        }
    }

    /// Replaces the column's type and options, keeping its position.
    pub fn change_column(
        &mut self,
        table: &str,
        name: &str,
        column_type: ColumnType,
        opts: ColumnOptions,
    ) -> Result<()> {
        let table_def = self.table_mut(table)?;
        match table_def.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => {
                *column = Column::new(name, column_type, opts);
                Ok(())
            }
            None => Err(Error::ArgumentErr(fmt_err!(
                "no column '{}' on table '{}'",
                name,
                table
            ))),
        }
    }

    pub fn change_column_default(&mut self, table: &str, name: &str, default: Value) -> Result<()> {
        let table_def = self.table_mut(table)?;
        match table_def.columns.iter_mut().find(|c| c.name == name) {
            Some(column) => {
                column.default = Some(default);
                Ok(())
            }
            None => Err(Error::ArgumentErr(fmt_err!(
                "no column '{}' on table '{}'",
                name,
                table
            ))),
        }
    }

    /// Moves the definition and every index bound to it; column order is
    /// untouched.
    pub fn rename_table(&mut self, old: &str, new: &str) -> Result<()> {
        let slot = match self.table_slots.remove(old) {
            Some(slot) => slot,
            None => {
                return Err(Error::ArgumentErr(fmt_err!("unknown table: {}", old)));
            }
        };
        if self.table_slots.contains_key(new) {
            self.drop_table(new);
        }

        self.table_vec[slot].name = new.to_owned();
        self.table_slots.insert(new.to_owned(), slot);

        if let Some(mut moved) = self.indexes.remove(old) {
            for index in &mut moved {
                index.table = new.to_owned();
            }
            self.indexes.entry(new.to_owned()).or_default().extend(moved);
        }
        Ok(())
    }

    /// Index name comes from the options, else is derived from the table
    /// and column names. The table itself does not have to exist.
    pub fn add_index(&mut self, table: &str, columns: &[&str], opts: IndexOptions) -> Result<Index> {
        let columns: Vec<String> = columns.iter().map(|c| (*c).to_owned()).collect();
        let name = match opts.name {
            Some(name) => name,
            None => format!("index_{}_on_{}", table, columns.join("_and_")),
        };

        if name.len() > INDEX_NAME_LENGTH {
            return Err(Error::ArgumentErr(fmt_err!(
                "index name '{}' on table '{}' is too long; the limit is {} characters",
                name,
                table,
                INDEX_NAME_LENGTH
            )));
        }

        let entries = self.indexes.entry(table.to_owned()).or_default();
        if entries.iter().any(|i| i.name == name) {
            return Err(Error::ArgumentErr(fmt_err!(
                "index name '{}' on table '{}' already exists",
                name,
                table
            )));
        }

        let index = Index::new(table, &name, columns, opts.unique);
        entries.push(index.clone());
        Ok(index)
    }

    /// No-op when nothing matches.
    pub fn remove_index(&mut self, table: &str, selector: &IndexSelector) {
        if let Some(entries) = self.indexes.get_mut(table) {
            entries.retain(|i| !selector.matches(i));
        }
    }

    pub fn enable_extension(&mut self, name: &str) {
        debug!("enable_extension: {} (recorded, nothing to enable)", name);
    }

    pub fn add_fk_constraint(
        &mut self,
        _from_table: &str,
        _from_column: &str,
        _to_table: &str,
        _to_column: &str,
    ) {
    }

    pub fn add_pk_constraint(&mut self, _table: &str, _columns: &[&str]) {}

    /// Table names in declaration order.
    pub fn table_names(&self) -> Vec<String> {
        self.table_vec.iter().map(|t| t.name.clone()).collect()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.table_slots.contains_key(name)
    }

    pub fn table(&self, name: &str) -> Option<&TableDefinition> {
        self.table_slots.get(name).map(|&slot| &self.table_vec[slot])
    }

    /// Columns of `table` in declaration order; empty for tables the
    /// schema never mentioned. The first call while only the bootstrap
    /// table exists pulls in the configured declarative schema.
    pub fn columns(&mut self, table: &str) -> Result<Vec<Column>> {
        self.load_schema_if_needed()?;
        Ok(self.columns_for(table))
    }

    /// Same lookup without the bootstrap trigger; used when shaping read
    /// results.
    pub(crate) fn columns_for(&self, table: &str) -> Vec<Column> {
        match self.table_slots.get(table) {
            Some(&slot) => self.table_vec[slot].columns.clone(),
            None => Vec::new(),
        }
    }

    pub fn indexes(&self, table: &str) -> &[Index] {
        match self.indexes.get(table) {
            Some(entries) => entries,
            None => &[],
        }
    }

    /// Name of the first column flagged as primary key, if any.
    pub fn primary_key(&mut self, table: &str) -> Result<Option<String>> {
        Ok(self
            .columns(table)?
            .into_iter()
            .find(|c| c.primary_key)
            .map(|c| c.name))
    }

    /// Replays a declarative schema plan through the regular definition
    /// calls, stopping at the first failing op.
    pub fn apply(&mut self, plan: &SchemaPlan) -> Result<()> {
        for op in plan.ops() {
            self.apply_op(op)?;
        }
        Ok(())
    }

    fn apply_op(&mut self, op: &SchemaOp) -> Result<()> {
        match op {
            SchemaOp::CreateTable {
                name,
                options,
                columns,
            } => {
                self.create_table(name, options.clone(), |t| {
                    for spec in columns {
                        t.column(&spec.name, spec.column_type, spec.options.clone());
                    }
                });
                Ok(())
            }
            SchemaOp::AddColumn {
                table,
                name,
                column_type,
                options,
            } => self.add_column(table, name, *column_type, options.clone()),
            SchemaOp::RemoveColumn { table, name } => self.remove_column(table, name),
            SchemaOp::RenameColumn { table, old, new } => self.rename_column(table, old, new),
            SchemaOp::ChangeColumn {
                table,
                name,
                column_type,
                options,
            } => self.change_column(table, name, *column_type, options.clone()),
            SchemaOp::ChangeColumnDefault {
                table,
                name,
                default,
            } => self.change_column_default(table, name, default.clone()),
            SchemaOp::RenameTable { old, new } => self.rename_table(old, new),
            SchemaOp::DropTable { name } => {
                self.drop_table(name);
                Ok(())
            }
            SchemaOp::AddIndex {
                table,
                columns,
                options,
            } => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                self.add_index(table, &columns, options.clone())?;
                Ok(())
            }
            SchemaOp::RemoveIndex { table, selector } => {
                self.remove_index(table, selector);
                Ok(())
            }
            SchemaOp::EnableExtension { name } => {
                self.enable_extension(name);
                Ok(())
            }
            SchemaOp::AddFkConstraint {
                from_table,
                from_column,
                to_table,
                to_column,
            } => {
                self.add_fk_constraint(from_table, from_column, to_table, to_column);
                Ok(())
            }
            SchemaOp::AddPkConstraint { table, columns } => {
                let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
                self.add_pk_constraint(table, &columns);
                Ok(())
            }
        }
    }

    fn load_schema_if_needed(&mut self) -> Result<()> {
        if self.table_vec.len() > 1 {
            return Ok(());
        }
        // take the source out first, so this runs at most once even if
        // the replay itself asks for columns
        let source = match self.schema_source.take() {
            Some(source) => source,
            None => return Ok(()),
        };

        debug!(
            "loading declarative schema from {}",
            self.schema_path.display()
        );
        let plan = source.load(&self.schema_path)?;
        self.apply(&plan)
    }

    fn commit_table(&mut self, table: TableDefinition) {
        match self.table_slots.get(&table.name) {
            Some(&slot) => self.table_vec[slot] = table,
            None => {
                self.table_slots.insert(table.name.clone(), self.table_vec.len());
                self.table_vec.push(table);
            }
        }
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut TableDefinition> {
        match self.table_slots.get(name) {
            Some(&slot) => Ok(&mut self.table_vec[slot]),
            None => Err(Error::ArgumentErr(fmt_err!("unknown table: {}", name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnSpec;
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    fn catalog() -> Catalog {
        Catalog::new(
            SchemaProtocol::Modern,
            PathBuf::from("db/schema.plan"),
            None,
        )
    }

    #[test]
    fn declared_columns_keep_their_order_and_metadata() {
        let mut catalog = catalog();
        catalog.create_table("employees", TableOptions::new().without_id(), |t| {
            t.string("name", ColumnOptions::new().null(false).limit(50));
            t.date("hire_date", ColumnOptions::new());
            t.integer("employee_number", ColumnOptions::new());
            t.decimal("salary", ColumnOptions::new());
        });

        let columns = catalog.columns("employees").unwrap();
        assert_eq!(columns.len(), 4);

        assert_eq!(columns[0].name, "name");
        assert_eq!(columns[0].column_type, ColumnType::String);
        assert_eq!(columns[0].limit, Some(50));
        assert!(!columns[0].null);

        assert_eq!(columns[1].name, "hire_date");
        assert_eq!(columns[1].column_type, ColumnType::Date);

        assert_eq!(columns[2].name, "employee_number");
        assert_eq!(columns[2].column_type, ColumnType::Integer);

        assert_eq!(columns[3].name, "salary");
        assert_eq!(columns[3].column_type, ColumnType::Decimal);
    }

    #[test]
    fn auto_primary_key_is_the_first_column() {
        let mut catalog = catalog();
        catalog.create_table("employees", TableOptions::new(), |t| {
            t.string("name", ColumnOptions::new());
        });

        let columns = catalog.columns("employees").unwrap();
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].primary_key);
        assert_eq!(
            catalog.primary_key("employees").unwrap(),
            Some("id".to_owned())
        );
    }

    #[test]
    fn caller_named_primary_keys_are_honored() {
        let mut catalog = catalog();
        catalog.create_table(
            "employees",
            TableOptions::new().primary_key("employee_id"),
            |_| {},
        );
        assert_eq!(
            catalog.primary_key("employees").unwrap(),
            Some("employee_id".to_owned())
        );
    }

    #[test]
    fn redeclaring_a_table_overwrites_it() {
        let mut catalog = catalog();
        catalog.create_table("employees", TableOptions::new(), |t| {
            t.string("name", ColumnOptions::new());
        });
        catalog.create_table("employees", TableOptions::new().without_id(), |t| {
            t.integer("badge", ColumnOptions::new());
        });

        let columns = catalog.columns("employees").unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "badge");
    }

    #[test]
    fn unknown_tables_read_as_empty() {
        let mut catalog = catalog();
        assert!(catalog.columns("nowhere").unwrap().is_empty());
        assert!(catalog.indexes("nowhere").is_empty());
        assert_eq!(catalog.primary_key("nowhere").unwrap(), None);
    }

    #[test]
    fn mutating_an_unknown_table_is_an_error() {
        let mut catalog = catalog();
        assert!(catalog
            .add_column("nowhere", "c", ColumnType::String, ColumnOptions::new())
            .is_err());
        assert!(catalog.rename_table("nowhere", "somewhere").is_err());
        assert!(catalog.rename_column("nowhere", "a", "b").is_err());
    }

    #[test]
    fn derived_index_names_follow_the_column_list() {
        let mut catalog = catalog();
        let index = catalog
            .add_index("employees", &["employee_id", "widget_id"], IndexOptions::new())
            .unwrap();
        assert_eq!(index.name, "index_employees_on_employee_id_and_widget_id");
        assert!(!index.unique);
    }

    #[test]
    fn duplicate_index_names_are_rejected() {
        let mut catalog = catalog();
        catalog
            .add_index("employees", &["name"], IndexOptions::new().named("idx"))
            .unwrap();
        let err = catalog
            .add_index("employees", &["salary"], IndexOptions::new().named("idx"))
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentErr(_)));

        // the same name on another table is fine
        catalog
            .add_index("widgets", &["name"], IndexOptions::new().named("idx"))
            .unwrap();
    }

    #[test]
    fn overlong_index_names_are_rejected() {
        let mut catalog = catalog();
        let name = "x".repeat(INDEX_NAME_LENGTH + 1);
        let err = catalog
            .add_index("employees", &["name"], IndexOptions::new().named(&name))
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentErr(_)));

        // derived names hit the same limit
        let column = "c".repeat(INDEX_NAME_LENGTH);
        let err = catalog
            .add_index("employees", &[column.as_str()], IndexOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::ArgumentErr(_)));
    }

    #[test]
    fn remove_index_ignores_missing_definitions() {
        let mut catalog = catalog();
        catalog.remove_index("employees", &IndexSelector::Name("nope".to_owned()));

        catalog
            .add_index("employees", &["name"], IndexOptions::new())
            .unwrap();
        catalog.remove_index(
            "employees",
            &IndexSelector::Columns(vec!["name".to_owned()]),
        );
        assert!(catalog.indexes("employees").is_empty());
    }

    #[test]
    fn renaming_a_table_rebinds_its_indexes() {
        let mut catalog = catalog();
        catalog.create_table("employees", TableOptions::new(), |t| {
            t.string("name", ColumnOptions::new());
        });
        catalog
            .add_index("employees", &["name"], IndexOptions::new())
            .unwrap();

        catalog.rename_table("employees", "workers").unwrap();

        assert!(catalog.indexes("employees").is_empty());
        let moved = catalog.indexes("workers");
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].table, "workers");
        assert_eq!(moved[0].name, "index_employees_on_name");

        let columns = catalog.columns("workers").unwrap();
        assert_eq!(columns[1].name, "name");
        assert!(!catalog.has_table("employees"));
    }

    #[test]
    fn dropping_a_table_keeps_the_slot_map_consistent() {
        let mut catalog = catalog();
        catalog.create_table("a", TableOptions::new(), |_| {});
        catalog.create_table("b", TableOptions::new(), |t| {
            t.string("kept", ColumnOptions::new());
        });

        assert!(catalog.drop_table("a"));
        assert!(!catalog.drop_table("a"));

        let columns = catalog.columns("b").unwrap();
        assert_eq!(columns[1].name, "kept");
        assert_eq!(catalog.table_names(), vec!["schema_info", "b"]);
    }

    #[test]
    fn bootstrap_load_happens_exactly_once() {
        let calls = Rc::new(Cell::new(0usize));
        let seen = calls.clone();
        let source = move |_: &Path| -> Result<SchemaPlan> {
            seen.set(seen.get() + 1);
            let mut plan = SchemaPlan::new();
            plan.push(SchemaOp::CreateTable {
                name: "employees".to_owned(),
                options: TableOptions::new(),
                columns: vec![ColumnSpec::new("name", ColumnType::String)],
            });
            Ok(plan)
        };
        let mut catalog = Catalog::new(
            SchemaProtocol::Modern,
            PathBuf::from("db/schema.plan"),
            Some(Box::new(source)),
        );

        // the bootstrap table itself carries no business columns
        assert!(catalog.columns(BOOTSTRAP_TABLE).unwrap().is_empty());
        assert_eq!(calls.get(), 1);

        // loaded through the replay, visible afterwards
        assert_eq!(catalog.columns("employees").unwrap().len(), 2);
        assert_eq!(calls.get(), 1);

        assert!(catalog.columns(BOOTSTRAP_TABLE).unwrap().is_empty());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failed_bootstrap_loads_are_not_retried() {
        let calls = Rc::new(Cell::new(0usize));
        let seen = calls.clone();
        let source = move |_: &Path| -> Result<SchemaPlan> {
            seen.set(seen.get() + 1);
            Err(Error::ConfErr("no schema here".to_owned()))
        };
        let mut catalog = Catalog::new(
            SchemaProtocol::Modern,
            PathBuf::from("db/schema.plan"),
            Some(Box::new(source)),
        );

        assert!(catalog.columns("employees").is_err());
        assert!(catalog.columns("employees").is_ok());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn replaying_a_plan_reproduces_the_schema() {
        let mut plan = SchemaPlan::new();
        plan.push(SchemaOp::EnableExtension {
            name: "plpgsql".to_owned(),
        })
        .push(SchemaOp::CreateTable {
            name: "extended_models".to_owned(),
            options: TableOptions::new(),
            columns: vec![
                ColumnSpec::new("body", ColumnType::Text),
                ColumnSpec::new("payload", ColumnType::Json),
            ],
        })
        .push(SchemaOp::AddColumn {
            table: "extended_models".to_owned(),
            name: "title".to_owned(),
            column_type: ColumnType::String,
            options: ColumnOptions::new(),
        })
        .push(SchemaOp::ChangeColumnDefault {
            table: "extended_models".to_owned(),
            name: "title".to_owned(),
            default: Value::String("untitled".to_owned()),
        })
        .push(SchemaOp::AddIndex {
            table: "extended_models".to_owned(),
            columns: vec!["title".to_owned()],
            options: IndexOptions::new(),
        })
        .push(SchemaOp::AddFkConstraint {
            from_table: "extended_models".to_owned(),
            from_column: "owner_id".to_owned(),
            to_table: "owners".to_owned(),
            to_column: "id".to_owned(),
        });

        let mut catalog = catalog();
        catalog.apply(&plan).unwrap();

        let columns = catalog.columns("extended_models").unwrap();
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[3].default, Some(Value::String("untitled".to_owned())));
        assert_eq!(catalog.indexes("extended_models").len(), 1);
    }

    #[test]
    fn replay_stops_at_the_first_failing_op() {
        let mut plan = SchemaPlan::new();
        plan.push(SchemaOp::AddColumn {
            table: "missing".to_owned(),
            name: "c".to_owned(),
            column_type: ColumnType::String,
            options: ColumnOptions::new(),
        })
        .push(SchemaOp::CreateTable {
            name: "after".to_owned(),
            options: TableOptions::new(),
            columns: Vec::new(),
        });

        let mut catalog = catalog();
        assert!(catalog.apply(&plan).is_err());
        assert!(!catalog.has_table("after"));
    }

    #[test]
    fn postgres_flavored_columns_alias_onto_plain_types() {
        let mut catalog = catalog();
        catalog.create_table("extended_models", TableOptions::new(), |t| {
            t.citext("body", ColumnOptions::new());
            t.interval("time_interval", ColumnOptions::new());
            t.geometry("feature_geometry", ColumnOptions::new());
            t.jsonb("payload", ColumnOptions::new());
        });

        let columns = catalog.columns("extended_models").unwrap();
        assert_eq!(columns[1].column_type, ColumnType::Text);
        assert_eq!(columns[2].column_type, ColumnType::Text);
        assert_eq!(columns[3].column_type, ColumnType::Text);
        assert_eq!(columns[4].column_type, ColumnType::Json);
    }

    #[test]
    fn legacy_protocol_discards_table_options() {
        let mut modern = catalog();
        modern.create_table("t", TableOptions::new().temporary(), |_| {});

        let mut legacy = Catalog::new(
            SchemaProtocol::Legacy,
            PathBuf::from("db/schema.plan"),
            None,
        );
        legacy.create_table("t", TableOptions::new().temporary(), |_| {});

        assert!(modern.table("t").unwrap().temporary);
        assert!(!legacy.table("t").unwrap().temporary);
    }
}
