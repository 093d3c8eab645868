#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use schemalift_accessor::{
    AdminClient, AdminError, AdminResult, CreateDatabaseRequest, DatabaseInfo, Operation,
    QueryClient, QueryError, Row, RowStream, Statement, UpdateDdlRequest,
};
use schemalift_core::{
    BaseType, Column, ColumnType, DatabaseUri, Dialect, FkAction, ForeignKey, SchemaModel, Table,
};
use serde_json::Value;

pub fn target() -> DatabaseUri {
    DatabaseUri::new("test-project", "test-instance", "orders")
}

/// `Users(id)` and `Orders(id, user_id)` with one foreign key.
pub fn users_orders(dialect: Dialect) -> SchemaModel {
    let mut schema = SchemaModel::new(dialect, "mysql");

    let mut users = Table::new("Users");
    users.columns = vec![
        Column::new("id", ColumnType::new(BaseType::Int64)).not_null(),
        Column::new("email", ColumnType::new(BaseType::String).with_length(255)),
    ];
    users.primary_key = vec!["id".to_string()];
    schema.insert_table(users);

    let mut orders = Table::new("Orders");
    orders.columns = vec![
        Column::new("id", ColumnType::new(BaseType::Int64)).not_null(),
        Column::new("user_id", ColumnType::new(BaseType::Int64)),
    ];
    orders.primary_key = vec!["id".to_string()];
    orders.foreign_keys = vec![ForeignKey {
        name: Some("fk_orders_users".to_string()),
        columns: vec!["user_id".to_string()],
        referenced_table: "Users".to_string(),
        referenced_columns: vec!["id".to_string()],
        on_delete: FkAction::Cascade,
    }];
    schema.insert_table(orders);

    schema
}

#[derive(Debug, Default)]
pub struct AdminState {
    pub databases: BTreeMap<String, Dialect>,
    pub applied: Vec<String>,
    pub create_requests: Vec<CreateDatabaseRequest>,
    pub ddl_requests: Vec<UpdateDdlRequest>,
    pub dropped: Vec<String>,
}

#[derive(Debug, Default)]
struct AdminConfig {
    get_delay: Duration,
    get_error: Option<AdminError>,
    op_delay: Duration,
    fail_matching: Option<String>,
    panic_matching: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<AdminState>,
    config: Mutex<AdminConfig>,
    get_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// In-memory control plane. Operations take effect when waited on.
#[derive(Debug, Clone, Default)]
pub struct FakeAdmin {
    inner: Arc<Inner>,
}

impl FakeAdmin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(self, database: &DatabaseUri, dialect: Dialect) -> Self {
        self.inner
            .state
            .lock()
            .unwrap()
            .databases
            .insert(database.to_string(), dialect);
        self
    }

    pub fn with_get_delay(self, delay: Duration) -> Self {
        self.inner.config.lock().unwrap().get_delay = delay;
        self
    }

    pub fn with_get_error(self, err: AdminError) -> Self {
        self.inner.config.lock().unwrap().get_error = Some(err);
        self
    }

    pub fn with_op_delay(self, delay: Duration) -> Self {
        self.inner.config.lock().unwrap().op_delay = delay;
        self
    }

    /// Fail every operation whose statements contain `needle`.
    pub fn failing_on(self, needle: &str) -> Self {
        self.inner.config.lock().unwrap().fail_matching = Some(needle.to_string());
        self
    }

    /// Panic while submitting any update whose statements contain `needle`.
    pub fn panicking_on(self, needle: &str) -> Self {
        self.inner.config.lock().unwrap().panic_matching = Some(needle.to_string());
        self
    }

    pub fn client(&self) -> Arc<dyn AdminClient> {
        Arc::new(self.clone())
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, AdminState> {
        self.inner.state.lock().unwrap()
    }

    pub fn get_calls(&self) -> usize {
        self.inner.get_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    fn begin_operation(&self, effect: Effect, statements: &[String]) -> Box<dyn Operation> {
        let config = self.inner.config.lock().unwrap();
        let fails = config
            .fail_matching
            .as_deref()
            .is_some_and(|needle| statements.iter().any(|s| s.contains(needle)));
        let delay = config.op_delay;
        drop(config);

        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.max_in_flight.fetch_max(now, Ordering::SeqCst);

        Box::new(FakeOperation {
            inner: Arc::clone(&self.inner),
            effect,
            delay,
            fails,
        })
    }
}

#[derive(Debug)]
enum Effect {
    Create {
        key: String,
        dialect: Dialect,
        statements: Vec<String>,
    },
    Update {
        statements: Vec<String>,
    },
}

struct FakeOperation {
    inner: Arc<Inner>,
    effect: Effect,
    delay: Duration,
    fails: bool,
}

#[async_trait]
impl Operation for FakeOperation {
    async fn wait(self: Box<Self>) -> AdminResult<()> {
        let FakeOperation {
            inner,
            effect,
            delay,
            fails,
        } = *self;
        tokio::time::sleep(delay).await;
        inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fails {
            return Err(AdminError::new("Statement rejected: invalid foreign key"));
        }

        let mut state = inner.state.lock().unwrap();
        match effect {
            Effect::Create {
                key,
                dialect,
                statements,
            } => {
                if state.databases.contains_key(&key) {
                    return Err(AdminError::new(format!("Database already exists: {key}")));
                }
                state.databases.insert(key, dialect);
                state.applied.extend(statements);
            }
            Effect::Update { statements } => state.applied.extend(statements),
        }
        Ok(())
    }
}

#[async_trait]
impl AdminClient for FakeAdmin {
    async fn get_database(&self, database: &DatabaseUri) -> AdminResult<DatabaseInfo> {
        self.inner.get_calls.fetch_add(1, Ordering::SeqCst);
        let (delay, error) = {
            let config = self.inner.config.lock().unwrap();
            (config.get_delay, config.get_error.clone())
        };
        tokio::time::sleep(delay).await;
        if let Some(err) = error {
            return Err(err);
        }

        let state = self.inner.state.lock().unwrap();
        match state.databases.get(&database.to_string()) {
            Some(dialect) => Ok(DatabaseInfo {
                name: database.clone(),
                dialect: *dialect,
            }),
            None => Err(AdminError::new(format!(
                "rpc error: code = NotFound desc = Database not found: {database}"
            ))),
        }
    }

    async fn create_database(
        &self,
        request: CreateDatabaseRequest,
    ) -> AdminResult<Box<dyn Operation>> {
        let name = request
            .create_statement
            .trim_start_matches("CREATE DATABASE ")
            .trim_matches(|c| c == '`' || c == '"')
            .to_string();
        let key = format!("{}/databases/{name}", request.parent);
        let effect = Effect::Create {
            key,
            dialect: request.dialect,
            statements: request.extra_statements.clone(),
        };
        let op = self.begin_operation(effect, &request.extra_statements);
        self.state().create_requests.push(request);
        Ok(op)
    }

    async fn update_database_ddl(
        &self,
        request: UpdateDdlRequest,
    ) -> AdminResult<Box<dyn Operation>> {
        let panics = {
            let config = self.inner.config.lock().unwrap();
            config
                .panic_matching
                .as_deref()
                .is_some_and(|needle| request.statements.iter().any(|s| s.contains(needle)))
        };
        if panics {
            panic!("admin client crashed on {:?}", request.statements);
        }

        let effect = Effect::Update {
            statements: request.statements.clone(),
        };
        let op = self.begin_operation(effect, &request.statements);
        self.state().ddl_requests.push(request);
        Ok(op)
    }

    async fn drop_database(&self, database: &DatabaseUri) -> AdminResult<()> {
        let mut state = self.state();
        state.databases.remove(&database.to_string());
        state.dropped.push(database.to_string());
        Ok(())
    }
}

/// Query client answering from canned rows keyed by a SQL fragment.
#[derive(Debug, Default)]
pub struct FakeQuery {
    responses: Vec<(String, Result<Vec<Row>, QueryError>)>,
    pub seen: Mutex<Vec<Statement>>,
}

impl FakeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, fragment: &str, rows: Vec<Vec<&str>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|values| Row::new(values.into_iter().map(Value::from).collect()))
            .collect();
        self.responses.push((fragment.to_string(), Ok(rows)));
        self
    }

    /// Fail the first fetch of statements containing `fragment`.
    pub fn fail(mut self, fragment: &str, message: &str) -> Self {
        self.responses
            .push((fragment.to_string(), Err(QueryError::Failed(message.to_string()))));
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.seen.lock().unwrap().clone()
    }
}

struct CannedRows {
    rows: std::vec::IntoIter<Row>,
    error: Option<QueryError>,
}

#[async_trait]
impl RowStream for CannedRows {
    async fn next(&mut self) -> Result<Option<Row>, QueryError> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        Ok(self.rows.next())
    }
}

#[async_trait]
impl QueryClient for FakeQuery {
    async fn single_query(
        &self,
        _database: &DatabaseUri,
        statement: Statement,
    ) -> Result<Box<dyn RowStream>, QueryError> {
        let response = self
            .responses
            .iter()
            .find(|(fragment, _)| statement.sql.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| Ok(Vec::new()));
        self.seen.lock().unwrap().push(statement);

        let stream = match response {
            Ok(rows) => CannedRows {
                rows: rows.into_iter(),
                error: None,
            },
            Err(err) => CannedRows {
                rows: Vec::new().into_iter(),
                error: Some(err),
            },
        };
        Ok(Box::new(stream))
    }
}
