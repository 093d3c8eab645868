mod common;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use common::{FakeAdmin, FakeQuery, target, users_orders};
use schemalift_accessor::instance::{InstanceConfig, InstanceInfo, ReplicaInfo};
use schemalift_accessor::{
    AccessorError, AccessorOptions, AdminError, AdminResult, DatabaseAccessor,
    InstanceAdminClient, LifecycleOutcome, leader_location,
};
use schemalift_core::{Dialect, MigrationType};
use serde_json::Value;

fn accessor(admin: &FakeAdmin, query: &Arc<FakeQuery>) -> DatabaseAccessor {
    DatabaseAccessor::new(admin.client(), query.clone(), AccessorOptions::default())
}

#[tokio::test]
async fn lists_lower_cased_table_names() -> Result<()> {
    let admin = FakeAdmin::new().with_database(&target(), Dialect::Postgresql);
    let query = Arc::new(
        FakeQuery::new().respond("INFORMATION_SCHEMA.TABLES", vec![vec!["Users"], vec!["ORDERS"]]),
    );

    let names = accessor(&admin, &query)
        .list_table_names(&target(), Dialect::Postgresql)
        .await?;

    assert_eq!(names, vec!["users", "orders"]);
    assert_eq!(
        query.statements()[0].params.get("schema"),
        Some(&Value::from("public"))
    );
    Ok(())
}

#[tokio::test]
async fn absent_database_has_no_tables() -> Result<()> {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new());

    let names = accessor(&admin, &query)
        .list_table_names(&target(), Dialect::GoogleStandardSql)
        .await?;

    assert!(names.is_empty());
    assert!(query.statements().is_empty());
    Ok(())
}

#[tokio::test]
async fn table_exists_reads_first_row() -> Result<()> {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new().respond("TABLE_NAME = @table", vec![vec!["Users"]]));
    let lookup = accessor(&admin, &query);

    assert!(lookup.table_exists(&target(), "Users").await?);
    assert_eq!(
        query.statements()[0].params.get("table"),
        Some(&Value::from("Users"))
    );

    let empty = Arc::new(FakeQuery::new());
    assert!(!accessor(&admin, &empty).table_exists(&target(), "Users").await?);
    Ok(())
}

#[tokio::test]
async fn validate_dml_surfaces_first_fetch_error() {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new().fail("UPDATE", "Column not found: nme"));
    let accessor = accessor(&admin, &query);

    let err = accessor
        .validate_dml(&target(), "UPDATE Users SET nme = 'x' WHERE id = 1")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessorError::Query { .. }));
    assert!(accessor.validate_dml(&target(), "SELECT 1").await.is_ok());
}

#[tokio::test]
async fn reads_database_dialect() -> Result<()> {
    let admin = FakeAdmin::new().with_database(&target(), Dialect::Postgresql);
    let query = Arc::new(FakeQuery::new());

    assert_eq!(
        accessor(&admin, &query).database_dialect(&target()).await?,
        Dialect::Postgresql
    );

    let missing = FakeAdmin::new();
    let err = accessor(&missing, &query)
        .database_dialect(&target())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cannot connect to database"));
    Ok(())
}

#[tokio::test]
async fn create_empty_then_drop() -> Result<()> {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new());
    let accessor = accessor(&admin, &query);

    accessor
        .create_empty_database(&target(), Dialect::GoogleStandardSql)
        .await?;
    assert!(accessor.check_existing_db(&target()).await?);

    accessor.drop_database(&target()).await?;
    assert!(!accessor.check_existing_db(&target()).await?);
    assert_eq!(admin.state().dropped, vec![target().to_string()]);
    Ok(())
}

#[tokio::test]
async fn migrate_schema_creates_then_backfills() -> Result<()> {
    let admin = FakeAdmin::new();
    let query = Arc::new(FakeQuery::new());
    let accessor = accessor(&admin, &query);
    let schema = users_orders(Dialect::GoogleStandardSql);

    let (outcome, report) = accessor
        .migrate_schema(&target(), &schema, MigrationType::Bulk, &[])
        .await?;

    assert_eq!(outcome, LifecycleOutcome::Created);
    assert_eq!(report.succeeded, 1);
    assert_eq!(accessor.diagnostics().unexpected_count(), 0);
    let state = admin.state();
    assert_eq!(state.applied.len(), 3);
    assert!(state.applied[2].starts_with("ALTER TABLE `Orders`"));
    Ok(())
}

struct FakeInstances {
    replicas: Vec<ReplicaInfo>,
}

#[async_trait]
impl InstanceAdminClient for FakeInstances {
    async fn get_instance(&self, name: &str) -> AdminResult<InstanceInfo> {
        if name != "projects/p/instances/i" {
            return Err(AdminError::new("Instance not found"));
        }
        Ok(InstanceInfo {
            name: name.to_string(),
            config: "projects/p/instanceConfigs/nam3".to_string(),
        })
    }

    async fn get_instance_config(&self, name: &str) -> AdminResult<InstanceConfig> {
        Ok(InstanceConfig {
            name: name.to_string(),
            replicas: self.replicas.clone(),
        })
    }
}

#[tokio::test]
async fn finds_default_leader() -> Result<()> {
    let client = FakeInstances {
        replicas: vec![
            ReplicaInfo {
                location: "us-east4".to_string(),
                default_leader_location: false,
            },
            ReplicaInfo {
                location: "us-east1".to_string(),
                default_leader_location: true,
            },
        ],
    };

    assert_eq!(
        leader_location(&client, "projects/p/instances/i").await?,
        "us-east1"
    );
    Ok(())
}

#[tokio::test]
async fn missing_leader_is_an_error() {
    let client = FakeInstances {
        replicas: vec![ReplicaInfo {
            location: "us-east4".to_string(),
            default_leader_location: false,
        }],
    };

    let err = leader_location(&client, "projects/p/instances/i")
        .await
        .unwrap_err();
    assert!(matches!(err, AccessorError::NoLeader { .. }));

    let err = leader_location(&client, "projects/p/instances/other")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("can't get instance"));
}
