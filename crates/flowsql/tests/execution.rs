//! End-to-end execution against an in-memory SQLite database.
#![cfg(feature = "sqlite")]

use flowsql::prelude::*;
use flowsql::{FlowError, Index, SqlValue, Trigger};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: Option<i64>,
}

impl FromRow for User {
    fn from_row(row: &Row) -> FlowResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            age: row.try_get_column("age")?,
        })
    }
}

fn users() -> Table {
    Table::new("users").with_columns(&["id", "name", "age"])
}

async fn setup() -> FlowResult<SqliteConnection> {
    let conn = SqliteConnection::open_in_memory()?;
    conn.exec_sql(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL UNIQUE, age INTEGER)",
    )
    .await?;
    Ok(conn)
}

#[tokio::test]
async fn insert_select_update_delete() -> FlowResult<()> {
    let conn = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");
    let age: Property<Option<i64>> = Property::new(&t, "age");

    let first = insert(&t)
        .columns(&[&name, &age])
        .values([SqlValue::from("ann"), 31.into()])
        .execute_insert(&conn)
        .await?;
    let second = insert(&t)
        .columns(&[&name, &age])
        .values([SqlValue::from("bob"), SqlValue::Null])
        .execute_insert(&conn)
        .await?;
    assert_eq!((first, second), (1, 2));

    let all: Vec<User> = select()
        .from(&t)
        .order_by(name.asc())
        .query_list(&conn)
        .await?;
    assert_eq!(
        all,
        vec![
            User {
                id: 1,
                name: "ann".into(),
                age: Some(31)
            },
            User {
                id: 2,
                name: "bob".into(),
                age: None
            },
        ]
    );

    let changed = update(&t)
        .set(age.eq(Some(40i64)))
        .where_(age.eq(None::<i64>))
        .execute_update_delete(&conn)
        .await?;
    assert_eq!(changed, 1);

    let bob: Option<User> = select()
        .from(&t)
        .where_(name.eq("bob"))
        .query_single(&conn)
        .await?;
    assert_eq!(bob.map(|u| u.age), Some(Some(40)));

    let removed = delete(&t)
        .where_(age.gt(Some(35i64)))
        .execute_update_delete(&conn)
        .await?;
    assert_eq!(removed, 1);
    assert_eq!(select().from(&t).count(&conn).await?, 1);
    Ok(())
}

#[tokio::test]
async fn insert_or_ignore_reports_no_row() -> FlowResult<()> {
    let conn = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");

    let id = insert(&t).columns(&[&name]).values(["ann"]).execute_insert(&conn).await?;
    assert_eq!(id, 1);
    let ignored = insert(&t)
        .or_ignore()
        .columns(&[&name])
        .values(["ann"])
        .execute_insert(&conn)
        .await?;
    assert_eq!(ignored, -1);

    let err = insert(&t)
        .columns(&[&name])
        .values(["ann"])
        .execute_insert(&conn)
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());
    Ok(())
}

#[tokio::test]
async fn scalar_helpers() -> FlowResult<()> {
    let conn = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");
    let age: Property<i64> = Property::new(&t, "age");

    assert!(!select().from(&t).has_data(&conn).await?);
    assert_eq!(select().from(&t).long_value(&conn).await?, 0);

    insert(&t)
        .columns(&[&name, &age])
        .values_rows([
            [SqlValue::from("ann"), 20.into()],
            [SqlValue::from("bob"), 30.into()],
            [SqlValue::from("cid"), 30.into()],
        ])
        .execute_insert(&conn)
        .await?;

    assert!(select().from(&t).where_(age.gte(30)).has_data(&conn).await?);
    assert_eq!(
        select().from(&t).where_(age.gte(30)).count(&conn).await?,
        2
    );
    assert_eq!(
        select_columns(&[&function::sum(&age)])
            .from(&t)
            .long_value(&conn)
            .await?,
        80
    );
    assert_eq!(
        select_columns(&[&name])
            .from(&t)
            .order_by(name.desc())
            .limit(1)
            .string_value(&conn)
            .await?
            .as_deref(),
        Some("cid")
    );

    let grouped: Vec<(i64, i64)> = select_columns(&[&age, &function::count_all()])
        .from(&t)
        .group_by(&[&age])
        .having(function::count_all().gt(1))
        .query_list(&conn)
        .await?;
    assert_eq!(grouped, vec![(30, 2)]);

    let paged: Vec<(String,)> = select_columns(&[&name])
        .from(&t)
        .order_by(name.asc())
        .offset(1)
        .query_list(&conn)
        .await?;
    assert_eq!(paged, vec![("bob".to_string(),), ("cid".to_string(),)]);
    Ok(())
}

#[tokio::test]
async fn broken_query_has_no_data() -> FlowResult<()> {
    let conn = SqliteConnection::open_in_memory()?;
    assert!(!select().from(&Table::new("missing")).has_data(&conn).await?);
    Ok(())
}

#[tokio::test]
async fn index_and_trigger_lifecycle() -> FlowResult<()> {
    let conn = setup().await?;
    conn.exec_sql("CREATE TABLE audit (note TEXT)").await?;
    let t = users();
    let audit = Table::new("audit");
    let name: Property<String> = Property::new(&t, "name");
    let note: Property<String> = Property::new(&audit, "note");

    let idx = Index::new("idx_users_name").on(&t, &[&name]);
    idx.enable(&conn).await?;
    idx.enable(&conn).await?;
    let indexes = conn
        .query_long(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_users_name'",
            &[],
        )
        .await?;
    assert_eq!(indexes, 1);
    idx.disable(&conn).await?;

    let trigger = Trigger::create("users_audit")
        .after()
        .insert_on(&t)
        .begin(&insert(&audit).columns(&[&note]).values(["inserted"]));
    trigger.enable(&conn).await?;

    insert(&t).columns(&[&name]).values(["ann"]).execute_insert(&conn).await?;
    assert_eq!(select().from(&audit).count(&conn).await?, 1);

    trigger.disable(&conn).await?;
    insert(&t).columns(&[&name]).values(["bob"]).execute_insert(&conn).await?;
    assert_eq!(select().from(&audit).count(&conn).await?, 1);
    Ok(())
}

/// Connection that only counts calls.
#[derive(Default)]
struct CountingConnection {
    calls: AtomicUsize,
}

impl Connection for CountingConnection {
    async fn exec_sql(&self, _sql: &str) -> FlowResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn execute_insert(&self, _sql: &str, _args: &[SqlValue]) -> FlowResult<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn execute_update_delete(&self, _sql: &str, _args: &[SqlValue]) -> FlowResult<i64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn raw_query(&self, _sql: &str, _args: &[SqlValue]) -> FlowResult<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn construction_errors_never_reach_the_connection() {
    let conn = CountingConnection::default();
    let t = users();
    let name: Property<String> = Property::new(&t, "name");
    let age: Property<i64> = Property::new(&t, "age");

    let err = insert(&t)
        .columns(&[&name, &age])
        .values([SqlValue::from("ann")])
        .execute_insert(&conn)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Arity { .. }));
    assert!(err.is_construction());

    let err = select()
        .from(&t)
        .where_(age.gt(1))
        .and(age.lt(5))
        .or(name.eq("x"))
        .query_rows(&conn)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::MixedConnectives));

    let err = insert(&t).execute_insert(&conn).await.unwrap_err();
    assert!(matches!(err, FlowError::EmptyValues));

    let err = select()
        .from(&t)
        .where_(age.gt(1))
        .and(age.lt(5))
        .or(name.eq("x"))
        .has_data(&conn)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::MixedConnectives));

    assert_eq!(conn.calls.load(Ordering::SeqCst), 0);

    update(&t)
        .set(age.eq(1))
        .execute_update_delete(&conn)
        .await
        .unwrap();
    assert_eq!(conn.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn broken_sub_statements_are_not_run() -> FlowResult<()> {
    let conn = setup().await?;
    conn.exec_sql("CREATE TABLE archive (name TEXT)").await?;
    let t = users();
    let archive = Table::new("archive").with_columns(&["name"]);
    let name: Property<String> = Property::new(&t, "name");
    let age: Property<i64> = Property::new(&t, "age");
    let archived: Property<String> = Property::new(&archive, "name");

    let mixed = select_columns(&[&name])
        .from(&t)
        .where_(age.gt(1))
        .and(age.lt(5))
        .or(name.eq("x"));
    let err = insert(&archive)
        .columns(&[&archived])
        .select(&mixed)
        .execute_insert(&conn)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::MixedConnectives));

    let short_row = insert(&archive).columns(&[&archived, &archived]).values(["x"]);
    let err = Trigger::create("users_archive")
        .after()
        .insert_on(&t)
        .begin(&short_row)
        .enable(&conn)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Arity { .. }));

    let triggers = conn
        .query_long("SELECT COUNT(*) FROM sqlite_master WHERE type='trigger'", &[])
        .await?;
    assert_eq!(triggers, 0);
    insert(&t).columns(&[&name]).values(["ann"]).execute_insert(&conn).await?;
    assert_eq!(select().from(&archive).count(&conn).await?, 0);
    Ok(())
}
