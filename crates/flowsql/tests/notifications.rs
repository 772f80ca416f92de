//! Change notifications reported by successful mutations.
#![cfg(feature = "sqlite")]

use flowsql::prelude::*;
use flowsql::{ChangeStream, Delete, SqlValue};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;

fn users() -> Table {
    Table::new("users").with_columns(&["id", "name"])
}

async fn setup() -> FlowResult<(SqliteConnection, ChangeStream)> {
    let (queue, changes) = ChangeQueue::channel();
    let conn = SqliteConnection::open_in_memory()?.with_change_sink(Arc::new(queue));
    conn.exec_sql("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT UNIQUE)")
        .await?;
    Ok((conn, changes))
}

#[tokio::test]
async fn mutations_report_one_change_each() -> FlowResult<()> {
    let (conn, mut changes) = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");

    insert(&t)
        .columns(&[&name])
        .values_rows([["a"], ["b"]])
        .execute_insert(&conn)
        .await?;
    update(&t)
        .set(name.concatenate("!"))
        .execute_update_delete(&conn)
        .await?;
    delete(&t)
        .where_(name.eq("a!"))
        .execute_update_delete(&conn)
        .await?;

    let actions: Vec<ChangeAction> = changes.drain().into_iter().map(|c| c.action).collect();
    assert_eq!(
        actions,
        vec![
            ChangeAction::Insert,
            ChangeAction::Update,
            ChangeAction::Delete
        ]
    );
    Ok(())
}

#[tokio::test]
async fn no_change_no_notification() -> FlowResult<()> {
    let (conn, mut changes) = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");

    let removed = delete(&t)
        .where_(name.eq("nobody"))
        .execute_update_delete(&conn)
        .await?;
    assert_eq!(removed, 0);

    let updated = update(&t)
        .set(name.eq("x"))
        .where_(name.eq("nobody"))
        .execute_update_delete(&conn)
        .await?;
    assert_eq!(updated, 0);

    insert(&t).columns(&[&name]).values(["a"]).execute_insert(&conn).await?;
    let ignored = insert(&t)
        .or_ignore()
        .columns(&[&name])
        .values(["a"])
        .execute_insert(&conn)
        .await?;
    assert_eq!(ignored, -1);

    assert_eq!(
        changes.drain(),
        vec![TableChange::new(t, ChangeAction::Insert)]
    );
    Ok(())
}

#[tokio::test]
async fn failed_statements_do_not_notify() -> FlowResult<()> {
    let (conn, mut changes) = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");

    insert(&t).columns(&[&name]).values(["a"]).execute_insert(&conn).await?;
    changes.drain();

    assert!(
        insert(&t)
            .columns(&[&name])
            .values(["a"])
            .execute_insert(&conn)
            .await
            .is_err()
    );
    assert!(
        insert(&t)
            .columns(&[&name])
            .values([SqlValue::from("b"), "c".into()])
            .execute_insert(&conn)
            .await
            .is_err()
    );
    assert!(changes.try_next().is_none());
    Ok(())
}

#[tokio::test]
async fn delete_table_reports_when_rows_existed() -> FlowResult<()> {
    let (conn, mut changes) = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");

    assert_eq!(Delete::table(&conn, &t).await?, 0);
    insert(&t).columns(&[&name]).values(["a"]).execute_insert(&conn).await?;
    assert_eq!(Delete::table(&conn, &t).await?, 1);

    let actions: Vec<ChangeAction> = changes.drain().into_iter().map(|c| c.action).collect();
    assert_eq!(actions, vec![ChangeAction::Insert, ChangeAction::Delete]);
    Ok(())
}

#[tokio::test]
async fn change_stream_yields_asynchronously() -> FlowResult<()> {
    let (conn, mut changes) = setup().await?;
    let t = users();
    let name: Property<String> = Property::new(&t, "name");

    let reader = tokio::spawn(async move { StreamExt::next(&mut changes).await });
    insert(&t).columns(&[&name]).values(["a"]).execute_insert(&conn).await?;

    let change = tokio::time::timeout(Duration::from_secs(5), reader)
        .await
        .expect("change not delivered")
        .expect("reader task panicked");
    assert_eq!(change, Some(TableChange::new(t, ChangeAction::Insert)));
    Ok(())
}
