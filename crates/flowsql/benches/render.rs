use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use flowsql::prelude::*;

fn wide_table(n: usize) -> (Table, Vec<Property<i64>>) {
    let names: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let table = Table::new("t").with_columns(&refs);
    let props = names.iter().map(|name| Property::new(&table, name)).collect();
    (table, props)
}

/// SELECT col0, col1, ... FROM t WHERE col0=0 AND col1=1 ... ORDER BY col0 ASC LIMIT 10
fn build_select(table: &Table, props: &[Property<i64>]) -> impl Query {
    let columns: Vec<&dyn AsColumn> = props.iter().map(|p| p as &dyn AsColumn).collect();
    let conditions = props.iter().zip(0i64..).map(|(p, i)| p.eq(i));
    select_columns(&columns)
        .from(table)
        .where_all(conditions)
        .order_by(props[0].asc())
        .limit(10)
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/render");

    for n in [1, 5, 10, 50, 100] {
        let (table, props) = wide_table(n);
        let query = build_select(&table, &props);
        group.bench_with_input(BenchmarkId::from_parameter(n), &query, |b, query| {
            b.iter(|| black_box(query.query()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        let (table, props) = wide_table(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(build_select(&table, &props).query()));
        });
    }

    group.finish();
}

fn bench_insert_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement/insert_rows");

    for n in [5, 20, 100, 500] {
        let (table, props) = wide_table(3);
        let rows: Vec<[i64; 3]> = (0..n).map(|i| [i, i * 2, i * 3]).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| {
                let statement = insert(&table)
                    .columns(&[&props[0], &props[1], &props[2]])
                    .values_rows(rows.iter().copied());
                black_box(statement.query());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_build_and_render, bench_insert_rows);
criterion_main!(benches);
