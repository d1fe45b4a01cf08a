// Copyright (c) reifydb.com 2025
// This file is licensed under the AGPL-3.0-or-later

use peaktable_engine::{AddColumn, ColumnFormat, Expression, Table, Type, Value};
use rand::RngExt;
use std::collections::HashSet;

fn table_nsp() -> Table {
    Table::new(
        vec!["n", "s"],
        vec![Type::Int, Type::Text],
        vec![ColumnFormat::Auto, ColumnFormat::Auto],
        vec![
            vec![Value::Int(1), Value::text("a")],
            vec![Value::Int(2), Value::text("b")],
            vec![Value::Int(3), Value::text("c")],
        ],
    )
    .unwrap()
}

fn int_table(values: &[i64]) -> Table {
    Table::from_column("v", values.iter().map(|&v| Value::Int(v)).collect()).unwrap()
}

#[test]
fn filter_keeps_matching_rows_in_order() {
    let table = table_nsp();
    let filtered = table.filter(&table.col("n").ge(2)).unwrap();
    assert_eq!(filtered.column_values("n").unwrap(), vec![Value::Int(2), Value::Int(3)]);
    assert_eq!(filtered.column_values("s").unwrap(), vec![Value::text("b"), Value::text("c")]);
}

#[test]
fn filter_after_descending_sort_keeps_sorted_order() {
    let mut table = table_nsp();
    table.sort_by("n", false).unwrap();
    let filtered = table.filter(&table.col("n").ge(2)).unwrap();
    assert_eq!(filtered.column_values("s").unwrap(), vec![Value::text("c"), Value::text("b")]);
}

#[test]
fn filter_partitions_the_table() {
    let table = table_nsp();
    let expr = table.col("n").ge(2);
    let negated = table.col("n").lt(2);
    let kept = table.filter(&expr).unwrap();
    let dropped = table.filter(&negated).unwrap();
    assert_eq!(kept.len() + dropped.len(), table.len());
}

/// The binary-search fast path must agree bit for bit with the elementwise
/// comparison, for every operator, both orientations, on duplicate-laden
/// columns, at every boundary value.
#[test]
fn fast_path_matches_elementwise_evaluation() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let len = rng.random_range(1..=30);
        let values: Vec<i64> = (0..len).map(|_| rng.random_range(0..=5)).collect();

        let mut sorted_values = values.clone();
        sorted_values.sort_unstable();

        let mut sorted = int_table(&sorted_values);
        sorted.sort_by("v", true).unwrap();
        assert_eq!(sorted.primary_index(), Some("v"));

        // Same rows in the same order, but without a primary index, so
        // every comparison takes the elementwise path.
        let reference = int_table(&sorted_values);
        assert_eq!(reference.primary_index(), None);

        for target in -1..=6i64 {
            let comparisons: Vec<(Expression, Expression)> = vec![
                (sorted.col("v").lt(target), reference.col("v").lt(target)),
                (sorted.col("v").le(target), reference.col("v").le(target)),
                (sorted.col("v").gt(target), reference.col("v").gt(target)),
                (sorted.col("v").ge(target), reference.col("v").ge(target)),
                (sorted.col("v").eq(target), reference.col("v").eq(target)),
                (sorted.col("v").ne(target), reference.col("v").ne(target)),
                // Reflected orientation: literal OP column.
                (
                    Expression::constant(target).lt(sorted.col("v")),
                    Expression::constant(target).lt(reference.col("v")),
                ),
                (
                    Expression::constant(target).ge(sorted.col("v")),
                    Expression::constant(target).ge(reference.col("v")),
                ),
                (
                    Expression::constant(target).eq(sorted.col("v")),
                    Expression::constant(target).eq(reference.col("v")),
                ),
                (
                    Expression::constant(target).ne(sorted.col("v")),
                    Expression::constant(target).ne(reference.col("v")),
                ),
            ];
            for (fast, slow) in comparisons {
                let fast = sorted.filter(&fast).unwrap();
                let slow = reference.filter(&slow).unwrap();
                assert_eq!(
                    fast.column_values("v").unwrap(),
                    slow.column_values("v").unwrap(),
                    "target {} over {:?}",
                    target,
                    values
                );
            }
        }
    }
}

#[test]
fn fast_path_skips_undefined_cells() {
    let mut table = Table::from_column(
        "v",
        vec![Value::Int(2), Value::Undefined, Value::Int(1), Value::Undefined],
    )
    .unwrap();
    table.sort_by("v", true).unwrap();

    let filtered = table.filter(&table.col("v").ge(0)).unwrap();
    assert_eq!(filtered.column_values("v").unwrap(), vec![Value::Int(1), Value::Int(2)]);

    let filtered = table.filter(&table.col("v").ne(1)).unwrap();
    assert_eq!(filtered.column_values("v").unwrap(), vec![Value::Int(2)]);
}

#[test]
fn cross_join_cardinality() {
    let a = table_nsp();
    let b = table_nsp();
    let joined = a.join(&b, &true.into()).unwrap();
    assert_eq!(joined.len(), a.len() * b.len());
}

#[test]
fn left_join_against_false_pads_with_undefined() {
    let a = table_nsp();
    let b = table_nsp();
    let joined = a.left_join(&b, &false.into()).unwrap();
    assert_eq!(joined.len(), a.len());
    for row in joined.rows() {
        assert_eq!(&row[2..], &[Value::Undefined, Value::Undefined]);
    }
}

#[test]
fn join_column_names_stay_unique_across_repeated_self_joins() {
    let table = table_nsp();
    let once = table.join(&table, &true.into()).unwrap();
    let twice = once.join(&once, &true.into()).unwrap();
    let thrice = twice.join(&table, &true.into()).unwrap();

    for joined in [&once, &twice, &thrice] {
        let names = joined.column_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len(), "{:?}", names);
    }
}

#[test]
fn self_join_on_equality_yields_the_diagonal() {
    let table = table_nsp();
    let joined = table.join(&table, &table.col("n").eq(table.col("n"))).unwrap();
    assert_eq!(joined.len(), 3);
    assert_eq!(joined.column_values("n").unwrap(), joined.column_values("n__0").unwrap());
    assert_eq!(joined.column_values("s").unwrap(), joined.column_values("s__0").unwrap());
}

#[test]
fn sort_twice_is_idempotent() {
    let mut table = table_nsp();
    table.sort_by("n", true).unwrap();
    let rows = table.rows().to_vec();
    let permutation = table.sort_by("n", true).unwrap();
    assert_eq!(permutation, vec![0, 1, 2]);
    assert_eq!(table.rows(), rows.as_slice());
}

#[test]
fn add_then_drop_column_restores_table() {
    let mut table = table_nsp();
    let names = table.column_names().to_vec();
    let types = table.column_types().to_vec();
    let rows = table.rows().to_vec();

    table.add_column("noise", Value::float(0.0), AddColumn::default()).unwrap();
    table.drop_columns(&["noise"]).unwrap();

    assert_eq!(table.column_names(), names.as_slice());
    assert_eq!(table.column_types(), types.as_slice());
    assert_eq!(table.rows(), rows.as_slice());
}

#[test]
fn aggregation_broadcasts_in_row_order() {
    let table = Table::new(
        vec!["source", "value"],
        vec![Type::Int, Type::Int],
        vec![ColumnFormat::Auto, ColumnFormat::Auto],
        vec![
            vec![Value::Int(2), Value::Int(30)],
            vec![Value::Int(1), Value::Int(10)],
            vec![Value::Int(2), Value::Int(50)],
            vec![Value::Int(1), Value::Int(20)],
        ],
    )
    .unwrap();

    let result = table.aggregate(&table.col("value").sum(), "total", &["source"]).unwrap();
    assert_eq!(
        result.column_values("total").unwrap(),
        vec![Value::Int(80), Value::Int(30), Value::Int(80), Value::Int(30)]
    );
}

#[test]
fn expression_arithmetic_and_functions_compose() {
    let mut table = Table::from_column(
        "x",
        vec![Value::float(1.0), Value::float(4.0), Value::Undefined],
    )
    .unwrap();

    let expr = peaktable_engine::sqrt(table.col("x")) + 1.0;
    table.add_column("y", expr, AddColumn::default()).unwrap();
    assert_eq!(
        table.column_values("y").unwrap(),
        vec![Value::float(2.0), Value::float(3.0), Value::Undefined]
    );
}

#[test]
fn logical_short_circuit_matches_full_evaluation() {
    let table = table_nsp();

    let short = Expression::constant(false).and(table.col("n").ge(2));
    assert_eq!(table.filter(&short).unwrap().len(), 0);

    let short = Expression::constant(true).or(table.col("n").ge(2));
    assert_eq!(table.filter(&short).unwrap().len(), 3);
}

#[test]
fn string_predicates_filter_text_columns() {
    let table = Table::new(
        vec!["name"],
        vec![Type::Text],
        vec![ColumnFormat::Auto],
        vec![
            vec![Value::text("alanine")],
            vec![Value::text("glycine")],
            vec![Value::Undefined],
        ],
    )
    .unwrap();

    let filtered = table.filter(&table.col("name").starts_with("ala")).unwrap();
    assert_eq!(filtered.len(), 1);

    let filtered = table.filter(&table.col("name").contains("ine")).unwrap();
    assert_eq!(filtered.len(), 2);
}

#[test]
fn split_by_partitions_all_rows() {
    let mut rng = rand::rng();
    let values: Vec<i64> = (0..40).map(|_| rng.random_range(0..=4)).collect();
    let table = int_table(&values);

    let groups = table.split_by(&["v"]).unwrap();
    let total: usize = groups.iter().map(Table::len).sum();
    assert_eq!(total, table.len());
}
