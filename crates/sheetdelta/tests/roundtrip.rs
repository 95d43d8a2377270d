use proptest::prelude::*;
use sheetdelta::common::{CellValue, ColumnDef, DataKind};
use sheetdelta::{DataProvider, GeneratedData};

#[derive(Debug, Clone)]
enum Op {
    Edit { col: usize, row: usize, n: i32 },
    Clear { row: usize },
    Append { name: bool },
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..2, 0usize..20, -50i32..50).prop_map(|(col, row, n)| Op::Edit { col, row, n }),
        (0usize..20).prop_map(|row| Op::Clear { row }),
        any::<bool>().prop_map(|name| Op::Append { name }),
        (0usize..20).prop_map(Op::Delete),
    ]
}

type Provider = DataProvider<GeneratedData<fn(usize, usize) -> CellValue>>;

fn base_value(col: usize, row: usize) -> CellValue {
    match col {
        0 => CellValue::from(format!("row {row}")),
        _ => CellValue::from(row as f64),
    }
}

fn provider(rows: usize) -> Provider {
    let columns = vec![
        ColumnDef::new("name", DataKind::Text).required(),
        ColumnDef::new("score", DataKind::Number),
    ];
    DataProvider::new(GeneratedData::new(rows, base_value as fn(usize, usize) -> CellValue), columns)
        .expect("provider")
}

fn apply(p: &mut Provider, op: &Op) {
    match op {
        Op::Edit { col: 0, row, n } => {
            let _ = p.set_cell(0, *row, format!("name {n}"));
        }
        Op::Edit { row, n, .. } => {
            let _ = p.set_cell(1, *row, f64::from(*n) / 4.0);
        }
        Op::Clear { row } => {
            let _ = p.set_cell(1, *row, CellValue::Empty);
        }
        Op::Append { name } => {
            let v = p.append_row();
            if *name {
                let _ = p.set_cell(0, v, "appended");
            }
        }
        Op::Delete(v) => {
            p.delete_row(*v);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn restore_reproduces_saved_rows(
        rows in 0usize..15,
        ops in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let mut p = provider(rows);
        for op in &ops {
            apply(&mut p, op);
        }
        // make every appended row complete so nothing is dropped on save
        for v in 0..p.num_rows() {
            if p.is_appended_row(v) && p.cell(0, v).is_some_and(|c| c.is_empty()) {
                p.set_cell(0, v, "filled").expect("fill");
            }
        }

        let saved = p.save_state_string();
        let mut q = provider(rows);
        let report = q.restore_state(&saved).expect("restore");
        prop_assert!(report.skipped.is_empty(), "{:?}", report.skipped);
        prop_assert_eq!(q.num_rows(), p.num_rows());
        for v in 0..p.num_rows() {
            prop_assert_eq!(q.row_values(v), p.row_values(v));
        }
        prop_assert_eq!(q.save_state(), p.save_state());
    }
}
