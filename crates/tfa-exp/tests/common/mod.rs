#![allow(dead_code)]

use rand::Rng;
use tfa_core::RngHandle;
use tfa_exp::EventTable;

/// Synthetic events with `log10E` uniform in [2, 6) and `Dec` uniform in [-90, 90).
pub fn synthetic_events(n: usize, seed: u64) -> EventTable {
    let mut rng = RngHandle::from_seed(seed);
    let rows = (0..n)
        .map(|_| vec![rng.gen_range(2.0..6.0), rng.gen_range(-90.0..90.0)])
        .collect();
    EventTable::new(vec!["log10E".into(), "Dec".into()], rows).expect("table")
}

pub fn whitespace_text(table: &EventTable) -> String {
    let mut text = String::from("# synthetic season\n");
    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        text.push_str(&fields.join("   "));
        text.push('\n');
    }
    text
}
