use unicode_width::UnicodeWidthStr;

use crate::fetch::{KlineMap, KlineSeries};
use crate::utils::format_epoch_ms;

/// One printable line per batch key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub key: String,
    pub records: usize,
    pub last_open: Option<String>,
    pub last_close: Option<String>,
}

impl SummaryRow {
    pub fn from_series(key: &str, series: &KlineSeries) -> Self {
        let last = series.last();
        Self {
            key: key.to_string(),
            records: series.len(),
            last_open: last.and_then(|record| format_epoch_ms(record.open_time)),
            last_close: last.map(|record| record.close.clone()),
        }
    }
}

/// Rows for `keys` in the given order. Keys missing from the map read as empty.
pub fn summarize<K: AsRef<str>>(keys: &[K], map: &KlineMap) -> Vec<SummaryRow> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            match map.get(key) {
                Some(series) => SummaryRow::from_series(key, series),
                None => SummaryRow::from_series(key, &Vec::new()),
            }
        })
        .collect()
}

pub fn render_rows(rows: &[SummaryRow]) -> String {
    let key_width = rows
        .iter()
        .map(|row| row.key.width())
        .chain(std::iter::once("KEY".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!(
        "{:<key_width$}  {:>7}  {:<16}  {}\n",
        "KEY", "RECORDS", "LAST OPEN", "LAST CLOSE"
    );
    for row in rows {
        let pad = key_width.saturating_sub(row.key.width());
        if row.records == 0 {
            out.push_str(&format!(
                "{}{}  {:>7}  no data\n",
                row.key,
                " ".repeat(pad),
                0
            ));
            continue;
        }
        out.push_str(&format!(
            "{}{}  {:>7}  {:<16}  {}\n",
            row.key,
            " ".repeat(pad),
            row.records,
            row.last_open.as_deref().unwrap_or("-"),
            row.last_close.as_deref().unwrap_or("-"),
        ));
    }
    out
}
