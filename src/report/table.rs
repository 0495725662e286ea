//! Fixed-column layout of the readings table.

use super::ReportRow;

/// Column headers and widths in characters
pub const COLUMNS: [(&str, usize); 7] = [
    ("Date", 16),
    ("Greenhouse", 18),
    ("T max (C)", 9),
    ("T min (C)", 9),
    ("H max (%)", 9),
    ("H min (%)", 9),
    ("CO2 (ppm)", 9),
];

/// Clip `text` to `width` characters, marking the cut with `~`.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

/// Right-aligned number, clipped like text when it outgrows the column.
fn number(value: f64, decimals: usize, width: usize) -> String {
    fit(&format!("{value:>width$.decimals$}"), width)
}

#[must_use]
pub fn header_cells() -> [String; 7] {
    COLUMNS.map(|(name, width)| fit(name, width))
}

/// One table row. Text columns are left-aligned, numbers right-aligned.
#[must_use]
pub fn row_cells(row: &ReportRow) -> [String; 7] {
    let when = match &row.time {
        Some(time) => format!("{} {time}", row.date.format("%Y-%m-%d")),
        None => row.date.format("%Y-%m-%d").to_string(),
    };
    let co2 = match row.co2 {
        Some(v) => number(v, 0, COLUMNS[6].1),
        None => format!("{:>width$}", "-", width = COLUMNS[6].1),
    };

    [
        fit(&when, COLUMNS[0].1),
        fit(&row.greenhouse, COLUMNS[1].1),
        number(row.temp_max, 1, COLUMNS[2].1),
        number(row.temp_min, 1, COLUMNS[3].1),
        number(row.humidity_max, 1, COLUMNS[4].1),
        number(row.humidity_min, 1, COLUMNS[5].1),
        co2,
    ]
}

/// Character offset of each column's left edge, with one padding character
/// on either side of every cell.
#[must_use]
pub fn column_offsets() -> [usize; 8] {
    let mut offsets = [0; 8];
    for (i, (_, width)) in COLUMNS.iter().enumerate() {
        offsets[i + 1] = offsets[i] + width + 2;
    }
    offsets
}

/// Split rows into pages; an empty table still yields one (empty) page.
#[must_use]
pub fn paginate(rows: &[ReportRow], rows_per_page: usize) -> Vec<&[ReportRow]> {
    if rows.is_empty() {
        return vec![rows];
    }
    rows.chunks(rows_per_page.max(1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(name: &str, co2: Option<f64>) -> ReportRow {
        ReportRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: Some("08:30".to_string()),
            greenhouse: name.to_string(),
            temp_max: 25.0,
            temp_min: 18.24,
            humidity_max: 80.0,
            humidity_min: 60.0,
            co2,
        }
    }

    #[test]
    fn cells_fill_their_columns() {
        let cells = row_cells(&row("Norte", Some(612.4)));
        assert_eq!(cells[0], "2024-03-01 08:30");
        assert_eq!(cells[1], "Norte");
        assert_eq!(cells[2], "     25.0");
        assert_eq!(cells[3], "     18.2");
        assert_eq!(cells[6], "      612");
        for (cell, (_, width)) in cells.iter().zip(COLUMNS).skip(2) {
            assert_eq!(cell.chars().count(), width);
        }
    }

    #[test]
    fn long_names_are_clipped() {
        let cells = row_cells(&row("Invernadero experimental sur", None));
        assert_eq!(cells[1].chars().count(), COLUMNS[1].1);
        assert!(cells[1].ends_with('~'));
        assert_eq!(cells[6].trim(), "-");
    }

    #[test]
    fn oversized_numbers_stay_inside_their_column() {
        let cells = row_cells(&row("Norte", Some(1e10)));
        assert_eq!(cells[6].chars().count(), COLUMNS[6].1);
        assert_eq!(cells[6], "10000000~");
    }

    #[test]
    fn offsets_accumulate_padding() {
        let offsets = column_offsets();
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], 18);
        assert_eq!(offsets[7], COLUMNS.iter().map(|(_, w)| w + 2).sum::<usize>());
    }

    #[test]
    fn pagination() {
        let rows: Vec<ReportRow> = (0..5).map(|_| row("A", None)).collect();
        let pages = paginate(&rows, 2);
        assert_eq!(pages.iter().map(|p| p.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert_eq!(paginate(&[], 10).len(), 1);
    }
}
