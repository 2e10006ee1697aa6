//! Текстовый рендер таблиц (только для бинаря; ядро ничего не печатает).

use colsnap::table::{ColumnData, Table};

/// Выровненная текстовая таблица: заголовок, разделитель, строки.
/// Числа прижаты вправо, текст влево.
pub fn render_table(t: &Table) -> String {
    let cols = t.columns();
    if cols.is_empty() {
        return "(no columns)\n".to_string();
    }

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(cols.len());
    for c in cols {
        let mut col_cells = Vec::with_capacity(t.rows());
        match &c.data {
            ColumnData::I64(vals) => {
                for v in vals {
                    col_cells.push(v.to_string());
                }
            }
            ColumnData::F64(vals) => {
                for v in vals {
                    col_cells.push(format!("{:.2}", v));
                }
            }
            ColumnData::Str(vals) => {
                for v in vals {
                    col_cells.push(v.clone());
                }
            }
        }
        cells.push(col_cells);
    }

    let widths: Vec<usize> = cols
        .iter()
        .zip(&cells)
        .map(|(c, body)| {
            body.iter()
                .map(|s| s.chars().count())
                .chain(std::iter::once(c.name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for (i, c) in cols.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&pad(&c.name, widths[i], true));
    }
    out.push('\n');
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            out.push_str("  ");
        }
        out.push_str(&"-".repeat(*w));
    }
    out.push('\n');

    if t.rows() == 0 {
        out.push_str("(empty)\n");
        return out;
    }
    for row in 0..t.rows() {
        for (i, c) in cols.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let left = matches!(c.data, ColumnData::Str(_));
            out.push_str(&pad(&cells[i][row], widths[i], left));
        }
        out.push('\n');
    }
    out
}

fn pad(s: &str, width: usize, left: bool) -> String {
    let len = s.chars().count();
    let fill = " ".repeat(width.saturating_sub(len));
    if left {
        format!("{}{}", s, fill)
    } else {
        format!("{}{}", fill, s)
    }
}
