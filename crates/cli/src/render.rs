// Output rendering for `tablesort view`

use std::io::{self, Write};

use serde::Serialize;
use tablesort_config::OutputFormat;
use tablesort_engine::{RowId, SortState, TableController};

pub fn render(table: &TableController, format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Tsv => render_tsv(table, out),
        OutputFormat::Json => render_json(table, out),
        OutputFormat::Html => render_html(table, out),
    }
}

fn cell_text(table: &TableController, id: RowId, col: usize) -> &str {
    table
        .cells(id)
        .and_then(|cells| cells.get(col))
        .map_or("", |cell| cell.text.as_str())
}

fn classes(table: &TableController, id: RowId) -> Vec<&'static str> {
    table
        .row(id)
        .and_then(|state| state.bands)
        .map(|bands| bands.class_names())
        .unwrap_or_default()
}

// ============================================================================
// tsv
// ============================================================================

/// Tabs and line breaks inside a field would break the row structure
fn tsv_field(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

fn render_tsv(table: &TableController, out: &mut dyn Write) -> io::Result<()> {
    let mut header = vec!["rank".to_string(), "id".to_string(), "classes".to_string()];
    header.extend(table.columns().iter().map(|c| tsv_field(&c.label)));
    writeln!(out, "{}", header.join("\t"))?;

    for &id in table.visible_rows() {
        let Some(state) = table.row(id) else { continue };
        let mut fields = vec![state.rank.to_string(), id.to_string(), classes(table, id).join(" ")];
        fields.extend((0..table.columns().len()).map(|col| tsv_field(cell_text(table, id, col))));
        writeln!(out, "{}", fields.join("\t"))?;
    }
    Ok(())
}

// ============================================================================
// json
// ============================================================================

#[derive(Serialize)]
struct JsonTable<'a> {
    columns: Vec<JsonColumn<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<SortState>,
    rows: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonColumn<'a> {
    label: &'a str,
    sortable: bool,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    id: RowId,
    rank: usize,
    classes: Vec<&'static str>,
    cells: Vec<&'a str>,
}

fn render_json(table: &TableController, out: &mut dyn Write) -> io::Result<()> {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(col, c)| JsonColumn { label: &c.label, sortable: table.is_sortable(col) })
        .collect();
    let rows = table
        .visible_rows()
        .iter()
        .filter_map(|&id| {
            let state = table.row(id)?;
            Some(JsonRow {
                id,
                rank: state.rank,
                classes: classes(table, id),
                cells: (0..table.columns().len()).map(|col| cell_text(table, id, col)).collect(),
            })
        })
        .collect();
    let doc = JsonTable { columns, sort: table.sort_state(), rows };

    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)
}

// ============================================================================
// html
// ============================================================================

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn header_class(table: &TableController, col: usize) -> Option<String> {
    if !table.is_sortable(col) {
        return None;
    }
    match table.sort_state() {
        Some(SortState { column, direction }) if column == col => {
            Some(format!("sorting {}", direction.class_name()))
        }
        _ => Some("sorting".to_string()),
    }
}

/// Every row in rank order; hidden rows stay in the markup, undisplayed
fn render_html(table: &TableController, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "<table class=\"sortable\">")?;
    writeln!(out, "<thead>")?;
    write!(out, "<tr>")?;
    for (col, column) in table.columns().iter().enumerate() {
        match header_class(table, col) {
            Some(class) => write!(out, "<th class=\"{}\">", class)?,
            None => write!(out, "<th>")?,
        }
        write!(out, "{}</th>", escape_html(&column.label))?;
    }
    writeln!(out, "</tr>")?;
    writeln!(out, "</thead>")?;

    writeln!(out, "<tbody>")?;
    for &id in table.ranked_rows() {
        let Some(state) = table.row(id) else { continue };
        if state.visible {
            let classes = classes(table, id);
            if classes.is_empty() {
                write!(out, "<tr>")?;
            } else {
                write!(out, "<tr class=\"{}\">", classes.join(" "))?;
            }
        } else {
            write!(out, "<tr style=\"display:none\">")?;
        }
        for col in 0..table.columns().len() {
            write!(out, "<td>{}</td>", escape_html(cell_text(table, id, col)))?;
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")
}
