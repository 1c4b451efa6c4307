//! Vega-Lite scatter charts over a [`Table`].

use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::IoError;
use crate::table::{Column, ColumnData, Table};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";
const FOREGROUND: &str = "rgb(170,170,170)";
const BACKGROUND: &str = "rgb(37,37,37)";
const GRID: &str = "rgb(46,46,46)";

/// A rendered chart: a complete Vega-Lite document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    spec: Value,
}

impl Chart {
    /// Borrow the Vega-Lite document.
    #[must_use]
    pub fn spec(&self) -> &Value {
        &self.spec
    }

    /// Serialize the document as pretty-printed JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.spec).expect("a JSON value always serializes")
    }

    /// Wrap the document in a standalone HTML page rendered by vega-embed.
    #[must_use]
    pub fn to_html(&self) -> String {
        // A literal "</" would close the script element early.
        let spec = self.to_json().replace("</", "<\\/");
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  \
             <script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>\n  \
             <script src=\"https://cdn.jsdelivr.net/npm/vega-lite@5\"></script>\n  \
             <script src=\"https://cdn.jsdelivr.net/npm/vega-embed@6\"></script>\n\
             </head>\n<body style=\"background: {BACKGROUND};\">\n  <div id=\"vis\"></div>\n  \
             <script>\n    vegaEmbed(\"#vis\", {spec});\n  </script>\n</body>\n</html>\n"
        )
    }
}

fn field_type(column: &Column) -> &'static str {
    match column.data() {
        ColumnData::Numeric(_) => "quantitative",
        ColumnData::Text(_) => "nominal",
    }
}

fn data_values(table: &Table) -> Vec<Value> {
    (0..table.n_rows())
        .map(|i| {
            let row: serde_json::Map<String, Value> = table
                .columns()
                .iter()
                .map(|column| {
                    let value = match column.data() {
                        ColumnData::Numeric(v) => json!(v[i]),
                        ColumnData::Text(v) => json!(v[i]),
                    };
                    (column.name().to_string(), value)
                })
                .collect();
            Value::Object(row)
        })
        .collect()
}

/// Build a scatter chart of `y` against `x`, colored by `target`.
///
/// Every column of `table` is inlined as data and listed in the tooltip.
/// Styling uses a fixed dark theme: 400x450 plot, circle marks of size 100,
/// title `"{y} by {x} for {target}"`.
///
/// # Errors
///
/// Returns [`IoError::MissingColumn`] if `x`, `y` or `target` is not a
/// column of `table`.
#[instrument(skip(table), fields(n_rows = table.n_rows()))]
pub fn render_chart(table: &Table, x: &str, y: &str, target: &str) -> Result<Chart, IoError> {
    let x_col = table.require(x)?;
    let y_col = table.require(y)?;
    let target_col = table.require(target)?;

    let tooltip: Vec<Value> = table
        .columns()
        .iter()
        .map(|c| json!({ "field": c.name(), "type": field_type(c) }))
        .collect();

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "title": {
            "text": format!("{y} by {x} for {target}"),
            "color": FOREGROUND,
            "fontSize": 25,
            "fontWeight": "bold",
            "offset": 50
        },
        "width": 400,
        "height": 450,
        "background": BACKGROUND,
        "padding": 50,
        "data": { "values": data_values(table) },
        "mark": { "type": "circle", "size": 100 },
        "encoding": {
            "x": { "field": x, "type": field_type(x_col) },
            "y": { "field": y, "type": field_type(y_col) },
            "color": { "field": target, "type": field_type(target_col) },
            "tooltip": tooltip
        },
        "config": {
            "legend": {
                "titleColor": FOREGROUND,
                "labelColor": FOREGROUND,
                "padding": 10
            },
            "axis": {
                "gridColor": GRID,
                "titleColor": FOREGROUND,
                "labelColor": FOREGROUND,
                "titlePadding": 10
            }
        }
    });

    debug!(x, y, target, "chart rendered");
    Ok(Chart { spec })
}
