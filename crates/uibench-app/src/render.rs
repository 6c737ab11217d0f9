//! Text renderings of a comparison outcome.

use uibench_types::{
    CellValue, ComparisonOutcome, ComparisonTable, OVERALL_TIME_CAVEAT, OVERALL_TIME_LABEL,
    TableCell,
};

const HEADING: &str = "Results (lower is better)";
const EMPTY: &str = "Empty";
const DEGRADED: &str = "n/a";

/// Meaning of the suffixes contestants put in their version strings.
const FLAGS_LEGEND: &str = "<h4>Flags:</h4>\n<ul>\n\
<li><strong>+r</strong> means that library is using DOM recycling, and instead of creating \
new DOM nodes on each update, it reuses them, so it breaks test cases like \"render\" and \
\"insert\".</li>\n\
<li><strong>+s</strong> means that library is using <code>shouldComponentUpdate</code> \
optimization.</li>\n\
</ul>\n";

/// Supported table renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Markdown,
    Html,
    Json,
}

impl TableFormat {
    /// Parse format from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(TableFormat::Markdown),
            "html" => Some(TableFormat::Html),
            "json" => Some(TableFormat::Json),
            _ => None,
        }
    }
}

/// Render `outcome` in `format`. `pretty` only affects JSON.
pub fn render(
    outcome: &ComparisonOutcome,
    format: TableFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    Ok(match format {
        TableFormat::Markdown => render_markdown(outcome),
        TableFormat::Html => render_html(outcome),
        TableFormat::Json if pretty => serde_json::to_string_pretty(outcome)? + "\n",
        TableFormat::Json => serde_json::to_string(outcome)? + "\n",
    })
}

pub fn render_markdown(outcome: &ComparisonOutcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("## {HEADING}\n\n"));

    let table = match outcome {
        ComparisonOutcome::NoData => {
            out.push_str(EMPTY);
            out.push('\n');
            return out;
        }
        ComparisonOutcome::Table(table) => table,
    };

    out.push_str(&format!("> {OVERALL_TIME_CAVEAT}\n\n"));
    if !table.filter.is_empty() {
        out.push_str(&format!("**Filter:** {}\n\n", md_code(&table.filter)));
    }

    out.push_str("| test case |");
    for column in &table.columns {
        out.push_str(&format!(" {} |", md_escape(&column.label)));
    }
    out.push_str("\n|---|");
    out.push_str(&"---:|".repeat(table.columns.len()));
    out.push('\n');

    out.push_str(&format!("| **{OVERALL_TIME_LABEL}** |"));
    for total in &table.overall_time_ms {
        out.push_str(&format!(" {total} |"));
    }
    out.push('\n');

    for row in &table.rows {
        out.push_str(&format!("| {} |", md_code(&row.test_case)));
        for cell in &row.cells {
            let text = match cell.value() {
                Some(value) => cell_text(value),
                None => DEGRADED.to_string(),
            };
            out.push_str(&format!(" {text} |"));
        }
        out.push('\n');
    }

    out
}

pub fn render_html(outcome: &ComparisonOutcome) -> String {
    let mut out = String::new();
    out.push_str("<div class=\"panel\">\n");
    out.push_str(&format!("<div class=\"panel-heading\">{HEADING}</div>\n"));
    out.push_str("<div class=\"panel-body\">\n");

    match outcome {
        ComparisonOutcome::NoData => out.push_str(&format!("<p>{EMPTY}</p>\n")),
        ComparisonOutcome::Table(table) => html_table(&mut out, table),
    }

    out.push_str("</div>\n</div>\n");
    out
}

fn html_table(out: &mut String, table: &ComparisonTable) {
    out.push_str(FLAGS_LEGEND);
    out.push_str(&format!(
        "<p class=\"caveat\">{}</p>\n",
        html_escape(OVERALL_TIME_CAVEAT)
    ));
    out.push_str("<table class=\"table table-condensed\">\n<thead>\n<tr><th></th>");
    for column in &table.columns {
        out.push_str(&format!(
            "<th>{} <small>{}</small></th>",
            html_escape(&column.name),
            html_escape(&column.version)
        ));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    out.push_str(&format!("<tr><td>{OVERALL_TIME_LABEL}</td>"));
    for total in &table.overall_time_ms {
        out.push_str(&format!("<td>{total}</td>"));
    }
    out.push_str("</tr>\n");

    for row in &table.rows {
        out.push_str(&format!("<tr><td><code>{}</code></td>", html_escape(&row.test_case)));
        for cell in &row.cells {
            match cell {
                TableCell::Value(value) => {
                    out.push_str(&format!(
                        "<td title=\"{}\" style=\"background:{}\">{}",
                        html_escape(&value.tooltip),
                        value.background,
                        value.display_ms
                    ));
                    if let Some(annotation) = &value.percent_annotation {
                        out.push_str(&format!(" <small>{annotation}</small>"));
                    }
                    out.push_str("</td>");
                }
                TableCell::Degraded { reason } => out.push_str(&format!(
                    "<td class=\"degraded\" title=\"{}\">{DEGRADED}</td>",
                    reason.as_str()
                )),
            }
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>\n");
}

fn cell_text(value: &CellValue) -> String {
    match &value.percent_annotation {
        Some(annotation) => format!("{} {annotation}", value.display_ms),
        None => value.display_ms.to_string(),
    }
}

fn md_escape(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

/// Inline code span around `s`, fenced with one more backtick than its longest run.
fn md_code(s: &str) -> String {
    let text = md_escape(s);
    let longest = text
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat(longest + 1);
    if text.starts_with('`') || text.ends_with('`') {
        format!("{fence} {text} {fence}")
    } else {
        format!("{fence}{text}{fence}")
    }
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
