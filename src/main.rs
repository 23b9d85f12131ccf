use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell, ContentArrangement, Table as DisplayTable};
use std::path::PathBuf;
use std::process;

use tabview::config::Config;
use tabview::data::view::TableView;
use tabview::logging;
use tabview::session::Session;

struct Args {
    file: String,
    filter: Option<String>,
    sort: Option<String>,
    export_csv: Option<PathBuf>,
    export_json: Option<PathBuf>,
}

fn print_help() {
    println!("tabview - view, filter, sort and re-export tabular files");
    println!();
    println!("Usage:");
    println!("  tabview <FILE.csv|FILE.json|FILE.jsonl> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --filter <TERM>        Keep rows where any cell contains TERM (case-insensitive)");
    println!("  --sort <COLUMN[:desc]> Sort by column name or index, ascending by default");
    println!("  --export-csv <PATH>    Write the current view as CSV");
    println!("  --export-json <PATH>   Write the current view as JSON");
    println!("  -h, --help             Show this help");
    println!();
    println!("The view is filtered first, then sorted; exports always reflect");
    println!("the view exactly as displayed.");
}

fn parse_args() -> Result<Option<Args>> {
    let mut file = None;
    let mut filter = None;
    let mut sort = None;
    let mut export_csv = None;
    let mut export_json = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(None);
            }
            "--filter" => filter = Some(args.next().context("--filter needs a term")?),
            "--sort" => sort = Some(args.next().context("--sort needs a column")?),
            "--export-csv" => {
                export_csv = Some(PathBuf::from(
                    args.next().context("--export-csv needs a path")?,
                ))
            }
            "--export-json" => {
                export_json = Some(PathBuf::from(
                    args.next().context("--export-json needs a path")?,
                ))
            }
            other if other.starts_with('-') => anyhow::bail!("unknown option: {}", other),
            other => file = Some(other.to_string()),
        }
    }

    let file = file.context("no input file given (try --help)")?;
    Ok(Some(Args {
        file,
        filter,
        sort,
        export_csv,
        export_json,
    }))
}

/// Resolve a --sort argument (header name or 0-based index, with an
/// optional :asc/:desc suffix) against the loaded headers.
fn resolve_sort(spec: &str, headers: &[String]) -> Result<(usize, bool)> {
    let (column_spec, descending) = match spec.rsplit_once(':') {
        Some((col, "desc")) => (col, true),
        Some((col, "asc")) => (col, false),
        _ => (spec, false),
    };

    let column = if let Some(idx) = headers.iter().position(|h| h.as_str() == column_spec) {
        idx
    } else {
        column_spec
            .parse::<usize>()
            .ok()
            .filter(|&idx| idx < headers.len())
            .with_context(|| format!("unknown sort column: {}", column_spec))?
    };

    Ok((column, descending))
}

fn render(view: &TableView, config: &Config) {
    let mut table = DisplayTable::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let sort = view.sort_state();
    let mut header_cells: Vec<Cell> = view
        .headers()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let label = match sort {
                Some(s) if s.column == idx && s.ascending => format!("{} \u{2191}", name),
                Some(s) if s.column == idx => format!("{} \u{2193}", name),
                _ => name.clone(),
            };
            Cell::new(label).add_attribute(Attribute::Bold)
        })
        .collect();
    if config.display.show_row_numbers {
        header_cells.insert(0, Cell::new("#").add_attribute(Attribute::Bold));
    }
    table.set_header(header_cells);

    let max_rows = config.display.max_display_rows;
    for (position, row) in view.rows().into_iter().take(max_rows).enumerate() {
        if config.display.show_row_numbers {
            let mut cells = vec![(position + 1).to_string()];
            cells.extend(row);
            table.add_row(cells);
        } else {
            table.add_row(row);
        }
    }

    println!("{table}");

    let shown = view.row_count().min(max_rows);
    let source = view.source();
    let mut status = format!(
        "{} ({}) - {} of {} rows",
        source.file_name(),
        source.file_type(),
        shown,
        source.row_count()
    );
    if !view.filter_term().trim().is_empty() {
        status.push_str(&format!(" [filter: {:?}]", view.filter_term()));
    }
    if view.row_count() > max_rows {
        status.push_str(&format!(" ({} hidden)", view.row_count() - max_rows));
    }
    println!("{status}");
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();
    let mut session = Session::new(config);

    session.load(&args.file).await?;

    if let Some(term) = &args.filter {
        session.filter_change(term)?;
    }

    if let Some(spec) = &args.sort {
        let headers = session
            .view()
            .map(|v| v.headers().to_vec())
            .unwrap_or_default();
        let (column, descending) = resolve_sort(spec, &headers)?;
        session.sort_click(column)?;
        if descending {
            // Second click on the same column flips the direction
            session.sort_click(column)?;
        }
    }

    if let Some(view) = session.view() {
        render(view, session.config());
    }

    if let Some(path) = &args.export_csv {
        let message = session.export_csv(path).await?;
        println!("{message}");
    }
    if let Some(path) = &args.export_json {
        let message = session.export_json(path).await?;
        println!("{message}");
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    logging::init_tracing();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    };

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
