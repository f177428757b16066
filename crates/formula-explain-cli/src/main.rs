//! formula-explain CLI - explain spreadsheet formulas by column header

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use formula_explain::prelude::*;
use formula_explain::{FormulaRequest, FormulaResponse, SheetExplanation};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "formula-explain")]
#[command(
    author,
    version,
    about = "Explain spreadsheet formulas in terms of their column headers"
)]
struct Cli {
    /// Log skipped formulas and cache statistics (repeat for more detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file (xlsx, xlsm, csv)
        input: PathBuf,
    },

    /// Explain the formulas of a sheet
    Explain {
        /// Input spreadsheet file (xlsx, xlsm, csv)
        input: PathBuf,

        #[command(flatten)]
        selection: SheetSelection,

        /// Keep one row per formula instead of one per header
        #[arg(long)]
        append_duplicates: bool,

        /// Print JSON instead of `header = interpretation` lines
        #[arg(long)]
        json: bool,
    },

    /// Answer a JSON request of formulas and headers
    Request {
        /// Request file (default: stdin)
        input: Option<PathBuf>,
    },
}

#[derive(Args)]
struct SheetSelection {
    /// Sheet name to explain
    #[arg(short, long, conflicts_with_all = ["index", "all"])]
    sheet: Option<String>,

    /// Sheet index to explain (0-based, default: 0)
    #[arg(short, long, conflicts_with = "all")]
    index: Option<usize>,

    /// Explain every sheet
    #[arg(short, long)]
    all: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input, &mut out),
        Commands::Explain {
            input,
            selection,
            append_duplicates,
            json,
        } => {
            let options = InterpretOptions {
                duplicate_headers: if append_duplicates {
                    DuplicateHeaders::Append
                } else {
                    DuplicateHeaders::Overwrite
                },
            };
            explain(&input, &selection, &options, json, &mut out)
        }
        Commands::Request { input } => answer_request(input.as_deref(), &mut out),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn open_workbook(input: &Path) -> Result<Workbook> {
    Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))
}

fn list_sheets<W: Write>(input: &Path, out: &mut W) -> Result<()> {
    let workbook = open_workbook(input)?;

    for (i, name) in workbook.sheet_names().iter().enumerate() {
        writeln!(out, "{}\t{}", i, name)?;
    }

    Ok(())
}

fn explain<W: Write>(
    input: &Path,
    selection: &SheetSelection,
    options: &InterpretOptions,
    json: bool,
    out: &mut W,
) -> Result<()> {
    let workbook = open_workbook(input)?;

    if selection.all {
        let sheets = workbook.explain_all(options);
        return if json {
            write_sheets_json(&sheets, out)
        } else {
            write_sheets_text(&sheets, out)
        };
    }

    let sheet = select_sheet(&workbook, selection)?;
    let explanations = sheet.explain(options);
    log::info!(
        "explained {} formula(s) of sheet '{}'",
        explanations.len(),
        sheet.name()
    );

    if json {
        let response = FormulaResponse {
            formulas: explanations,
        };
        serde_json::to_writer_pretty(&mut *out, &response).context("Failed to write JSON")?;
        writeln!(out)?;
    } else {
        write!(out, "{}", explanations)?;
    }

    Ok(())
}

fn select_sheet<'a>(workbook: &'a Workbook, selection: &SheetSelection) -> Result<&'a Worksheet> {
    if workbook.is_empty() {
        bail!("Workbook has no sheets");
    }

    if let Some(name) = &selection.sheet {
        return workbook
            .worksheet_by_name(name)
            .with_context(|| format!("Sheet '{}' not found", name));
    }

    let index = selection.index.unwrap_or(0);
    workbook.worksheet(index).with_context(|| {
        format!(
            "Sheet index {} not found ({} sheet(s))",
            index,
            workbook.sheet_count()
        )
    })
}

fn write_sheets_text<W: Write>(sheets: &[SheetExplanation], out: &mut W) -> Result<()> {
    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "[{}]", sheet.name)?;
        write!(out, "{}", sheet.explanations)?;
    }
    Ok(())
}

fn write_sheets_json<W: Write>(sheets: &[SheetExplanation], out: &mut W) -> Result<()> {
    let value: Vec<serde_json::Value> = sheets
        .iter()
        .map(|sheet| {
            serde_json::json!({
                "sheet": sheet.name,
                "formulas": sheet.explanations,
            })
        })
        .collect();

    serde_json::to_writer_pretty(&mut *out, &value).context("Failed to write JSON")?;
    writeln!(out)?;
    Ok(())
}

fn answer_request<W: Write>(input: Option<&Path>, out: &mut W) -> Result<()> {
    let text = match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read request from stdin")?;
            text
        }
    };

    let response = respond(&text)?;
    serde_json::to_writer(&mut *out, &response).context("Failed to write JSON")?;
    writeln!(out)?;
    Ok(())
}

fn respond(text: &str) -> Result<FormulaResponse> {
    let request: FormulaRequest =
        serde_json::from_str(text).context("Failed to parse formula request")?;
    Ok(request.interpret(&InterpretOptions::default()))
}
