use clap::{Parser, ValueEnum};
use coord_map::{Layout, ParseReport, parser};
use ron::ser::PrettyConfig;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode RON: {0}")]
    Ron(#[from] ron::Error),
    #[error("no valid coordinates found")]
    NothingAccepted,
}

#[derive(Parser, Debug)]
#[command(name = "parse_coords", about = "Check a coordinate list the way the map importer reads it")]
struct Cli {
    /// Coordinate text file, or `-` for stdin
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = LayoutArg::LabelFirst)]
    layout: LayoutArg,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    /// label, x, y, z
    LabelFirst,
    /// x, y, z, label
    LabelLast,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::LabelFirst => Layout::LabelFirst,
            LayoutArg::LabelLast => Layout::LabelLast,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Ron,
}

fn read_input(input: &Path) -> Result<String, CliError> {
    let result = if input.as_os_str() == "-" {
        io::read_to_string(io::stdin())
    } else {
        std::fs::read_to_string(input)
    };
    result.map_err(|source| CliError::Read {
        path: input.display().to_string(),
        source,
    })
}

fn render(report: &ParseReport, format: OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Ron => {
            let pretty_config = PrettyConfig::new()
                .indentor("  ".to_string())
                .struct_names(true);
            Ok(ron::ser::to_string_pretty(report, pretty_config)?)
        }
    }
}

fn render_text(report: &ParseReport) -> String {
    let mut out = String::new();
    for c in &report.coordinates {
        out.push_str(&format!("{:>8} {:>5} {:>8}  {}\n", c.x, c.y, c.z, c.label));
    }
    for w in &report.warnings {
        let kind = match w.severity {
            coord_map::Severity::Rejected => "skipped",
            coord_map::Severity::Suspicious => "warning",
        };
        out.push_str(&format!("line {} {kind}: {} ({})\n", w.line_number, w.issue, w.line));
    }
    out.push_str(&format!(
        "{} accepted, {} skipped, {} suspicious\n",
        report.coordinates.len(),
        report.rejected().count(),
        report.suspicious().count()
    ));
    out
}

fn run(cli: Cli) -> Result<(), CliError> {
    let text = read_input(&cli.input)?;
    let report = parser::parse_with_layout(&text, cli.layout.into());
    log::info!(
        "Parsed {} with {} coordinate(s) and {} warning(s)",
        cli.input.display(),
        report.coordinates.len(),
        report.warnings.len()
    );

    print!("{}", render(&report, cli.format)?);
    if report.coordinates.is_empty() {
        return Err(CliError::NothingAccepted);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_output_lists_coordinates_and_summary() {
        let report = parser::parse("Home, 100, 64, 200\nbroken line");
        let text = render_text(&report);
        assert!(text.contains("Home"));
        assert!(text.contains("line 2 skipped"));
        assert!(text.ends_with("1 accepted, 1 skipped, 0 suspicious\n"));
    }

    #[test]
    fn json_output_parses_back() {
        let report = parser::parse("Home, 100, 64, 200");
        let json = render(&report, OutputFormat::Json).unwrap();
        let decoded: ParseReport = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, report);
    }

    #[test]
    fn layout_flag_maps_to_parser_layout() {
        assert_eq!(Layout::from(LayoutArg::LabelLast), Layout::LabelLast);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
