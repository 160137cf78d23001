//! kempt command-line front end.
//!
//! Checks HTML files, reports what was wrong with them and writes a
//! repaired, consistently formatted version.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use kempt_common::warning::notice_once;
use kempt_config::{OptionId, OptionStore};
use kempt_document::{Document, Status};
use owo_colors::OwoColorize;

/// Exit code for failures that stop kempt before a status is known.
const EXIT_FATAL: u8 = 3;

/// kempt: a tolerant HTML checker and pretty printer
#[derive(Parser, Debug)]
#[command(name = "kempt")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Check a file and print the tidied markup
    kempt page.html

    # Tidy in place with indentation
    kempt -m -i page.html

    # Only report problems
    kempt -e page.html

    # Read from stdin, write XHTML to a file
    cat page.html | kempt -x -o page.xhtml

    # Use a config file and override one setting
    kempt -c house.conf -s wrap=100 page.html

EXIT STATUS:
    0  no warnings or errors
    1  warnings only
    2  errors
    3  a file could not be read or written
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// HTML files to process; stdin when none are given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Read settings from a config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set one option, e.g. `-s wrap=100` (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,

    /// Write output to this file instead of stdout
    #[arg(short, long, value_name = "FILE", conflicts_with = "modify")]
    output: Option<PathBuf>,

    /// Write output back to each input file
    #[arg(short, long)]
    modify: bool,

    /// Indent block content
    #[arg(short, long)]
    indent: bool,

    /// Wrap lines at this column (0 disables wrapping)
    #[arg(short, long, value_name = "N")]
    wrap: Option<u64>,

    /// Only report problems, write no markup
    #[arg(short, long)]
    errors: bool,

    /// Leave out the summary line
    #[arg(short, long)]
    quiet: bool,

    /// Write XHTML
    #[arg(short = 'x', long)]
    xhtml: bool,

    /// List every option with its current value and exit
    #[arg(long)]
    show_config: bool,

    /// Print the repaired document tree (debugging aid)
    #[arg(long)]
    tree: bool,

    /// Never color diagnostics
    #[arg(long)]
    no_color: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            eprintln!("kempt: {err:#}");
            ExitCode::from(EXIT_FATAL)
        }
    }
}

/// Process every input and return the worst status seen.
fn run(cli: &Cli) -> Result<Status> {
    let settings = configure(cli)?;

    let mut diagnostics = open_diagnostics(settings.options())?;
    let color = !cli.no_color && diagnostics.is_tty();
    settings
        .report_messages(&mut diagnostics, color)
        .context("cannot write diagnostics")?;

    if cli.show_config {
        show_config(settings.options(), &mut io::stdout().lock())?;
        return Ok(Status::Clean);
    }

    if cli.output.is_some() && cli.files.len() > 1 {
        bail!("--output needs exactly one input file");
    }

    let mut worst = Status::Clean;
    if cli.files.is_empty() {
        if cli.modify {
            notice_once("kempt", "--modify has no effect when reading stdin");
        }
        let status = process(cli, &settings, None, &mut diagnostics, color)?;
        worst = worst.max(status);
    }
    for path in &cli.files {
        let status = process(cli, &settings, Some(path), &mut diagnostics, color)?;
        worst = worst.max(status);
    }
    log::debug!("worst status: {worst}");
    Ok(worst)
}

/// A document holding the settings from the config file, `--set` and
/// the shorthand flags, in that order.
fn configure(cli: &Cli) -> Result<Document> {
    let mut settings = Document::new();
    if let Some(path) = &cli.config {
        let problems = settings
            .load_config_file(path)
            .with_context(|| format!("cannot load config {}", path.display()))?;
        log::debug!("{} problem(s) in {}", problems, path.display());
    }

    for pair in &cli.set {
        let Some((name, value)) = pair.split_once(['=', ':']) else {
            bail!("expected KEY=VALUE, got {pair:?}");
        };
        // Rejected values are recorded as messages and reported with them.
        let _ = settings.set_option(name.trim(), value.trim());
    }

    let mut flags: Vec<(&str, String)> = Vec::new();
    if cli.indent {
        flags.push(("indent", "auto".to_owned()));
    }
    if let Some(wrap) = cli.wrap {
        flags.push(("wrap", wrap.to_string()));
    }
    if cli.errors {
        flags.push(("markup", "no".to_owned()));
    }
    if cli.quiet {
        flags.push(("quiet", "yes".to_owned()));
    }
    if cli.xhtml {
        flags.push(("output-xhtml", "yes".to_owned()));
    }
    for (name, value) in flags {
        let _ = settings.set_option(name, &value);
    }
    Ok(settings)
}

/// Parse, repair, report and save one input. `None` means stdin.
fn process(
    cli: &Cli,
    settings: &Document,
    path: Option<&Path>,
    diagnostics: &mut Diagnostics,
    color: bool,
) -> Result<Status> {
    let mut doc = Document::new();
    doc.copy_config_from(settings);

    let name = path.map_or_else(|| "stdin".to_owned(), |p| p.display().to_string());
    log::debug!("processing {name}");
    let _ = match path {
        Some(path) => doc.parse_file(path)?,
        None => doc.parse_reader(io::stdin().lock())?,
    };
    let _ = doc.clean_and_repair()?;
    let _ = doc.run_diagnostics()?;

    if cli.tree
        && let Some(dump) = doc.tree_dump()
    {
        print!("{dump}");
    }

    let target = if cli.modify { path } else { cli.output.as_deref() };
    let written = match target {
        Some(target) => doc.save_file(target)?,
        None => doc.save_to_writer(&mut io::stdout().lock())?,
    };
    if !written {
        log::debug!("no output written for {name}");
    }

    doc.report_messages(diagnostics, color)
        .context("cannot write diagnostics")?;
    if !doc.options().get_bool(OptionId::Quiet) {
        let summary = doc.error_summary();
        let line = if color {
            match doc.status() {
                Status::Clean => summary.green().to_string(),
                Status::Warnings => summary.yellow().to_string(),
                Status::Errors => summary.red().bold().to_string(),
            }
        } else {
            summary
        };
        writeln!(diagnostics, "{name}: {line}").context("cannot write diagnostics")?;
    }
    Ok(doc.status())
}

/// `--show-config`: one line per option.
fn show_config(options: &OptionStore, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{:<24} {:<10} {:<14} {}", "Name", "Type", "Current", "Description")?;
    writeln!(out, "{:<24} {:<10} {:<14} {}", "====", "====", "=======", "===========")?;
    for (def, value) in options.iter() {
        let current = value.to_string();
        let current = if current.is_empty() { "-".to_owned() } else { current };
        writeln!(
            out,
            "{:<24} {:<10} {:<14} {}{}",
            def.id.name(),
            def.kind.option_type(),
            current,
            def.doc,
            if def.read_only { " (read-only)" } else { "" }
        )?;
    }
    Ok(())
}

/// Where messages and summaries go: stderr, or the `error-file`.
enum Diagnostics {
    Stderr(io::Stderr),
    File(File),
}

impl Diagnostics {
    fn is_tty(&self) -> bool {
        match self {
            Self::Stderr(stderr) => stderr.is_terminal(),
            Self::File(_) => false,
        }
    }
}

impl Write for Diagnostics {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stderr(stderr) => stderr.write(buf),
            Self::File(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stderr(stderr) => stderr.flush(),
            Self::File(file) => file.flush(),
        }
    }
}

fn open_diagnostics(options: &OptionStore) -> Result<Diagnostics> {
    let path = options.get_str(OptionId::ErrorFile);
    if path.is_empty() {
        return Ok(Diagnostics::Stderr(io::stderr()));
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open error file {path}"))?;
    Ok(Diagnostics::File(file))
}
