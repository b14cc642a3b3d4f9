mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "addrex",
    version,
    about = "Extract recipient addresses from PDF letters into a spreadsheet"
)]
struct Cli {
    /// JSON settings file (defaults apply when omitted)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only report warnings and errors (progress goes to the log, see RUST_LOG)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan PDF letters and append the extracted addresses to the workbook
    Extract {
        /// A folder of PDF letters, or individual PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Include subfolders when a folder is given
        #[arg(short, long)]
        recursive: bool,

        /// Workbook to append to (overrides the configured path)
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Text extraction backend
        #[arg(long, value_enum, default_value = "auto")]
        backend: Backend,
    },
    /// Remove every row from the workbook and rewrite the header
    Clear {
        /// Workbook to clear
        file: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Append addresses that did not come from a PDF
    Append {
        /// Workbook to append to
        file: PathBuf,

        /// One address per argument
        addresses: Vec<String>,

        /// Text file with addresses separated by blank lines
        #[arg(short, long = "from-file", value_name = "TEXT")]
        from_file: Option<PathBuf>,
    },
    /// Print every PDF in a folder, or the given files
    Print {
        /// Folder or PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Include subfolders when a folder is given
        #[arg(short, long)]
        recursive: bool,

        /// Print mode (overrides the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,

        /// Browser (headless) or reader (interactive) to use
        #[arg(short, long, value_name = "PATH")]
        browser: Option<String>,
    },
    /// Show the effective settings as JSON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Backend {
    /// pdftotext when it is on PATH, otherwise the built-in reader
    Auto,
    Pdftotext,
    Lopdf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    Headless,
    Interactive,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let progress = output::Progress { quiet: cli.quiet };

    let result = commands::load_settings(cli.config.as_deref()).and_then(|config| {
        match cli.command {
            Commands::Extract {
                inputs,
                recursive,
                out,
                backend,
            } => commands::extract::run(inputs, recursive, out, backend, config, progress),
            Commands::Clear { file, yes } => commands::clear::run(file, yes, &config, progress),
            Commands::Append {
                file,
                addresses,
                from_file,
            } => commands::append::run(file, addresses, from_file, &config, progress),
            Commands::Print {
                inputs,
                recursive,
                mode,
                browser,
            } => commands::print::run(inputs, recursive, mode, browser, config, progress),
            Commands::Config => commands::config::show(&config),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
