//! shupai - convert EPUB books to vertical Chinese typesetting

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shupai::ShupaiConfig;

#[derive(Parser)]
#[command(name = "shupai")]
#[command(
    version,
    about = "Modify EPUB for Traditional Chinese vertical text (Kindle-ready)",
    long_about = None
)]
#[command(after_help = "EXAMPLES:
    shupai novel.epub                  Write novel_vertical.epub
    shupai novel.epub -o out.epub      Write out.epub")]
struct Cli {
    /// Input EPUB file path
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output EPUB file path (default: <input>_vertical.epub)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,

    /// Log each conversion stage to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "shupai=debug" } else { "shupai=error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> shupai::error::Result<()> {
    let mut builder = ShupaiConfig::builder();
    builder.input_path(cli.input.clone());
    if let Some(output) = &cli.output {
        builder.output_path(output.clone());
    }
    let config = builder.build()?;

    let report = config.convert()?;
    if !cli.quiet {
        for finding in &report.findings {
            println!("Warning: {finding}");
        }
        if let Some(path) = &report.output_path {
            println!("Written to {}", path.display());
        }
    }
    Ok(())
}
