//! Command-line driver: argument handling, the open/convert/close sequence,
//! and the mapping of its outcome to a process exit code.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use pdf2docx::Converter;
use pdf2docx::config::Format;
use tracing::{error, info, warn};

const USAGE: &str = "Usage: pdf2docx <SOURCE> <DESTINATION>";

#[derive(Parser, Debug)]
#[command(name = "pdf2docx", version, about = "Convert a PDF file to DOCX")]
struct Cli {
    /// Source PDF file
    source: Option<PathBuf>,

    /// Destination DOCX file (overwritten if it exists)
    destination: Option<PathBuf>,

    /// Run an HTTP conversion server instead of converting a single file
    #[cfg(feature = "server")]
    #[arg(long)]
    serve: bool,

    /// Address to bind in server mode
    #[cfg(feature = "server")]
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind in server mode
    #[cfg(feature = "server")]
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

/// Run one invocation and return the process exit code.
pub fn run<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return 0;
        }
        Err(err) => {
            error!("{}", err.to_string().trim_end());
            return 1;
        }
    };

    #[cfg(feature = "server")]
    {
        if cli.serve {
            return match crate::server::start_server(&cli.host, cli.port) {
                Ok(()) => 0,
                Err(err) => {
                    error!("Server failed: {err:#}");
                    1
                }
            };
        }
    }

    let (Some(source), Some(destination)) = (cli.source, cli.destination) else {
        error!("missing source or destination path. {USAGE}");
        return 1;
    };

    match convert(&source, &destination) {
        Ok(()) => {
            info!("Conversion completed successfully");
            0
        }
        Err(err) => {
            error!("Conversion failed: {err:#}");
            1
        }
    }
}

fn convert(source: &Path, destination: &Path) -> Result<()> {
    info!(
        "Converting {} to {}",
        source.display(),
        destination.display()
    );

    let is_docx = destination
        .extension()
        .and_then(|e| e.to_str())
        .and_then(Format::from_extension)
        == Some(Format::Docx);
    if !is_docx {
        warn!(
            "destination {} does not have a .docx extension",
            destination.display()
        );
    }

    let converter =
        Converter::open(source).with_context(|| format!("opening {}", source.display()))?;
    let result = converter
        .convert(destination)
        .with_context(|| format!("converting to {}", destination.display()))?;
    converter.close();

    for warning in &result.warnings {
        warn!("{warning}");
    }
    Ok(())
}
