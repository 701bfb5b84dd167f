use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use propstruct::export::{Exporter, JsonExporter};
use propstruct::ocr::TesseractCli;
use propstruct::pipeline::{load_image, run_image, run_text, Extraction, PipelineConfig, Profile};

#[derive(Parser, Debug)]
#[command(name = "propstruct")]
#[command(
    version,
    about = "Japanese property listing screenshots to SQL via multi-pass OCR",
    long_about = None
)]
struct Cli {
    /// Verbose logging (per-attempt scores and matched fields)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// OCR a listing screenshot and emit a record
    Extract {
        /// Input image (PNG, JPEG, ...)
        image: PathBuf,

        /// tesseract binary to run
        #[arg(long, default_value = "tesseract")]
        tesseract: PathBuf,

        /// Directory passed to tesseract as TESSDATA_PREFIX
        #[arg(long)]
        tessdata: Option<PathBuf>,

        /// Per-attempt OCR timeout in seconds
        #[arg(long, default_value_t = 60)]
        timeout: u64,

        /// Write the best OCR text here
        #[arg(long)]
        dump_text: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract a record from already-recognized text
    Parse {
        /// UTF-8 text file
        text: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List installed tesseract languages
    Langs {
        #[arg(long, default_value = "tesseract")]
        tesseract: PathBuf,

        #[arg(long)]
        tessdata: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Sql)]
    format: Format,

    #[arg(long, value_enum, default_value_t = ProfileArg::Improved)]
    profile: ProfileArg,

    /// Target table of the INSERT statement
    #[arg(long, default_value = "properties")]
    table: String,

    /// Exit with status 2 when no record could be produced
    #[arg(long)]
    strict: bool,
}

impl OutputArgs {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig::new(self.profile.into()).with_table(self.table.clone())
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Format {
    Sql,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum ProfileArg {
    Simple,
    Improved,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Simple => Profile::Simple,
            ProfileArg::Improved => Profile::Improved,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            image,
            tesseract,
            tessdata,
            timeout,
            dump_text,
            output,
        } => {
            let config = output
                .pipeline_config()
                .with_binary(tesseract)
                .with_tessdata(tessdata)
                .with_timeout(Duration::from_secs(timeout));
            extract(&image, &config, dump_text.as_deref(), &output)
        }
        Commands::Parse { text, output } => parse(&text, &output.pipeline_config(), &output),
        Commands::Langs { tesseract, tessdata } => {
            list_langs(tesseract, tessdata).map(|_| ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn extract(
    image: &Path,
    config: &PipelineConfig,
    dump_text: Option<&Path>,
    output: &OutputArgs,
) -> Result<ExitCode> {
    let decoded = load_image(image)?;
    info!(
        path = %image.display(),
        width = decoded.width(),
        height = decoded.height(),
        "loaded image"
    );

    let engine = config.ocr.engine();
    warn_if_japanese_missing(&engine);

    let run = run_image(&decoded, config.profile, &engine);

    if let (Some(path), Some(best)) = (dump_text, &run.selected) {
        fs::write(path, &best.text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote OCR text");
    }

    emit(&run.extraction, config, output)
}

fn parse(text_path: &Path, config: &PipelineConfig, output: &OutputArgs) -> Result<ExitCode> {
    let text = fs::read_to_string(text_path)
        .with_context(|| format!("failed to read {}", text_path.display()))?;
    let extraction = run_text(&text, config.profile);
    emit(&extraction, config, output)
}

fn emit(
    extraction: &Extraction,
    config: &PipelineConfig,
    output: &OutputArgs,
) -> Result<ExitCode> {
    let (rendered, code) = match extraction {
        Extraction::Record { record, .. } => {
            let exporter: Box<dyn Exporter> = match output.format {
                Format::Sql => Box::new(config.sql_exporter()),
                Format::Json => Box::new(JsonExporter::new()),
            };
            if let Some(path) = &output.output {
                exporter.export(record, path)?;
                info!(path = %path.display(), "wrote record");
                return Ok(ExitCode::SUCCESS);
            }
            (exporter.render(record)?, ExitCode::SUCCESS)
        }
        other => {
            let sentinel = other.sentinel().unwrap_or_default();
            let code = if output.strict { ExitCode::from(2) } else { ExitCode::SUCCESS };
            (format!("{sentinel}\n"), code)
        }
    };

    match &output.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(code)
}

fn warn_if_japanese_missing(engine: &TesseractCli) {
    match engine.available_languages() {
        Ok(langs) if !langs.iter().any(|lang| lang == "jpn") => {
            warn!("tesseract has no 'jpn' language pack; Japanese text will not be recognized");
        }
        Ok(_) => {}
        Err(err) => warn!(%err, "could not list tesseract languages"),
    }
}

fn list_langs(tesseract: PathBuf, tessdata: Option<PathBuf>) -> Result<()> {
    let engine = TesseractCli::new().with_binary(tesseract).with_tessdata(tessdata);
    let langs = engine.available_languages()?;
    for lang in langs {
        println!("{lang}");
    }
    Ok(())
}
