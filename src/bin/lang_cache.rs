use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use lang_cache::api::HttpTransport;
use lang_cache::app::App;
use lang_cache::client::LanguageApiClient;
use lang_cache::config::ConfigLoader;
use lang_cache::domain::GenerateTarget;
use lang_cache::error::LangCacheError;
use lang_cache::output::{OutputMode, print_report};
use lang_cache::writer::{FileWriter, WriteMode};

#[derive(Parser)]
#[command(name = "lang-cache")]
#[command(about = "Fetch application and applet language files into the local cache")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Generate cached language files")]
    Generate(GenerateArgs),
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(value_enum, default_value = "all")]
    target: GenerateTarget,

    #[arg(long)]
    config: Option<String>,

    #[arg(long, help = "Override the cache root directory")]
    root: Option<Utf8PathBuf>,

    #[arg(long, help = "Number of language files fetched at the same time")]
    jobs: Option<usize>,

    #[arg(long, help = "Write to a temp file and rename it over the destination")]
    atomic_rename: bool,

    #[arg(long, help = "Print the generation report as JSON")]
    json: bool,

    #[arg(long, help = "Exit non-zero when any language file failed")]
    strict: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<LangCacheError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &LangCacheError) -> u8 {
    match error {
        LangCacheError::MissingConfig
        | LangCacheError::ConfigRead(_)
        | LangCacheError::ConfigParse(_)
        | LangCacheError::InvalidApplicationId(_)
        | LangCacheError::InvalidAppletId(_)
        | LangCacheError::InvalidLanguage(_) => 2,
        LangCacheError::ClientSetup(_) => 3,
        LangCacheError::ItemsFailed { .. } => 4,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => run_generate(args),
    }
}

fn run_generate(args: GenerateArgs) -> miette::Result<()> {
    let mut config = ConfigLoader::resolve(args.config.as_deref())?;
    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs.max(1);
    }
    if args.atomic_rename {
        config.write_mode = WriteMode::AtomicRename;
    }

    let transport = HttpTransport::new(&config.api.base_url, config.api.timeout)?;
    let app = App::from_config(
        &config,
        LanguageApiClient::new(transport),
        FileWriter::new(config.write_mode),
    );
    let report = app.generate(args.target);

    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };
    print_report(mode, &report).into_diagnostic()?;

    if args.strict && !report.is_success() {
        return Err(LangCacheError::ItemsFailed {
            failed: report.failed_count(),
        }
        .into());
    }
    Ok(())
}
