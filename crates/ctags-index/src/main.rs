use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use ctags_index::{
    Result, Settings, TagIndexManager, TagsLanguageServer,
    config::StorageKind,
};
use tower_lsp::{LspService, Server};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "ctags-index", version, about)]
struct Args {
    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Directory the generator runs in and tag paths are relative to.
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Tag table, relative to the root.
    #[arg(long, global = true)]
    tags: Option<String>,

    /// Keep only byte offsets in memory and re-read the table per query.
    #[arg(long, global = true)]
    byte_range: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the language server on stdio (default).
    Serve,
    /// Print every definition of a symbol as `path:line`.
    Lookup { symbol: String },
    /// Print tag names starting with a prefix.
    Complete { prefix: String },
    /// Run the tag generator, then report the indexed tag count.
    Regenerate {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn default_log_path() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".ctags-index");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir.join("ctags-index.log");
        }
    }
    std::env::temp_dir().join("ctags-index.log")
}

fn init_tracing(
    args: &Args,
    serving: bool,
) -> PathBuf {
    let stderr_filter = match (args.verbose, serving) {
        (true, _) => EnvFilter::new("ctags_index=debug,tower_lsp=debug"),
        (false, true) => EnvFilter::new("ctags_index=info,tower_lsp=warn"),
        (false, false) => EnvFilter::new("ctags_index=warn"),
    };
    let file_filter = if args.verbose {
        EnvFilter::new("ctags_index=debug,tower_lsp=info")
    } else {
        EnvFilter::new("ctags_index=info,tower_lsp=warn")
    };

    let log_path = args.log_file.clone().unwrap_or_else(default_log_path);
    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path.file_name().unwrap_or(std::ffi::OsStr::new("ctags-index.log")),
    );

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).with_target(false).with_filter(file_filter);
    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();
    log_path
}

/// Project file and command-line overrides over defaults.
fn startup_settings(
    args: &Args,
    root: &Path,
) -> Settings {
    let mut settings = Settings::load(root, None);
    if let Some(tags) = &args.tags {
        settings.tags.file = tags.clone();
    }
    if args.byte_range {
        settings.tags.storage = StorageKind::ByteRange;
    }
    settings
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let serving = matches!(args.command, None | Some(Command::Serve));
    let log_path = init_tracing(&args, serving);

    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };
    let settings = startup_settings(&args, &root);

    if serving {
        info!("[server] starting ctags-index v{}", env!("CARGO_PKG_VERSION"));
        info!("[server] log file: {}", log_path.display());

        let (service, socket) = LspService::new(|client| TagsLanguageServer::with_base(client, root, settings));
        Server::new(tokio::io::stdin(), tokio::io::stdout(), socket).serve(service).await;

        info!("[server] stopped");
        return ExitCode::SUCCESS;
    }

    let manager = TagIndexManager::new(root, settings);
    match run_command(args.command, &manager).await {
        Ok(code) => code,
        Err(error) => {
            error!("{error}");
            eprintln!("ctags-index: {error}");
            ExitCode::FAILURE
        },
    }
}

async fn run_command(
    command: Option<Command>,
    manager: &TagIndexManager,
) -> Result<ExitCode> {
    match command {
        None | Some(Command::Serve) => Ok(ExitCode::SUCCESS),
        Some(Command::Lookup {
            symbol,
        }) => {
            manager.reindex().await?;
            let Some(matches) = manager.lookup(&symbol).await? else {
                eprintln!("ctags-index: no definition for {symbol}");
                return Ok(ExitCode::FAILURE);
            };
            for found in matches {
                println!("{}:{}", found.path.display(), found.lineno + 1);
            }
            Ok(ExitCode::SUCCESS)
        },
        Some(Command::Complete {
            prefix,
        }) => {
            manager.reindex().await?;
            let Some(completions) = manager.lookup_completions(&prefix).await? else {
                return Ok(ExitCode::FAILURE);
            };
            for completion in completions {
                println!("{}", completion.name);
            }
            Ok(ExitCode::SUCCESS)
        },
        Some(Command::Regenerate {
            args,
        }) => {
            let records = manager.regenerate(args).await?;
            println!("{records} tags in {}", manager.tags_path().await.display());
            Ok(ExitCode::SUCCESS)
        },
    }
}
