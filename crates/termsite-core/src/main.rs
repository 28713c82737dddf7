use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use termsite_core::{SiteConfig, SiteSession};
use termsite_shell::{Effect, ShellSession};
use termsite_store::{ClientMetadata, DeviceId, FileDeviceStorage, FileDocumentStore};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin, Stdout};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";
const EXIT_COMMAND: &str = "exit";

fn cli() -> Command {
    Command::new("termsite")
        .version(termsite_core::VERSION)
        .about("Terminal-themed personal site")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .help("Override the gate password"),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .value_parser(value_parser!(PathBuf))
                .help("Directory for the device id and stored documents"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Write logs as JSON"),
        )
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termsite=info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Line-oriented stdin/stdout
struct Terminal {
    input: Lines<BufReader<Stdin>>,
    output: Stdout,
}

impl Terminal {
    fn new() -> Self {
        Self {
            input: BufReader::new(io::stdin()).lines(),
            output: io::stdout(),
        }
    }

    /// Show `prompt` and read a line; `None` at end of input
    async fn ask(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        self.write(prompt).await?;
        Ok(self.input.next_line().await?)
    }

    async fn write(&mut self, text: &str) -> anyhow::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn println(&mut self, text: &str) -> anyhow::Result<()> {
        self.write(text).await?;
        self.write("\n").await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SiteConfig::default(),
    };
    if let Some(password) = matches.get_one::<String>("password") {
        config = config.with_password(password.clone());
    }
    if let Some(dir) = matches.get_one::<PathBuf>("state-dir") {
        config = config.with_state_dir(dir.clone());
    }

    let device = DeviceId::resolve(
        &FileDeviceStorage::in_dir(&config.state_dir),
        &ClientMetadata::detect(),
    );
    let documents = config.documents_dir();
    let store = Arc::new(
        FileDocumentStore::open(documents.clone())
            .with_context(|| format!("opening document store {}", documents.display()))?,
    );
    let mut site = SiteSession::open(config, store, device).context("starting session")?;
    let mut term = Terminal::new();

    loop {
        let Some(input) = term.ask("Password: ").await? else {
            return Ok(());
        };
        if site.unlock(&input) {
            break;
        }
        term.println("Access denied.").await?;
    }

    if !site.restore().await? {
        loop {
            let Some(input) = term.ask("Choose a nickname: ").await? else {
                return Ok(());
            };
            match site.choose_nickname(input.trim()).await {
                Ok(()) => break,
                Err(e) => term.println(&e.to_string()).await?,
            }
        }
    }

    if let Some(shell) = site.shell() {
        for line in shell.lines() {
            term.println(&line.text).await?;
        }
    }

    loop {
        let prompt = site.shell().map(ShellSession::prompt).unwrap_or_default();
        let Some(line) = term.ask(&prompt).await? else {
            break;
        };
        if line.trim() == EXIT_COMMAND {
            break;
        }

        let result = site.execute(&line)?;
        if result.effect == Effect::ClearLog && !result.is_error() {
            term.write(CLEAR_SCREEN).await?;
            continue;
        }
        if let Some(error) = &result.error {
            term.println(error).await?;
        }
        for output in &result.output_lines {
            term.println(output).await?;
        }
    }

    tracing::info!("session for {} closed", site.device());
    Ok(())
}
