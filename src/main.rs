//! Crawl-Tasks main entry point
//!
//! This is the command-line interface for driving the crawl task backend.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use crawl_tasks::config::{load_config_with_hash, Config};
use crawl_tasks::poll::Poller;
use crawl_tasks::task::{AnalyzeResponse, ArtifactKind, TaskClient, TaskRequest, TaskState, TaskStatus};
use crawl_tasks::transport::ConsoleNotifier;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Crawl-Tasks: drive crawl and analysis jobs on the task backend
///
/// Submits crawl jobs, polls their progress, starts analysis passes and
/// fetches the results.
#[derive(Parser, Debug)]
#[command(name = "crawl-tasks")]
#[command(version)]
#[command(about = "Client for the crawl task backend", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a crawl job
    Crawl {
        #[command(flatten)]
        target: CrawlTarget,

        /// Wait for the crawl to finish
        #[arg(long)]
        wait: bool,
    },

    /// Show one task's status
    Status {
        task_id: String,
    },

    /// List all tasks
    List,

    /// Delete a task and its files
    Delete {
        task_id: String,
    },

    /// Start analysis of a completed task
    Analyze {
        task_id: String,

        /// Analysis strategy (defaults to the configured one)
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Print the analysis result of a task
    Results {
        task_id: String,
    },

    /// Download a task's crawl file or analysis report
    Download {
        task_id: String,

        #[arg(short, long, value_enum, default_value_t = DownloadKind::Raw)]
        kind: DownloadKind,

        /// Where to write the file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Crawl, wait, analyze, wait, and print the analysis result
    Run {
        #[command(flatten)]
        target: CrawlTarget,

        /// Analysis strategy (defaults to the configured one)
        #[arg(short, long)]
        strategy: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct CrawlTarget {
    /// Product category to crawl
    #[arg(long)]
    category_id: Option<String>,

    /// Search keyword to crawl
    #[arg(short, long)]
    keyword: Option<String>,

    /// Session cookie for the crawl target
    #[arg(long, env = "CRAWL_TASKS_COOKIE")]
    cookie: Option<String>,

    /// Authorization header value for the crawl target
    #[arg(long, env = "CRAWL_TASKS_AUTHORIZATION")]
    authorization: Option<String>,
}

impl From<CrawlTarget> for TaskRequest {
    fn from(target: CrawlTarget) -> Self {
        TaskRequest {
            category_id: target.category_id,
            keyword: target.keyword,
            cookie: target.cookie,
            authorization: target.authorization,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DownloadKind {
    Raw,
    Analysis,
}

impl From<DownloadKind> for ArtifactKind {
    fn from(kind: DownloadKind) -> Self {
        match kind {
            DownloadKind::Raw => ArtifactKind::Raw,
            DownloadKind::Analysis => ArtifactKind::Analysis,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let client = TaskClient::from_config(&config, Arc::new(ConsoleNotifier))?;
    tracing::debug!("Using backend {}", client.transport().base_url());

    match cli.command {
        Command::Crawl { target, wait } => handle_crawl(&client, &config, target.into(), wait).await,
        Command::Status { task_id } => {
            print_status(&client.get_task(&task_id).await?);
            Ok(())
        }
        Command::List => handle_list(&client).await,
        Command::Delete { task_id } => handle_delete(&client, &task_id).await,
        Command::Analyze { task_id, strategy } => {
            let response = client.start_analyze(&task_id, strategy.as_deref()).await?;
            print_analyze_response(&task_id, &response);
            Ok(())
        }
        Command::Results { task_id } => handle_results(&client, &task_id).await,
        Command::Download {
            task_id,
            kind,
            output,
        } => handle_download(&client, &task_id, kind.into(), output).await,
        Command::Run { target, strategy } => {
            handle_run(&client, &config, target.into(), strategy.as_deref()).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_tasks=info,warn"),
            1 => EnvFilter::new("crawl_tasks=debug,info"),
            2 => EnvFilter::new("crawl_tasks=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_status(status: &TaskStatus) {
    println!("{}  [{}]  {}", status.task_id, status.status, status.message);
    if let Some(result) = &status.result {
        println!("  file: {} ({})", result.file_name, result.file_path);
    }
}

fn print_analyze_response(task_id: &str, response: &AnalyzeResponse) {
    match response {
        AnalyzeResponse::Task(status) => print_status(status),
        AnalyzeResponse::Acknowledged(ack) => println!("{}  {}", task_id, ack.message),
        AnalyzeResponse::Other(serde_json::Value::Null) => println!("{}  analysis started", task_id),
        AnalyzeResponse::Other(serde_json::Value::String(text)) => println!("{}  {}", task_id, text),
        AnalyzeResponse::Other(value) => println!("{}  {}", task_id, value),
    }
}

/// Handles `crawl`: submits a job and optionally waits for it
async fn handle_crawl(
    client: &TaskClient,
    config: &Config,
    request: TaskRequest,
    wait: bool,
) -> anyhow::Result<()> {
    let status = client.create_task(&request).await?;
    print_status(&status);

    if wait {
        let poller = Poller::new(client.clone(), config.poll.clone());
        let finished = poller.wait_for_terminal(&status.task_id).await?;
        print_status(&finished);
    }

    Ok(())
}

/// Handles `list`: prints every task, one per line
async fn handle_list(client: &TaskClient) -> anyhow::Result<()> {
    let tasks = client.list_tasks().await?;
    if tasks.is_empty() {
        println!("No tasks");
    }
    for task in &tasks {
        print_status(task);
    }
    Ok(())
}

/// Handles `delete`: a task that is already gone is not an error
async fn handle_delete(client: &TaskClient, task_id: &str) -> anyhow::Result<()> {
    match client.delete_task(task_id).await {
        Ok(confirmation) => {
            println!("✓ {} deleted {}", task_id, confirmation.message);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            tracing::info!(task_id, "Task already gone");
            println!("✓ {} already gone", task_id);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Handles `results`: prints the analysis payload as pretty JSON
async fn handle_results(client: &TaskClient, task_id: &str) -> anyhow::Result<()> {
    let result = client.get_analysis_results(task_id).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handles `download`: writes the artifact to disk
async fn handle_download(
    client: &TaskClient,
    task_id: &str,
    kind: ArtifactKind,
    output: PathBuf,
) -> anyhow::Result<()> {
    let written = client.save_artifact(task_id, kind, &output).await?;
    println!("✓ Wrote {} bytes to {}", written, output.display());
    Ok(())
}

/// Handles `run`: the whole crawl-then-analyze workflow
async fn handle_run(
    client: &TaskClient,
    config: &Config,
    request: TaskRequest,
    strategy: Option<&str>,
) -> anyhow::Result<()> {
    let poller = Poller::new(client.clone(), config.poll.clone());

    let created = client.create_task(&request).await?;
    print_status(&created);
    let task_id = created.task_id;

    let crawled = poller.wait_for_terminal(&task_id).await?;
    print_status(&crawled);
    if crawled.status != TaskState::Completed {
        anyhow::bail!("Crawl for {} ended as {}: {}", task_id, crawled.status, crawled.message);
    }

    let response = client.start_analyze(&task_id, strategy).await?;
    print_analyze_response(&task_id, &response);

    let analyzed = poller.wait_for_terminal(&task_id).await?;
    if analyzed.status != TaskState::Completed {
        anyhow::bail!("Analysis for {} ended as {}: {}", task_id, analyzed.status, analyzed.message);
    }

    handle_results(client, &task_id).await
}
