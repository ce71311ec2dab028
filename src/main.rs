mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;
use std::sync::Arc;
use streamvert::{
    api::{ApiClient, JobStatus},
    config,
    convert::{remove_job, ConversionOrchestrator, ConvertSource},
    playback::PlaybackStrategy,
    store::JobStore,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "streamvert=debug".to_string()
        } else {
            "streamvert=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let config = config::load_config_or_default(cli.config.as_deref())?;
    let client = Arc::new(ApiClient::new(&config.api));

    let rt = tokio::runtime::Runtime::new()?;
    match cli.command {
        Commands::Convert { url, file } => rt.block_on(run_convert(client, &config, url, file)),
        Commands::Jobs => rt.block_on(list_jobs(&client)),
        Commands::Status { id } => rt.block_on(show_status(&client, &id)),
        Commands::Delete { id } => rt.block_on(delete_job(&client, &id)),
        Commands::Play { id } => rt.block_on(show_playback(&client, &id)),
        Commands::Health => rt.block_on(check_health(&client)),
    }
}

async fn run_convert(
    client: Arc<ApiClient>,
    config: &config::Config,
    url: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let source = match (url, file) {
        (Some(url), None) => ConvertSource::Url(url),
        (None, Some(path)) => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string)
                .with_context(|| format!("Invalid manifest path: {:?}", path))?;
            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read manifest file: {:?}", path))?;
            ConvertSource::File { name, data }
        }
        (None, None) => anyhow::bail!("Provide a stream URL or --file"),
        (Some(_), Some(_)) => anyhow::bail!("Provide either a URL or --file, not both"),
    };

    let store = Arc::new(JobStore::new());
    let orchestrator = ConversionOrchestrator::with_poll_interval(
        client.clone(),
        store,
        config.convert.poll_interval(),
    );

    // Print phase changes while the pipeline runs.
    let mut phases = orchestrator.subscribe();
    let printer = tokio::spawn(async move {
        let mut last = None;
        while phases.changed().await.is_ok() {
            let label = phases.borrow_and_update().progress_label();
            if let Some(label) = label {
                if last != Some(label) {
                    println!("  {}", label);
                    last = Some(label);
                }
            }
        }
    });

    let result = orchestrator.run(source).await;
    printer.abort();

    let job = result?;
    let output = job.output_url.as_deref().unwrap_or_default();
    println!("Conversion finished: {}", client.media_url(output));
    Ok(())
}

async fn list_jobs(client: &ApiClient) -> Result<()> {
    let store = JobStore::new();
    for job in client.list_jobs().await? {
        store.add_or_update(job);
    }

    if store.is_empty() {
        println!("No jobs.");
        return Ok(());
    }

    println!("{} job(s), {} finished", store.len(), store.done_count());
    for job in store.jobs() {
        println!(
            "{}  {:<10}  {}  {}",
            job.id,
            job.status,
            job.created_at.format("%Y-%m-%d %H:%M:%S"),
            job.source
        );
        if let Some(error) = &job.error {
            tracing::debug!(job_id = %job.id, "Job error detail: {}", error);
            println!("    error: {}", display_error(error));
        }
    }

    Ok(())
}

async fn show_status(client: &ApiClient, id: &str) -> Result<()> {
    let job = client.fetch_job(id).await?;

    println!("Job:     {}", job.id);
    println!("Source:  {}", job.source);
    println!("Status:  {}", job.status);
    println!("Created: {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
    if let Some(output) = &job.output_url {
        println!("Output:  {}", client.media_url(output));
    }
    if let Some(error) = &job.error {
        tracing::debug!(job_id = %job.id, "Job error detail: {}", error);
        println!("Error:   {}", display_error(error));
    }

    Ok(())
}

async fn delete_job(client: &ApiClient, id: &str) -> Result<()> {
    // One-shot invocation: the local history is empty, but removal
    // still goes through the store so unknown ids stay a no-op.
    let store = JobStore::new();
    remove_job(client, &store, id).await?;
    println!("Deleted {}", id);
    Ok(())
}

async fn show_playback(client: &ApiClient, id: &str) -> Result<()> {
    let job = client.fetch_job(id).await?;

    match job.status {
        JobStatus::Done => {
            let output = job
                .output_url
                .as_deref()
                .with_context(|| format!("Job {} is done but has no output URL", job.id))?;
            let resolved = client.media_url(output);

            println!("{}", resolved);
            match PlaybackStrategy::classify(&resolved) {
                PlaybackStrategy::Adaptive => {
                    println!("adaptive stream: attach an HLS player to the manifest");
                }
                PlaybackStrategy::Progressive => {
                    println!("progressive file: hand the URL straight to a video sink");
                }
            }
            Ok(())
        }
        JobStatus::Pending | JobStatus::Converting => {
            anyhow::bail!("Job {} is still in progress ({})", job.id, job.status)
        }
        JobStatus::Error => {
            anyhow::bail!(
                "Job {} failed: {}",
                job.id,
                job.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

async fn check_health(client: &ApiClient) -> Result<()> {
    client.health().await?;
    println!("Service at {} is healthy", client.base_url());
    Ok(())
}

/// Shorten long error text for terminal display. The full text goes to
/// the log, never here.
fn display_error(error: &str) -> String {
    const MAX_DISPLAY: usize = 80;
    if error.chars().count() <= MAX_DISPLAY {
        error.to_string()
    } else {
        let shortened: String = error.chars().take(MAX_DISPLAY).collect();
        format!("{}...", shortened)
    }
}
