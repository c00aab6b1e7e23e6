use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use codestudio_core::{
    normalize, AiChatRequest, ChangeRecord, ChatSession, File, FileSnapshot, Reconciler,
    DEFAULT_PROJECT_ID,
};
use codestudio_gateway::WorkspaceClient;

mod output;

/// CodeStudio CLI - talk to the AI assistant and apply its file changes
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Gateway base URL
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server: String,

    /// Project to work on
    #[arg(long, default_value = DEFAULT_PROJECT_ID)]
    project: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant; interactive when no message is given
    Chat {
        /// Single message to send
        message: Option<String>,

        /// Show the planned file changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// List the files of the project
    Files,

    /// Apply a saved model response to the project
    Apply {
        /// File holding the raw model output
        #[arg(value_name = "JSON_FILE")]
        path: PathBuf,

        /// Show the planned file changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = WorkspaceClient::new(cli.server.clone());
    let reconciler = Reconciler::new(cli.project.clone());

    match cli.command {
        Commands::Chat { message, dry_run } => {
            let mut session = ChatSession::new();
            match message {
                Some(message) => {
                    chat_turn(&client, &reconciler, &mut session, &message, dry_run).await?;
                }
                None => interactive(&client, &reconciler, &mut session, dry_run).await?,
            }
        }
        Commands::Files => {
            let files = client
                .list_files(&cli.project)
                .await
                .with_context(|| format!("listing files from {}", client.base_url()))?;
            if files.is_empty() {
                println!("No files in project {}", cli.project);
            }
            for file in &files {
                println!("{}", output::render_file(file));
            }
        }
        Commands::Apply { path, dry_run } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let response = normalize(&raw);
            output::print_response(&response);

            let files = client.list_files(&cli.project).await?;
            if !apply_changes(&client, &reconciler, &response.code_changes, &files, dry_run).await {
                anyhow::bail!("some changes were not applied");
            }
        }
    }

    Ok(())
}

async fn interactive(
    client: &WorkspaceClient,
    reconciler: &Reconciler,
    session: &mut ChatSession,
    dry_run: bool,
) -> anyhow::Result<()> {
    println!("CodeStudio chat on project {} (empty line or Ctrl+D to quit)", reconciler.project_id());

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        // A failed turn is reported and the loop keeps going
        if let Err(e) = chat_turn(client, reconciler, session, message, dry_run).await {
            eprintln!("error: {:#}", e);
        }
    }

    Ok(())
}

/// One round trip: snapshot, ask, show, reconcile
async fn chat_turn(
    client: &WorkspaceClient,
    reconciler: &Reconciler,
    session: &mut ChatSession,
    message: &str,
    dry_run: bool,
) -> anyhow::Result<()> {
    let files = client.list_files(reconciler.project_id()).await?;

    let mut request = AiChatRequest::new(message, reconciler.project_id());
    request.all_files = Some(files.iter().map(FileSnapshot::from).collect());
    request.conversation_history = Some(session.to_history());
    session.push_user(message);

    tracing::debug!("Sending chat turn {} with {} files", session.len(), files.len());
    let response = client.chat(&request).await?;
    session.push_assistant(&response);
    output::print_response(&response);

    apply_changes(client, reconciler, &response.code_changes, &files, dry_run).await;
    Ok(())
}

/// Print the plan, or apply it and print the outcome; `false` when a run
/// stopped early
async fn apply_changes(
    client: &WorkspaceClient,
    reconciler: &Reconciler,
    changes: &[ChangeRecord],
    files: &[File],
    dry_run: bool,
) -> bool {
    if dry_run {
        output::print_plan(&Reconciler::plan(changes, files));
        return true;
    }

    let report = reconciler.apply(client, changes, files).await;
    output::print_report(&report);
    report.is_complete()
}
