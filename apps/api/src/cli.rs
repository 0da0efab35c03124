use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::models::report::ReportKind;
use crate::results::handlers::SubmitResultRequest;
use crate::scoring::Answers;
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "questionarios",
    about = "Organizational psychology questionnaires: scoring API and client",
    version
)]
struct Cli {
    /// Base URL of a running API, used by the client subcommands
    #[arg(long, global = true, env = "API_URL", default_value = "http://localhost:8080")]
    api_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and report worker (default command)
    Serve(ServeArgs),
    #[command(flatten)]
    Client(ClientCommand),
}

#[derive(Subcommand, Debug)]
enum ClientCommand {
    /// List the instruments the API knows about
    Instruments,
    /// Submit a completed questionnaire and print the stored result
    Submit(SubmitArgs),
    /// Fetch a stored result
    Result {
        id: Uuid,
    },
    /// List a company's collaborators
    Collaborators {
        company_id: Uuid,
    },
    /// Queue a report render and optionally wait for it
    Report(ReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Instrument identifier, e.g. percepcao-assedio
    #[arg(long)]
    instrument: String,
    /// JSON file mapping question id to Likert value: {"1": 4, "2": 2, ...}
    #[arg(long)]
    answers: PathBuf,
    #[arg(long)]
    collaborator: Option<Uuid>,
    #[arg(long)]
    company: Option<Uuid>,
    /// Seconds spent answering
    #[arg(long)]
    time_spent: Option<i32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Result,
    Certificate,
}

impl From<KindArg> for ReportKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Result => ReportKind::Result,
            KindArg::Certificate => ReportKind::Certificate,
        }
    }
}

#[derive(Args, Debug)]
struct ReportArgs {
    result_id: Uuid,
    #[arg(long, value_enum, default_value = "result")]
    kind: KindArg,
    /// Poll until the render finishes
    #[arg(long)]
    wait: bool,
    /// Seconds to wait before giving up
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Where to write the HTML once done (implies --wait)
    #[arg(long)]
    output: Option<PathBuf>,
}

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub(crate) async fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Client(command) => run_client(&cli.api_url, command).await,
    }
}

async fn run_client(api_url: &str, command: ClientCommand) -> Result<()> {
    server::init_tracing("warn");
    let client = ApiClient::new(api_url)?;

    match command {
        ClientCommand::Instruments => print_json(&client.list_instruments().await?),
        ClientCommand::Submit(args) => {
            let raw = std::fs::read_to_string(&args.answers)
                .with_context(|| format!("Failed to read {}", args.answers.display()))?;
            let answers: Answers = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a question → value JSON map", args.answers.display()))?;
            let request = SubmitResultRequest {
                instrument_id: args.instrument,
                answers,
                collaborator_id: args.collaborator,
                company_id: args.company,
                time_spent_seconds: args.time_spent,
            };
            print_json(&client.submit_result(&request).await?)
        }
        ClientCommand::Result { id } => print_json(&client.get_result(id).await?),
        ClientCommand::Collaborators { company_id } => {
            print_json(&client.list_collaborators(company_id).await?)
        }
        ClientCommand::Report(args) => {
            let job = client.request_report(args.result_id, args.kind.into()).await?;
            if !args.wait && args.output.is_none() {
                return print_json(&job);
            }
            let done = client
                .wait_for_report(job.job_id, POLL_INTERVAL, Duration::from_secs(args.timeout))
                .await?;
            match args.output {
                Some(path) => {
                    let html = client.fetch_report(done.job_id).await?;
                    std::fs::write(&path, html)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Report written to {}", path.display());
                    Ok(())
                }
                None => print_json(&done),
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["questionarios"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_report_subcommand_parses() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "questionarios",
            "--api-url",
            "http://api:9000",
            "report",
            &id.to_string(),
            "--kind",
            "certificate",
            "--wait",
        ])
        .unwrap();
        assert_eq!(cli.api_url, "http://api:9000");
        match cli.command {
            Some(Command::Client(ClientCommand::Report(args))) => {
                assert_eq!(args.result_id, id);
                assert!(args.wait);
                assert_eq!(ReportKind::from(args.kind), ReportKind::Certificate);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_collaborators_subcommand_parses() {
        let company = Uuid::new_v4();
        let cli =
            Cli::try_parse_from(["questionarios", "collaborators", &company.to_string()]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Client(ClientCommand::Collaborators { company_id })) if company_id == company
        ));
    }

    #[test]
    fn test_submit_requires_instrument() {
        assert!(Cli::try_parse_from(["questionarios", "submit", "--answers", "a.json"]).is_err());
    }
}
