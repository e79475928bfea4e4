//! Command line client for whois-bi.
//!
//! Every command except `register` and `verify` logs in first; the session
//! lives only as long as the process.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use humantime_serde::re::humantime;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use whois_bi_app::{AppConfig, AppState, AppStateBuilder};
use whois_bi_core::PollState;
use whois_bi_core::search::{self, SortDirection, SortKey};

#[derive(Parser)]
#[command(name = "whois-bi", version, about = "Monitor DNS records and WHOIS data of your domains")]
struct Cli {
    /// TOML configuration file
    #[arg(long, short, env = "WHOIS_BI_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, env = "WHOIS_BI_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "WHOIS_BI_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List monitored domains
    Domains {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Start monitoring one or more domains
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Stop monitoring a domain
    Delete { name: String },
    /// Show a domain and its records
    Show {
        name: String,
        /// Show removed records instead of current ones
        #[arg(long)]
        history: bool,
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort: SortArg,
        #[arg(long)]
        desc: bool,
    },
    /// Show the WHOIS history of a domain
    Whois { name: String },
    /// Add records from raw zone text ("-" reads stdin)
    AddRecord { name: String, raw: String },
    /// Show the job history of a domain
    Jobs { name: String },
    /// Queue a check and wait for it to finish
    Check {
        name: String,
        #[arg(long, default_value = "10m", value_parser = humantime::parse_duration)]
        timeout: Duration,
    },
    /// Create an account
    Register {
        #[arg(long, env = "WHOIS_BI_PASSWORD_CONFIRM", hide_env_values = true)]
        confirm: String,
    },
    /// Activate an account with the emailed code
    Verify { code: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Type,
    Ttl,
    Added,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => Self::Name,
            SortArg::Type => Self::Type,
            SortArg::Ttl => Self::Ttl,
            SortArg::Added => Self::AddedAt,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let state = AppStateBuilder::new(config).build()?;

    match &cli.command {
        Command::Register { confirm } => {
            let (email, password) = credentials(&cli)?;
            state.auth.register(email, password, confirm).await?;
            println!("Check {email} for a verification code");
            return Ok(());
        }
        Command::Verify { code } => {
            state.auth.verify(code).await?;
            println!("Account verified");
            return Ok(());
        }
        _ => {}
    }

    let (email, password) = credentials(&cli)?;
    state.auth.login(email, password).await?;

    let result = dispatch(&state, cli.command).await;
    state.shutdown();
    state.auth.logout().await;
    result
}

fn credentials(cli: &Cli) -> anyhow::Result<(&str, &str)> {
    let email = cli
        .email
        .as_deref()
        .context("--email (or WHOIS_BI_EMAIL) is required")?;
    let password = cli
        .password
        .as_deref()
        .context("--password (or WHOIS_BI_PASSWORD) is required")?;
    Ok((email, password))
}

async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Domains { filter } => {
            state.domains.list_domains().await?;
            if let Some(filter) = filter {
                state.domains.set_query(&filter);
            }
            output::domains(&state.domains.snapshot().filtered_domains());
        }
        Command::Add { names } => {
            let results = state.domains.create_domains(&names.join("\n")).await?;
            output::batch(&results);
            let failed = results.iter().filter(|r| !r.is_success()).count();
            if failed > 0 {
                bail!("{failed} of {} domains could not be added", results.len());
            }
        }
        Command::Delete { name } => {
            state.domains.delete_domain(&name).await?;
            println!("Stopped monitoring {name}");
        }
        Command::Show {
            name,
            history,
            filter,
            sort,
            desc,
        } => {
            state.domains.get_domain(&name).await?;
            state.domains.get_records(&name).await?;
            if let Some(filter) = filter {
                state.domains.set_query(&filter);
            }

            let snap = state.domains.snapshot();
            let domain = snap.require(&name)?;
            let mut records = if history {
                snap.historical_records(domain.id)
            } else {
                snap.current_records(domain.id)
            };
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            search::sort_records(&mut records, sort.into(), direction);

            output::domain(domain, snap.whois(domain.id));
            output::records(&records);
        }
        Command::Whois { name } => {
            let history = state.domains.get_whois(&name).await?;
            output::whois(&history);
        }
        Command::AddRecord { name, raw } => {
            let raw = if raw == "-" {
                std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
            } else {
                raw
            };
            let response = state.domains.add_record(&name, &raw).await?;
            output::records(&response.records);
            for error in &response.errors {
                println!("rejected: {error}");
            }
        }
        Command::Jobs { name } => {
            state.jobs.fetch_jobs(&name).await?;
            output::jobs(state.jobs.snapshot().jobs(&name));
        }
        Command::Check { name, timeout } => check(state, &name, timeout).await?,
        Command::Register { .. } | Command::Verify { .. } => {}
    }
    Ok(())
}

/// Queue a job and follow it until the domain is idle again.
async fn check(state: &AppState, name: &str, timeout: Duration) -> anyhow::Result<()> {
    let job = state.jobs.create_job(name).await?;
    println!("Queued job {} for {name}", job.id);

    let mut rx = state.jobs.subscribe();
    let watch = state.watch_domain(name);
    let idle = async {
        while rx.borrow_and_update().poll_state(name) != PollState::Idle {
            rx.changed().await?;
        }
        anyhow::Ok(())
    };

    tokio::select! {
        result = tokio::time::timeout(timeout, idle) => {
            result.with_context(|| format!("Job {} did not finish within {}", job.id, humantime::format_duration(timeout)))??;
        }
        _ = tokio::signal::ctrl_c() => {
            watch.stop().await;
            bail!("Interrupted");
        }
    }
    watch.stop().await;

    let snap = state.jobs.snapshot();
    if let Some(finished) = snap.jobs(name).iter().find(|j| j.id == job.id) {
        output::jobs(std::slice::from_ref(finished));
    }
    let domains = state.domains.snapshot();
    if let Some(domain) = domains.domain(name) {
        output::domain(domain, domains.whois(domain.id));
    }
    Ok(())
}
