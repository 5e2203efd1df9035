use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use pemira::command_failure_message;
use pemira::constants::*;
use pemira::load_candidate_image;
use pemira::load_summary;
use pemira::utils::current_year;
use pemira::AdminControls;
use pemira::BallotSession;
use pemira::CachedStatus;
use pemira::CandidateDraft;
use pemira::CandidateId;
use pemira::CandidateManager;
use pemira::ClientBuilder;
use pemira::ClientConfig;
use pemira::ElectionLifecycle;
use pemira::Error;
use pemira::IdentityCapture;
use pemira::IdentityView;
use pemira::LifecycleCommand;
use pemira::PasswordFeedback;
use pemira::PasswordForm;
use pemira::PemiraApi;
use pemira::PemiraConfig;
use pemira::PreconditionError;
use pemira::Result;
use pemira::SessionContext;
use pemira::SessionView;
use pemira::VoterRoll;
use tracing::error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

#[derive(Parser, Debug)]
#[command(name = "pemira", version, about = "Pemira election client")]
struct Cli {
    /// Extra TOML file merged over the loaded configuration
    #[arg(long, global = true)]
    config: Option<String>,

    /// Bearer token of an admin session, as printed by `login`
    #[arg(long, global = true, env = "PEMIRA_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Admin user id, needed by `change-password`
    #[arg(long, global = true, env = "PEMIRA_USER_ID")]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the election status
    Status,
    /// Open the election (closed -> open)
    Start,
    /// End the election (open -> completed)
    End,
    /// Purge every ballot and close the election
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Register a voter
    Identity {
        #[arg(long)]
        name: String,
        #[arg(long)]
        nim: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        cohort: String,
    },
    /// Show the ballot of a voter, or cast it with `--candidate`
    Vote {
        #[arg(long)]
        nim: String,
        #[arg(long)]
        candidate: Option<CandidateId>,
    },
    /// List registered voters
    Voters {
        #[arg(long)]
        search: Option<String>,
        /// Write the listed voters as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show the tally
    Results,
    /// List candidates
    Candidates {
        #[arg(long)]
        search: Option<String>,
    },
    AddCandidate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        vision: String,
        #[arg(long = "mission")]
        missions: Vec<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    DeleteCandidate {
        id: CandidateId,
        #[arg(long)]
        yes: bool,
    },
    /// Log in and print the issued token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "PEMIRA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    ChangePassword {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Initializing Logs
    let _guard = match init_observability(&settings.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = tokio::select! {
        outcome = run(cli, settings) => outcome,
        _ = tokio::signal::ctrl_c() => {
            info!("Ctrl+C detected.");
            Ok(ExitCode::from(130))
        }
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            error!("command failed: {}", e);
            eprintln!("{}", e.user_message(MSG_LOGIN_SYSTEM));
            ExitCode::FAILURE
        }
    }
}

fn load_settings(path: Option<&str>) -> Result<PemiraConfig> {
    let settings = PemiraConfig::new()?;
    let settings = match path {
        Some(path) => settings.with_override_config(path)?,
        None => settings,
    };
    settings.validate()
}

pub fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("pemira.log"))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();

    Ok(guard)
}

async fn run(
    cli: Cli,
    settings: PemiraConfig,
) -> Result<ExitCode> {
    let client = ClientBuilder::new(settings.api.base_url.clone())
        .set_config(ClientConfig::from(&settings.api))
        .build()?;
    let api: Arc<dyn PemiraApi> = Arc::new(client);
    let lifecycle = Arc::new(ElectionLifecycle::new(api.clone()));
    let session = Arc::new(SessionContext::new(
        api.clone(),
        settings.session.clone(),
        &settings.ui,
    ));
    if let Some(token) = cli.token {
        session.restore(token, cli.user_id);
    }

    match cli.command {
        Command::Status => {
            if let Err(e) = lifecycle.fetch_status().await {
                eprintln!("{}", e.user_message(MSG_STATUS_FETCH_FAILED));
            }
            println!("{}", CachedStatus::Known(lifecycle.cached().effective()).label());
            Ok(ExitCode::SUCCESS)
        }
        Command::Start => run_lifecycle(&lifecycle, &session, LifecycleCommand::Start, false).await,
        Command::End => run_lifecycle(&lifecycle, &session, LifecycleCommand::End, false).await,
        Command::Reset { yes } => {
            run_lifecycle(&lifecycle, &session, LifecycleCommand::Reset, yes).await
        }
        Command::Identity {
            name,
            nim,
            department,
            cohort,
        } => {
            let mut capture = IdentityCapture::new(api, lifecycle, current_year());
            if let IdentityView::Unavailable { notice, error } = capture.open().await {
                print_error(error);
                println!("{notice}");
                return Ok(ExitCode::FAILURE);
            }

            let form = capture.form_mut();
            form.name = name;
            form.student_id = nim;
            form.department = department;
            form.cohort = cohort;

            match capture.submit().await {
                Ok(redirect) => {
                    println!("{}", redirect.follow().await);
                    Ok(ExitCode::SUCCESS)
                }
                Err(IdentityView::Form {
                    field_errors,
                    error,
                    ..
                }) => {
                    field_errors.iter().for_each(|e| eprintln!("{e}"));
                    print_error(error);
                    Ok(ExitCode::FAILURE)
                }
                Err(IdentityView::Unavailable { notice, .. }) => {
                    println!("{notice}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Vote { nim, candidate } => {
            let mut ballot = BallotSession::new(api, lifecycle, Some(nim), settings.ui.redirect_delay())?;
            let mut view = ballot.start().await;
            if let Some(candidate) = candidate.filter(|_| matches!(view, SessionView::Ballot(_))) {
                if let Err(e) = ballot.select(candidate) {
                    eprintln!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
                view = ballot.submit().await;
            }
            render_ballot(view).await
        }
        Command::Voters { search, export } => {
            session.require_token()?;
            let mut roll = match VoterRoll::load(api.as_ref()).await {
                Ok(roll) => roll,
                Err(message) => {
                    eprintln!("{message}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            if let Some(search) = search {
                roll.set_search(search);
            }
            match export {
                Some(path) => {
                    let path = if path.is_dir() {
                        path.join(VOTER_CSV_FILE_NAME)
                    } else {
                        path
                    };
                    let written = roll.export(&path).await?;
                    println!("{written} -> {}", path.display());
                }
                None => {
                    for voter in roll.filtered() {
                        println!("{}", voter.fields().join("\t"));
                    }
                    println!("Total: {}", roll.total());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Results => {
            session.require_token()?;
            let summary = match load_summary(api.as_ref()).await {
                Ok(summary) => summary,
                Err(e) => {
                    eprintln!("{}", e.user_message(MSG_DASHBOARD_FAILED));
                    return Ok(ExitCode::FAILURE);
                }
            };
            println!("Status: {}", summary.status_label());
            println!("Pemilih: {}", summary.total_voters);
            println!("Kandidat: {}", summary.total_candidates);
            for tally in &summary.tally {
                println!("{}\t{}\t{}", tally.candidate_id, tally.name, tally.votes);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Candidates { search } => {
            let mut manager = CandidateManager::new(api, session.clone());
            if manager.refresh().await.is_err() {
                print_error(manager.error().map(str::to_string));
                return Ok(ExitCode::FAILURE);
            }
            if let Some(search) = search {
                manager.set_search(search);
            }
            for candidate in manager.filtered() {
                println!(
                    "{}\t{}\t{}",
                    candidate.id,
                    candidate.name,
                    candidate.headline_vision().unwrap_or("-")
                );
            }
            println!("Total: {}", manager.total());
            Ok(ExitCode::SUCCESS)
        }
        Command::AddCandidate {
            name,
            vision,
            missions,
            image,
        } => {
            let image = match image {
                Some(path) => Some(load_candidate_image(&path).await?),
                None => None,
            };
            let mut manager = CandidateManager::new(api, session.clone());
            let draft = CandidateDraft {
                name,
                image,
                vision,
                missions,
            };
            match manager.add(draft).await {
                Ok(candidate) => {
                    println!("{}\t{}", candidate.id, candidate.name);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("{}", e.user_message(MSG_ADD_CANDIDATE_FAILED));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::DeleteCandidate { id, yes } => {
            session.require_token()?;
            let mut manager = CandidateManager::new(api, session.clone());
            let confirmation = manager.request_delete(id);
            if !yes {
                println!("{}", confirmation.prompt());
                confirmation.cancel();
                return Err(PreconditionError::ConfirmationRequired("delete-candidate").into());
            }
            match confirmation.confirm().await {
                Ok(()) => Ok(ExitCode::SUCCESS),
                Err(e) => {
                    eprintln!("{}", e.user_message(MSG_DELETE_CANDIDATE_FAILED));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Login { username, password } => match session.login(&username, &password).await {
            Ok(redirect) => {
                let token = session.require_token()?;
                println!("PEMIRA_TOKEN={token}");
                if let Some(user_id) = session.user_id() {
                    println!("PEMIRA_USER_ID={user_id}");
                }
                info!("[:main] login redirects to {}", redirect.to);
                Ok(ExitCode::SUCCESS)
            }
            Err(failure) => {
                eprintln!("{}", failure.message);
                Ok(ExitCode::FAILURE)
            }
        },
        Command::ChangePassword { old, new, confirm } => {
            let mut form = PasswordForm {
                old_password: old,
                new_password: new,
                confirm_password: confirm,
            };
            match pemira::change_password(api.as_ref(), &session, &mut form).await {
                PasswordFeedback::Success(message) => {
                    println!("{message}");
                    Ok(ExitCode::SUCCESS)
                }
                PasswordFeedback::Error(message) => {
                    eprintln!("{message}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

async fn run_lifecycle(
    lifecycle: &Arc<ElectionLifecycle>,
    session: &Arc<SessionContext>,
    command: LifecycleCommand,
    confirmed: bool,
) -> Result<ExitCode> {
    if let Err(e) = lifecycle.fetch_status().await {
        eprintln!("{}", e.user_message(MSG_STATUS_FETCH_FAILED));
    }
    let controls = AdminControls::new(lifecycle.clone(), session.clone());

    let result = match command {
        LifecycleCommand::Start => controls.start_election().await,
        LifecycleCommand::End => controls.end_election().await,
        LifecycleCommand::Reset => match controls.request_reset() {
            Ok(confirmation) if confirmed => confirmation.confirm().await,
            Ok(confirmation) => {
                println!("{}", confirmation.prompt());
                confirmation.cancel();
                Err(Error::from(PreconditionError::ConfirmationRequired(
                    command.name(),
                )))
            }
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(status) => {
            println!("{}", CachedStatus::Known(status).label());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("[:main] {} failed: {}", command.name(), e);
            eprintln!("{}", command_failure_message(command, &e));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn render_ballot(view: SessionView) -> Result<ExitCode> {
    match view {
        SessionView::Loading | SessionView::Discarded => Ok(ExitCode::FAILURE),
        SessionView::Unavailable { notice, error } => {
            print_error(error);
            println!("{notice}");
            Ok(ExitCode::FAILURE)
        }
        SessionView::AlreadyVoted { message, redirect } => {
            println!("{message}");
            println!("{}", redirect.follow().await);
            Ok(ExitCode::SUCCESS)
        }
        SessionView::Failed { message, .. } => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
        SessionView::Ballot(ballot) => {
            print_error(ballot.error.clone());
            for candidate in &ballot.candidates {
                let marker = if ballot.selected == Some(candidate.id) { "*" } else { " " };
                println!(
                    "{marker} {}\t{}\t{}",
                    candidate.id,
                    candidate.name,
                    candidate.headline_vision().unwrap_or("-")
                );
            }
            Ok(if ballot.error.is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        SessionView::Confirmed {
            message, redirect, ..
        } => {
            println!("{message}");
            println!("{}", redirect.follow().await);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_error(error: Option<String>) {
    if let Some(error) = error {
        eprintln!("{error}");
    }
}
