use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use client::notify::LOGIN_ROUTE;
use client::util::channels::normalize_channels;
use client::{ClientConfig, Dashboard, Notifier, UiEvent};
use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use wire::{AnalysisOptions, AnalysisRequest, AnalysisTask, ChannelSetDraft, NewFilter, ProcessingMode};

mod render;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("client setup failed: {0}")]
    Client(#[from] client::ApiError),
    #[error("{0} failed; see messages above")]
    Failed(&'static str),
    #[error("task {0} did not finish within the poll budget")]
    Unfinished(String),
    #[error("permission `{0}` is not granted")]
    Denied(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "chanlens", about = "Telegram channel analysis dashboard CLI")]
struct Cli {
    #[arg(long, env = "CHANLENS_API_URL")]
    api_url: Option<String>,

    /// Where the bearer token is kept between runs.
    #[arg(long, env = "CHANLENS_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Print raw JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in with Telegram Mini-App launch data.
    Login {
        #[arg(long, env = "CHANLENS_INIT_DATA")]
        init_data: String,
    },
    Logout,
    /// Exit non-zero unless the signed-in user holds a permission.
    WhoamiCan {
        permission: String,
    },
    Tasks(TasksCommand),
    Analyse(AnalyseArgs),
    Sets(SetsCommand),
    Credits(CreditsCommand),
    Filters(FiltersCommand),
}

#[derive(Args, Debug)]
struct TasksCommand {
    #[command(subcommand)]
    command: TasksSubcommand,
}

#[derive(Subcommand, Debug)]
enum TasksSubcommand {
    List {
        /// Also fetch every task's detailed record and scores.
        #[arg(long, default_value_t = false)]
        details: bool,
    },
    Show {
        task_id: String,
    },
    /// Poll a task until it completes or fails.
    Watch {
        task_id: String,
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        #[arg(long, default_value_t = 120)]
        max_polls: u32,
    },
}

#[derive(Args, Debug)]
struct AnalyseArgs {
    /// Channel username or t.me link; repeatable.
    #[arg(long = "channel", required = true)]
    channels: Vec<String>,

    /// Filter id; repeatable.
    #[arg(long = "filter")]
    filters: Vec<String>,

    #[arg(long, default_value_t = 100)]
    max_posts: u32,

    #[arg(long, default_value_t = false)]
    detailed: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    include_examples: bool,

    #[arg(long, default_value = "batch")]
    mode: ProcessingMode,
}

#[derive(Args, Debug)]
struct SetsCommand {
    #[command(subcommand)]
    command: SetsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SetsSubcommand {
    List,
    Show {
        set_id: String,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = false)]
        public: bool,
    },
    Update {
        set_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public: Option<bool>,
    },
    Delete {
        set_id: String,
    },
    Add {
        set_id: String,
        #[arg(required = true)]
        channels: Vec<String>,
    },
    Remove {
        set_id: String,
        channel: String,
    },
    Parsing {
        set_id: String,
    },
    Analyze {
        set_id: String,
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    BuildStatus {
        set_id: String,
    },
    CancelBuild {
        set_id: String,
    },
}

#[derive(Args, Debug)]
struct CreditsCommand {
    #[command(subcommand)]
    command: CreditsSubcommand,
}

#[derive(Subcommand, Debug)]
enum CreditsSubcommand {
    Balance,
    Transactions {
        #[arg(long, default_value_t = client::state::credits::DEFAULT_TRANSACTIONS_LIMIT)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    Packages,
    Costs,
    Buy {
        package_id: String,
    },
    Check {
        action_type: String,
    },
}

#[derive(Args, Debug)]
struct FiltersCommand {
    #[command(subcommand)]
    command: FiltersSubcommand,
}

#[derive(Subcommand, Debug)]
enum FiltersSubcommand {
    List {
        #[arg(long, conflicts_with = "user", default_value_t = false)]
        system: bool,
        #[arg(long, default_value_t = false)]
        user: bool,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        criteria: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
    },
    Delete {
        filter_id: String,
    },
}

/// Prints toasts to stderr so stdout stays clean for `--json`.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, event: UiEvent) {
        match event {
            UiEvent::Toast(toast) => eprintln!("{}", render::toast(&toast)),
            UiEvent::Navigate(route) if route == LOGIN_ROUTE => {
                eprintln!("not signed in: run `chanlens login --init-data <telegram init data>`");
            }
            UiEvent::Navigate(route) => tracing::debug!(%route, "navigation requested"),
        }
    }
}

struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T) -> String) -> Result<(), CliError> {
        if self.json {
            return print_json(&serde_json::to_value(value)?);
        }
        println!("{}", human(value));
        Ok(())
    }

    fn ack(&self, message: &str) -> Result<(), CliError> {
        if self.json {
            return print_json(&json!({ "success": true, "message": message }));
        }
        println!("{message}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(cli.api_url, cli.token_file)?;
    let dash = Dashboard::connect(&config, Arc::new(StderrNotifier))?;
    let out = Output { json: cli.json };

    match cli.command {
        Command::Login { init_data } => {
            ensure(dash.auth.login_with_webapp(&init_data).await, "sign-in")?;
            let user = dash.auth.state().user;
            out.emit(&user, |u| {
                u.as_ref()
                    .map_or_else(|| "signed in".to_owned(), |u| format!("signed in as {}", u.display_name()))
            })
        }
        Command::Logout => {
            dash.auth.logout();
            out.ack("signed out")
        }
        Command::WhoamiCan { permission } => {
            let granted = dash.auth.check_permission(&permission).await;
            out.emit(&json!({ "permission": permission, "granted": granted }), |_| {
                if granted { "yes".to_owned() } else { "no".to_owned() }
            })?;
            if granted { Ok(()) } else { Err(CliError::Denied(permission)) }
        }
        Command::Tasks(tasks) => run_tasks(&dash, &out, tasks).await,
        Command::Analyse(args) => run_analyse(&dash, &out, args).await,
        Command::Sets(sets) => run_sets(&dash, &out, sets).await,
        Command::Credits(credits) => run_credits(&dash, &out, credits).await,
        Command::Filters(filters) => run_filters(&dash, &out, filters).await,
    }
}

/// Environment config with CLI overrides. Without an explicit token file the
/// token persists under `$HOME/.config/chanlens/`.
fn build_config(api_url: Option<String>, token_file: Option<PathBuf>) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = api_url {
        config.api_url = api_url.trim_end_matches('/').to_owned();
    }
    config.token_file = token_file.or(config.token_file).or_else(default_token_file);
    Ok(config)
}

fn default_token_file() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(PathBuf::from(home).join(".config").join("chanlens").join("token.json"))
}

async fn run_tasks(dash: &Dashboard, out: &Output, tasks: TasksCommand) -> Result<(), CliError> {
    match tasks.command {
        TasksSubcommand::List { details: false } => {
            let list = found(dash.tasks.fetch_tasks(false).await, "loading tasks")?;
            out.emit(&list, |l| render::tasks(l))
        }
        TasksSubcommand::List { details: true } => {
            let detailed: Vec<AnalysisTask> = dash
                .tasks
                .fetch_all_with_details(false)
                .await
                .into_iter()
                .filter_map(|(_, task)| task)
                .collect();
            out.emit(&detailed, |d| d.iter().map(render::task_detail).collect::<Vec<_>>().join("\n\n"))
        }
        TasksSubcommand::Show { task_id } => {
            let task = found(dash.tasks.fetch_task_details(&task_id, false).await, "loading task")?;
            out.emit(&task, render::task_detail)
        }
        TasksSubcommand::Watch { task_id, interval_secs, max_polls } => {
            let interval = Duration::from_secs(interval_secs.max(1));
            let task = found(dash.tasks.poll_task(&task_id, interval, max_polls.max(1)).await, "polling task")?;
            out.emit(&task, render::task_detail)?;
            if task.status.is_terminal() { Ok(()) } else { Err(CliError::Unfinished(task_id)) }
        }
    }
}

async fn run_analyse(dash: &Dashboard, out: &Output, args: AnalyseArgs) -> Result<(), CliError> {
    let request = AnalysisRequest {
        channels: normalize_channels(&args.channels),
        filter_ids: args.filters,
        options: AnalysisOptions {
            max_posts: args.max_posts,
            detailed: args.detailed,
            include_examples: args.include_examples,
            processing_mode: args.mode,
        },
    };
    let started = found(dash.analysis.start_analysis(&request).await, "starting analysis")?;
    out.emit(&started, render::started)
}

async fn run_sets(dash: &Dashboard, out: &Output, sets: SetsCommand) -> Result<(), CliError> {
    let store = &dash.channel_sets;
    match sets.command {
        SetsSubcommand::List => {
            let list = found(store.fetch_sets(false).await, "loading channel sets")?;
            out.emit(&list, |l| render::sets(l))
        }
        SetsSubcommand::Show { set_id } => {
            let set = found(store.fetch_set(&set_id, false).await, "loading channel set")?;
            out.emit(&set, render::set_detail)
        }
        SetsSubcommand::Create { name, description, public } => {
            let draft = ChannelSetDraft { name: Some(name), description, is_public: Some(public) };
            let set = found(store.create_set(&draft).await, "creating channel set")?;
            out.emit(&set, render::set_detail)
        }
        SetsSubcommand::Update { set_id, name, description, public } => {
            let draft = ChannelSetDraft { name, description, is_public: public };
            let set = found(store.update_set(&set_id, &draft).await, "updating channel set")?;
            out.emit(&set, render::set_detail)
        }
        SetsSubcommand::Delete { set_id } => {
            ensure(store.delete_set(&set_id).await, "deleting channel set")?;
            out.ack(&format!("deleted channel set {set_id}"))
        }
        SetsSubcommand::Add { set_id, channels } => {
            // Load the set so known members and the channel cap are checked locally.
            store.fetch_set(&set_id, false).await;
            let set = found(store.add_channels(&set_id, &channels).await, "adding channels")?;
            out.emit(&set, render::set_detail)
        }
        SetsSubcommand::Remove { set_id, channel } => {
            ensure(store.remove_channel(&set_id, &channel).await, "removing channel")?;
            out.ack(&format!("removed {channel} from {set_id}"))
        }
        SetsSubcommand::Parsing { set_id } => {
            let status = found(store.parsing_status(&set_id).await, "loading parsing status")?;
            out.emit(&status, render::parsing)
        }
        SetsSubcommand::Analyze { set_id, filters } => {
            store.fetch_set(&set_id, false).await;
            let started = found(store.analyze_set(&set_id, &filters).await, "starting set analysis")?;
            out.emit(&started, render::started)
        }
        SetsSubcommand::BuildStatus { set_id } => {
            let status = found(store.build_status(&set_id).await, "loading build status")?;
            out.emit(&status, render::build)
        }
        SetsSubcommand::CancelBuild { set_id } => {
            ensure(store.cancel_build(&set_id).await, "cancelling build")?;
            out.ack(&format!("cancelled build for {set_id}"))
        }
    }
}

async fn run_credits(dash: &Dashboard, out: &Output, credits: CreditsCommand) -> Result<(), CliError> {
    let store = &dash.credits;
    match credits.command {
        CreditsSubcommand::Balance => {
            let balance = found(store.fetch_balance(false).await, "loading balance")?;
            out.emit(&balance, render::balance)
        }
        CreditsSubcommand::Transactions { limit, offset } => {
            let page = found(store.fetch_transactions(limit, offset, false).await, "loading transactions")?;
            out.emit(&page, render::transactions)
        }
        CreditsSubcommand::Packages => {
            let packages = found(store.fetch_packages(false).await, "loading packages")?;
            out.emit(&packages, |p| render::packages(p))
        }
        CreditsSubcommand::Costs => {
            let costs = found(store.fetch_costs(false).await, "loading action costs")?;
            out.emit(&costs, |c| render::costs(c))
        }
        CreditsSubcommand::Buy { package_id } => {
            store.fetch_balance(false).await;
            let response = found(store.purchase_package(&package_id).await, "purchase")?;
            out.emit(&response, |r| format!("new balance: {}", r.new_balance))
        }
        CreditsSubcommand::Check { action_type } => {
            let check = found(store.check_action(&action_type).await, "checking action")?;
            out.emit(&check, render::action_check)
        }
    }
}

async fn run_filters(dash: &Dashboard, out: &Output, filters: FiltersCommand) -> Result<(), CliError> {
    let store = &dash.filters;
    match filters.command {
        FiltersSubcommand::List { system, user } => {
            found(store.fetch_filters(false).await, "loading filters")?;
            let list = if system {
                store.system_filters()
            } else if user {
                store.user_filters()
            } else {
                store.filters()
            };
            out.emit(&list, |l| render::filters(l))
        }
        FiltersSubcommand::Create { name, criteria, category, description, threshold } => {
            let filter = NewFilter { name, criteria, description, category, threshold };
            let created = found(store.create_filter(&filter).await, "creating filter")?;
            out.emit(&created, |f| render::filters(std::slice::from_ref(f)))
        }
        FiltersSubcommand::Delete { filter_id } => {
            // Load the list so system filters are refused before the request.
            store.fetch_filters(false).await;
            ensure(store.delete_filter(&filter_id).await, "deleting filter")?;
            out.ack(&format!("deleted filter {filter_id}"))
        }
    }
}

fn found<T>(value: Option<T>, operation: &'static str) -> Result<T, CliError> {
    value.ok_or(CliError::Failed(operation))
}

fn ensure(ok: bool, operation: &'static str) -> Result<(), CliError> {
    if ok { Ok(()) } else { Err(CliError::Failed(operation)) }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
