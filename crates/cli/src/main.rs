use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use lib::api::{parse_pair, ApiClient, FormFields, ResultFormat, TaskResult};
use lib::router::RouteTable;

#[derive(Parser)]
#[command(name = "pvscope")]
#[command(about = "pvscope CLI", long_about = None)]
struct Cli {
    /// Config file path (default: PVSCOPE_CONFIG_PATH or ~/.pvscope/config.json)
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Inspection service base URL (overrides config and PVSCOPE_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config.json.
    Init,

    /// Print the view route table, or resolve PATH to the view it displays.
    Routes { path: Option<String> },

    /// Fault detection tasks.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// UAV route planning.
    Route {
        #[command(subcommand)]
        command: RouteCommand,
    },

    /// Fetch all waypoints for the given form fields.
    Waypoints {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Calculate the best cleaning strategy from a JSON document.
    Clean {
        /// Inline JSON body, e.g. '{"area": 10}'
        #[arg(conflicts_with = "input")]
        json: Option<String>,

        /// Read the JSON body from a file
        #[arg(long, short, value_name = "PATH")]
        input: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    /// Create a detection task.
    Add {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Show a task's status.
    Status { task_id: String },

    /// List all tasks.
    List,

    /// Fetch a task's result: JSON links with --url, otherwise the result file.
    Result {
        task_id: String,

        /// Ask for URLs (JSON) instead of the file itself
        #[arg(long)]
        url: bool,

        /// Write the result file here instead of stdout
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Delete a task.
    Delete { task_id: String },
}

#[derive(Subcommand)]
enum RouteCommand {
    /// Submit a new route plan; the service answers with a route file.
    Submit {
        #[command(flatten)]
        form: FormArgs,

        /// Where to write the returned route file
        #[arg(long, short, value_name = "PATH")]
        output: PathBuf,
    },
}

/// Multipart form fields shared by the form-based commands.
#[derive(Args)]
struct FormArgs {
    /// Text field (repeatable)
    #[arg(long = "field", short = 'f', value_name = "KEY=VALUE", value_parser = parse_pair)]
    fields: Vec<(String, String)>,

    /// File field (repeatable)
    #[arg(long = "file", value_name = "KEY=PATH", value_parser = parse_pair)]
    files: Vec<(String, String)>,
}

impl FormArgs {
    fn into_fields(self) -> FormFields {
        let mut fields = FormFields::new();
        for (k, v) in self.fields {
            fields = fields.text(k, v);
        }
        for (k, path) in self.files {
            fields = fields.file(k, path);
        }
        fields
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config_path = cli.config;
    let base_url = cli.base_url;

    let (name, result) = match cli.command {
        Some(Commands::Version) => {
            println!("pvscope {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        Some(Commands::Init) => ("init", run_init(config_path)),
        Some(Commands::Routes { path }) => ("routes", run_routes(config_path, path)),
        Some(Commands::Task { command }) => ("task", run_task(config_path, base_url, command).await),
        Some(Commands::Route { command }) => {
            ("route", run_route(config_path, base_url, command).await)
        }
        Some(Commands::Waypoints { form }) => {
            ("waypoints", run_waypoints(config_path, base_url, form).await)
        }
        Some(Commands::Clean { json, input }) => {
            ("clean", run_clean(config_path, base_url, json, input).await)
        }
        None => {
            println!("Run with --help for usage");
            return;
        }
    };
    if let Err(e) = result {
        log::error!("{} failed: {:#}", name, e);
        std::process::exit(1);
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

fn run_routes(config_path: Option<PathBuf>, path: Option<String>) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let table = RouteTable::new(config.router.unmatched);
    match path {
        Some(p) => {
            let resolved = table.resolve(&p)?;
            match resolved.view() {
                Some(view) => println!("{} -> {}", resolved.location, view.name()),
                None => println!("{} -> not found", resolved.location),
            }
        }
        None => {
            for r in table.redirects() {
                println!("{:<20} redirect -> {}", r.from, r.to);
            }
            for r in table.routes() {
                println!("{:<20} {}", r.path, r.name);
            }
        }
    }
    Ok(())
}

fn api_client(config_path: Option<PathBuf>, base_url: Option<String>) -> anyhow::Result<ApiClient> {
    let (config, _) = lib::config::load_config(config_path)?;
    let base_url = lib::config::resolve_api_base_url(&config, base_url.as_deref());
    log::info!("using inspection service at {}", base_url);
    Ok(ApiClient::new(base_url))
}

async fn run_task(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    command: TaskCommand,
) -> anyhow::Result<()> {
    let api = api_client(config_path, base_url)?;
    match command {
        TaskCommand::Add { form } => {
            let form = form.into_fields().into_form().await?;
            print_json(&api.add_task(form).await?)
        }
        TaskCommand::Status { task_id } => print_json(&api.task_status(&task_id).await?),
        TaskCommand::List => print_json(&api.task_list().await?),
        TaskCommand::Result {
            task_id,
            url,
            output,
        } => {
            let format = if url {
                ResultFormat::Url
            } else {
                ResultFormat::File
            };
            match api.task_result(&task_id, format).await? {
                TaskResult::Json(v) => print_json(&v),
                TaskResult::Binary(bytes) => write_bytes(output.as_deref(), &bytes),
            }
        }
        TaskCommand::Delete { task_id } => print_json(&api.delete_task(&task_id).await?),
    }
}

async fn run_route(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    command: RouteCommand,
) -> anyhow::Result<()> {
    let api = api_client(config_path, base_url)?;
    match command {
        RouteCommand::Submit { form, output } => {
            let form = form.into_fields().into_form().await?;
            let bytes = api.submit_route(form).await?;
            write_bytes(Some(&output), &bytes)
        }
    }
}

async fn run_waypoints(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    form: FormArgs,
) -> anyhow::Result<()> {
    let api = api_client(config_path, base_url)?;
    let form = form.into_fields().into_form().await?;
    print_json(&api.get_all_waypoints(form).await?)
}

async fn run_clean(
    config_path: Option<PathBuf>,
    base_url: Option<String>,
    json: Option<String>,
    input: Option<PathBuf>,
) -> anyhow::Result<()> {
    use anyhow::Context;

    let raw = match (json, input) {
        (Some(s), _) => s,
        (None, Some(path)) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => anyhow::bail!("pass the JSON body inline or with --input"),
    };
    let body: serde_json::Value = serde_json::from_str(&raw).context("parsing JSON body")?;
    let api = api_client(config_path, base_url)?;
    print_json(&api.calculate_best_cleaning(&body).await?)
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_bytes(output: Option<&Path>, bytes: &[u8]) -> anyhow::Result<()> {
    use anyhow::Context;

    match output {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
