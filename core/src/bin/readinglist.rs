use std::process::ExitCode;

use clap::{Parser, Subcommand};
use readinglist_core::config::DEFAULT_SERVER;
use readinglist_core::format::{canonicalize, pretty_print_colored};
use readinglist_core::{Auth, Call, ClientConfig, Query, ReadingListClient, ResponseBehavior};
use serde_json::{Map, Value};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "readinglist", about = "Command-line client for the reading-list service", version)]
struct Cli {
    /// Base URL of the reading-list server.
    #[arg(long, env = "READINGLIST_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Basic-auth user name.
    #[arg(long, env = "USER")]
    user: Option<String>,

    /// Basic-auth password.
    #[arg(long, env = "PASS", hide_env_values = true)]
    password: Option<String>,

    /// Bearer token; takes precedence over user/password.
    #[arg(long, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Log request options and response headers.
    #[arg(short, long, env = "VERBOSE")]
    verbose: bool,

    /// Print canonical JSON instead of the tree view.
    #[arg(long)]
    canonical: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List articles.
    List {
        #[arg(long)]
        limit: Option<u32>,
        /// Extra query parameter, `key=value`.
        #[arg(long = "filter", value_parser = parse_pair)]
        filters: Vec<(String, String)>,
    },
    /// Fetch one article.
    Get { id: String },
    /// Create an article.
    Create {
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: String,
        #[arg(long, env = "USER")]
        added_by: String,
        /// Mark the article as already read.
        #[arg(long)]
        read: bool,
    },
    /// Update fields of an article.
    Update {
        id: String,
        /// Field to set, `key=<json>`; bare words are sent as strings.
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, Value)>,
        /// How much of the record the server echoes back.
        #[arg(long)]
        behavior: Option<ResponseBehavior>,
    },
    /// Delete one article.
    Delete { id: String },
    /// Delete every article.
    DeleteAll,
    /// Health of the server's dependencies.
    Heartbeat,
    /// Service description.
    Home,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.server).verbose(self.verbose);
        match (&self.token, &self.user) {
            (Some(token), _) if !token.is_empty() => config.auth(Auth::bearer(token)),
            (_, Some(user)) if !user.is_empty() => config.auth(Auth::basic(
                user,
                self.password.clone().unwrap_or_default(),
            )),
            _ => config,
        }
    }
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = parse_pair(raw)?;
    let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
    Ok((key, value))
}

fn dispatch(client: &ReadingListClient, command: Command) -> Call {
    match command {
        Command::List { limit, filters } => {
            let mut query: Query = filters.into_iter().collect();
            if let Some(limit) = limit {
                query.insert("_limit".to_string(), limit.to_string());
            }
            client.list_articles((!query.is_empty()).then_some(query))
        }
        Command::Get { id } => client.get_article(&id),
        Command::Create {
            url,
            title,
            added_by,
            read,
        } => {
            let mut data = Map::new();
            data.insert("url".to_string(), Value::String(url));
            data.insert("title".to_string(), Value::String(title));
            data.insert("added_by".to_string(), Value::String(added_by));
            if read {
                data.insert("unread".to_string(), Value::Bool(false));
            }
            client.create_article(&data)
        }
        Command::Update {
            id,
            fields,
            behavior,
        } => {
            let data: Map<String, Value> = fields.into_iter().collect();
            client.update_article(&id, &data, behavior.map(|b| b.headers()))
        }
        Command::Delete { id } => client.delete_article(&id),
        Command::DeleteAll => client.delete_all_articles(),
        Command::Heartbeat => client.heartbeat(),
        Command::Home => client.describe_service(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ReadingListClient::new(cli.config());
    let canonical = cli.canonical;

    match dispatch(&client, cli.command).await {
        Ok(body) => {
            if canonical {
                println!("{}", canonicalize(&body));
            } else {
                println!("{}", pretty_print_colored(&body));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "request failed");
            ExitCode::FAILURE
        }
    }
}
