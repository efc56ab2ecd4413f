//! webex-probe - exercise the Webex connector against a live tenant
//!
//! Reads its configuration from the environment (`WEBEX_ACCESS_TOKEN`,
//! `WEBEX_BASE_URL`, ...), loading `.env` when present, and prints every
//! result as pretty JSON on stdout.

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::operation::{DeleteParams, ReadParams, WriteParams};
use xavyo_connector::traits::{
    Connector, DeleteConnector, MetadataConnector, ReadConnector, WriteConnector,
};
use xavyo_connector_webex::{WebexConfig, WebexConnector, OBJECT_NAME_PEOPLE};

/// Probe the Webex people API through the connector
#[derive(Parser)]
#[command(name = "webex-probe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Object to operate on
    #[arg(long, global = true, default_value = OBJECT_NAME_PEOPLE)]
    object: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a page of records (or every page with --all)
    Read(ReadArgs),

    /// Create a record, or update it when --id is given
    Write(WriteArgs),

    /// Delete a record
    Delete(DeleteArgs),

    /// Describe objects from a sample page
    Metadata(MetadataArgs),

    /// Create, update, verify and delete a throwaway person
    Lifecycle(LifecycleArgs),
}

#[derive(Args)]
struct ReadArgs {
    /// Fields to return, comma separated
    #[arg(long, value_delimiter = ',', default_value = "id")]
    fields: Vec<String>,

    /// Next page URL from a previous read
    #[arg(long)]
    next_page: Option<String>,

    /// Page size
    #[arg(long)]
    max: Option<u32>,

    /// Follow next-page links until the last page
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct WriteArgs {
    /// Record payload as a JSON object
    #[arg(long)]
    data: String,

    /// Record to update
    #[arg(long)]
    id: Option<String>,
}

#[derive(Args)]
struct DeleteArgs {
    /// Record to delete
    #[arg(long)]
    id: String,
}

#[derive(Args)]
struct MetadataArgs {
    /// Objects to describe, comma separated
    #[arg(long, value_delimiter = ',', default_value = OBJECT_NAME_PEOPLE)]
    objects: Vec<String>,
}

#[derive(Args)]
struct LifecycleArgs {
    /// Email for the throwaway person (generated when omitted)
    #[arg(long)]
    email: Option<String>,
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,xavyo_connector_webex=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = WebexConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    if let Err(e) = run(cli, config).await {
        error!(code = e.error_code(), error = %e, "webex-probe failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: WebexConfig) -> ConnectorResult<()> {
    let connector = WebexConnector::new(config)?;
    info!(connector = %connector.display_name(), "Connector ready");

    match cli.command {
        Commands::Read(args) => read(&connector, cli.object, args).await,
        Commands::Write(args) => write(&connector, cli.object, args).await,
        Commands::Delete(args) => {
            let res = connector.delete(DeleteParams::new(cli.object, args.id)).await?;
            dump(&res)
        }
        Commands::Metadata(args) => {
            let res = connector.list_object_metadata(&args.objects).await?;
            dump(&res)
        }
        Commands::Lifecycle(args) => lifecycle(&connector, cli.object, args).await,
    }
}

async fn read(connector: &WebexConnector, object: String, args: ReadArgs) -> ConnectorResult<()> {
    let mut params = ReadParams::new(object).with_fields(args.fields);
    params.next_page = args.next_page;
    params.page_size = args.max;

    let res = if args.all {
        connector.read_all(params).await?
    } else {
        connector.read(params).await?
    };

    dump(&res)
}

async fn write(connector: &WebexConnector, object: String, args: WriteArgs) -> ConnectorResult<()> {
    let data: Value = serde_json::from_str(&args.data).map_err(|e| ConnectorError::InvalidData {
        message: format!("--data is not valid JSON: {e}"),
    })?;

    let mut params = WriteParams::new(object).with_record_data(data);
    params.record_id = args.id;

    let res = connector.write(params).await?;
    dump(&res)
}

async fn lifecycle(
    connector: &WebexConnector,
    object: String,
    args: LifecycleArgs,
) -> ConnectorResult<()> {
    let email = args.email.unwrap_or_else(generated_email);

    let created = connector
        .write(WriteParams::new(&object).with_record_data(json!({
            "emails": [email],
            "displayName": "Example Person",
            "firstName": "Example",
            "lastName": "Person",
        })))
        .await?;
    dump(&created)?;

    if created.record_id.is_empty() {
        return Err(ConnectorError::InvalidData {
            message: "create returned no record id".to_string(),
        });
    }
    let id = created.record_id.clone();
    info!(id = %id, "Created person");

    if let Err(e) = update_and_verify(connector, &object, &id, &email).await {
        warn!(id = %id, error = %e, "Lifecycle failed, removing created person");
        if let Err(cleanup) = connector.delete(DeleteParams::new(&object, &id)).await {
            warn!(id = %id, error = %cleanup, "Cleanup delete failed");
        }
        return Err(e);
    }

    let deleted = connector.delete(DeleteParams::new(&object, &id)).await?;
    dump(&deleted)?;
    info!(id = %id, "Deleted person");

    match connector.delete(DeleteParams::new(&object, &id)).await {
        Err(e) if matches!(e.root(), ConnectorError::ObjectNotFound { .. }) => {
            info!(error = %e, "Second delete failed as expected");
            Ok(())
        }
        Err(e) => Err(e),
        Ok(_) => Err(ConnectorError::operation_failed(
            "deleting an already deleted person succeeded",
        )),
    }
}

async fn update_and_verify(
    connector: &WebexConnector,
    object: &str,
    id: &str,
    email: &str,
) -> ConnectorResult<()> {
    let updated = connector
        .write(
            WriteParams::new(object)
                .with_record_id(id)
                .with_record_data(json!({
                    "emails": [email],
                    "displayName": "Example Person Updated",
                    "firstName": "Example",
                    "lastName": "Person",
                })),
        )
        .await?;
    dump(&updated)?;

    let page = connector
        .read_all(ReadParams::new(object).with_fields([
            "id",
            "emails",
            "displayName",
            "firstName",
            "lastName",
        ]))
        .await?;
    let row = page
        .data
        .iter()
        .find(|row| row.id.as_deref() == Some(id))
        .ok_or_else(|| ConnectorError::ObjectNotFound {
            identifier: id.to_string(),
        })?;

    let shown = row.fields.get("displayname").and_then(Value::as_str);
    if shown != Some("Example Person Updated") {
        warn!(id = %id, got = ?shown, "displayName mismatch after update");
    }
    info!(id = %id, "Verified person with read");

    Ok(())
}

fn generated_email() -> String {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("webex-probe-{stamp}@example.com")
}

fn dump<T: Serialize>(value: &T) -> ConnectorResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
