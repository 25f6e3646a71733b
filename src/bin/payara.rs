use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prometheus::Registry;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use payara_client::callback::server;
use payara_client::config::loader::{read_config, validate_callback, validate_client};
use payara_client::config::{CallbackServerConfig, ServiceConfig};
use payara_client::sandbox;
use payara_client::transport::{HttpMetrics, MetricsMiddleware};
use payara_client::utils::channel;
use payara_client::utils::logging::{self, LogLevel};
use payara_client::{
    BalanceApi, CallContext, ClientBuilder, ClientConfig, CreateDisbursementRequest, Environment,
    ListFilter, PayaraClient, TransferApi,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PAYARA_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long, env = "PAYARA_APP_ID")]
    app_id: Option<String>,
    #[arg(long, env = "PAYARA_APP_SECRET", hide_env_values = true)]
    app_secret: Option<String>,
    /// sandbox | production
    #[arg(long, env = "PAYARA_ENV")]
    environment: Option<String>,
    #[arg(long, env = "PAYARA_BASE_URL")]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the merchant balance
    Balance,
    /// Create a disbursement
    Disburse {
        #[arg(long)]
        reference_id: String,
        #[arg(long)]
        amount: i64,
        #[arg(long, required_unless_present = "sandbox_account")]
        bank_code: Option<String>,
        #[arg(long)]
        account_number: Option<String>,
        #[arg(long)]
        account_name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Fill the beneficiary from the sandbox account with this bank code ("default" for BCA)
        #[arg(long)]
        sandbox_account: Option<String>,
    },
    /// Look up a disbursement by transaction id
    Status { transaction_id: String },
    /// List disbursements (not offered by the upstream)
    List {
        #[arg(long)]
        reference_id: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Print the documented sandbox test accounts
    SandboxAccounts,
    /// Serve the callback receiver and /metrics
    Callback,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Read args and config
    // -------------------------------

    let args = Args::parse();
    let mut service_config = match &args.config {
        Some(path) => read_config(path).await?,
        None => ServiceConfig {
            client: ClientConfig::default(),
            logging: None,
            callback: None,
        },
    };
    logging::run(service_config.logging.as_ref(), args.log_level);
    apply_overrides(&mut service_config.client, &args);

    // -------------------------------
    // 2. Commands without a client
    // -------------------------------

    match &args.command {
        Command::SandboxAccounts => return print_json(&sandbox::SANDBOX_ACCOUNTS),
        Command::Callback => {
            validate_callback(service_config.callback.as_ref())?;
            let callback_config = service_config.callback.clone().unwrap_or_default();
            return run_callback(&callback_config).await;
        }
        _ => validate_client(&service_config.client)?,
    }

    // -------------------------------
    // 3. Build the client and run the call
    // -------------------------------

    let registry = Registry::new();
    let metrics = HttpMetrics::register(&registry)?;
    let client: PayaraClient = ClientBuilder::from_config(service_config.client.clone())
        .middleware(MetricsMiddleware::new(metrics))
        .build()?;
    info!("using {}", client.base_url());

    let ctx = CallContext::background();
    let ctrl_c = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling in-flight request");
            ctrl_c.cancel();
        }
    });

    match args.command {
        Command::Balance => print_json(&client.balance().get_balance(&ctx).await?),
        Command::Disburse {
            reference_id,
            amount,
            bank_code,
            account_number,
            account_name,
            description,
            sandbox_account,
        } => {
            let mut request = CreateDisbursementRequest {
                reference_id,
                amount,
                bank_code: bank_code.unwrap_or_default(),
                account_number: account_number.unwrap_or_default(),
                account_name: account_name.unwrap_or_default(),
                description,
            };
            if let Some(code) = sandbox_account {
                let account = match code.as_str() {
                    "default" => sandbox::default_account(),
                    code => *sandbox::by_bank_code(code)
                        .with_context(|| format!("no sandbox account with bank code '{}'", code))?,
                };
                request.bank_code = account.bank_code.to_owned();
                request.account_number = account.account_number.to_owned();
                request.account_name = account.account_name.to_owned();
            }
            print_json(&client.transfer().create_disbursement(&ctx, &request).await?)
        }
        Command::Status { transaction_id } => {
            print_json(&client.transfer().get_disbursement_status(&ctx, &transaction_id).await?)
        }
        Command::List { reference_id, limit } => {
            let filter = ListFilter { reference_id, limit, ..ListFilter::default() };
            print_json(&client.transfer().list_disbursements(&ctx, &filter).await?)
        }
        Command::SandboxAccounts | Command::Callback => Ok(()),
    }
}

fn apply_overrides(client: &mut ClientConfig, args: &Args) {
    if let Some(app_id) = &args.app_id {
        client.app_id = app_id.clone();
    }
    if let Some(app_secret) = &args.app_secret {
        client.app_secret = app_secret.clone();
    }
    if let Some(environment) = &args.environment {
        client.environment = environment.parse().unwrap_or(Environment::Production);
    }
    if let Some(base_url) = &args.base_url {
        client.base_url = Some(base_url.clone());
    }
}

async fn run_callback(config: &CallbackServerConfig) -> Result<()> {
    let sender = channel::run();
    let mut receiver = sender.subscribe();
    let registry = Registry::new();

    let consumer = async move {
        loop {
            match receiver.recv().await {
                Ok(payload) => println!("{}", serde_json::to_string(&payload)?),
                Err(RecvError::Lagged(skipped)) => warn!("callback consumer lagged, {} payloads dropped", skipped),
                Err(RecvError::Closed) => return Ok::<(), anyhow::Error>(()),
            }
        }
    };
    let server = server::start(config, sender, registry);
    tokio::try_join!(server, consumer)?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
