use clap::{Parser, Subcommand};
use eazzpay_bridge::application::client::ApiClient;
use eazzpay_bridge::application::gateway::GatewayAdapter;
use eazzpay_bridge::config::GatewayConfig;
use eazzpay_bridge::domain::order::OrderId;
use eazzpay_bridge::domain::ports::OrderStore;
use eazzpay_bridge::infrastructure::in_memory::{InMemoryNotificationLedger, InMemoryOrderStore};
use eazzpay_bridge::interfaces::csv::notification_reader::NotificationReader;
use eazzpay_bridge::interfaces::csv::order_reader::OrderReader;
use eazzpay_bridge::interfaces::csv::order_writer::OrderWriter;
use eazzpay_bridge::interfaces::http;
use miette::{IntoDiagnostic, Result, miette};
use std::fs::File;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the checkout, return and IPN endpoints
    Serve {
        #[arg(long, env = "EAZZPAY_BIND", default_value = "0.0.0.0:8080")]
        bind: SocketAddr,

        /// Orders CSV used to seed the in-memory order store
        #[arg(long)]
        orders: Option<PathBuf>,
    },
    /// Request a hosted payment page for an order and print its URL
    Initiate {
        #[arg(long)]
        orders: PathBuf,

        order_id: String,
    },
    /// Print the processor's status for an invoice
    Verify { invoice_id: String },
    /// Replay recorded notifications against orders and print their final state
    Reconcile {
        #[arg(long)]
        orders: PathBuf,

        /// Notifications CSV (reference,status[,invoice_id])
        notifications: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Arc::new(GatewayConfig::from_env().into_diagnostic()?);

    match cli.command {
        Command::Serve { bind, orders } => {
            let store = load_orders(orders.as_deref())?;
            let adapter = build_adapter(config, store)?;
            if !adapter.is_valid_for_use() {
                tracing::warn!(
                    "EAZZPAY_SECRET_KEY or API URL missing, payment requests will be refused"
                );
            }

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .into_diagnostic()?;
            tracing::info!("Payment bridge listening on {}", bind);

            axum::serve(listener, http::router(Arc::new(adapter)))
                .await
                .into_diagnostic()?;
        }
        Command::Initiate { orders, order_id } => {
            let adapter = build_adapter(config, load_orders(Some(&orders))?)?;
            let redirect_url = adapter
                .initiate(&OrderId::new(order_id))
                .await
                .into_diagnostic()?;
            println!("{redirect_url}");
        }
        Command::Verify { invoice_id } => {
            let client = ApiClient::new(config).into_diagnostic()?;
            let response = client.verify_payment(&invoice_id).await;
            if !response.success {
                return Err(miette!(
                    "{}",
                    response.message.unwrap_or_else(|| "Verification failed".to_string())
                ));
            }
            println!("{}", response.field("status").unwrap_or("UNKNOWN"));
        }
        Command::Reconcile {
            orders,
            notifications,
        } => {
            let store = load_orders(Some(&orders))?;
            let adapter = build_adapter(config, store.clone())?;

            let file = File::open(notifications).into_diagnostic()?;
            for notification in NotificationReader::new(file).notifications() {
                match notification {
                    Ok(notification) => {
                        if let Err(e) = adapter.reconcile(&notification).await {
                            eprintln!("Error processing notification: {}", e);
                        }
                    }
                    Err(e) => {
                        eprintln!("Error reading notification: {}", e);
                    }
                }
            }

            let orders = store.all_orders().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = OrderWriter::new(stdout.lock());
            writer.write_orders(orders).into_diagnostic()?;
        }
    }

    Ok(())
}

fn load_orders(path: Option<&Path>) -> Result<InMemoryOrderStore> {
    let Some(path) = path else {
        return Ok(InMemoryOrderStore::new());
    };
    let file = File::open(path).into_diagnostic()?;
    let orders = OrderReader::new(file).orders().into_diagnostic()?;
    tracing::info!(count = orders.len(), "Loaded orders");
    Ok(InMemoryOrderStore::with_orders(orders))
}

fn build_adapter(config: Arc<GatewayConfig>, store: InMemoryOrderStore) -> Result<GatewayAdapter> {
    let client = ApiClient::new(config.clone()).into_diagnostic()?;
    Ok(GatewayAdapter::new(
        config,
        client,
        Arc::new(store),
        Arc::new(InMemoryNotificationLedger::new()),
    ))
}
