use run_ledger::{
    config::{self, database},
    core::{LedgerSession, report},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env and settings
    let settings = config::load_app_configuration()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!("Settings loaded.");

    // 3. Connect and make sure the storage table exists
    let db = database::create_connection(&settings.storage.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 4. Restore the ledger and show the selected run
    let session = LedgerSession::open(db, settings).await?;
    match session.store().selected_run() {
        Some(run) => {
            let defaults = session.defaults();
            println!("{}", report::render_summary(run, defaults));
            println!();
            println!("Calendar");
            println!("{}", report::render_calendar(run, defaults));
            println!();
            println!("Transactions");
            println!("{}", report::render_transactions(run));
        }
        None => println!(
            "No run selected ({} runs stored).",
            session.store().runs().len()
        ),
    }

    Ok(())
}
