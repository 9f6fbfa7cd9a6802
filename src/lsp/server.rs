use std::time::Duration;

use anyhow::Result;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};

use crate::config::{init_logging, Config};
use crate::lsp::backend::Backend;

/// Exits the process shortly after startup; used by the smoke test
const TEST_EXIT_ENV: &str = "XCONTROL_LS_TEST_EXIT";

/// Start the LSP server
pub async fn serve() -> Result<()> {
    let config = Config::from_args_and_env()?;
    init_logging(&config.log_level);

    let schema = config.load_schema()?;
    let file_settings = config.load_settings();
    log::info!(
        "Loaded schema {} (version {}) with {} instructions",
        schema.name,
        schema.version.as_deref().unwrap_or("unversioned"),
        schema.instructions().len()
    );

    if std::env::var(TEST_EXIT_ENV).as_deref() == Ok("1") {
        std::thread::spawn(|| {
            std::thread::sleep(Duration::from_secs(1));
            std::process::exit(0);
        });
    }

    let (service, socket) =
        LspService::build(move |client| Backend::new(client, schema, file_settings)).finish();

    Server::new(stdin(), stdout(), socket).serve(service).await;

    Ok(())
}
