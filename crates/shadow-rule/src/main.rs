//! Shadow rule admin: serves the shadow rule of one logical database and
//! applies DROP SHADOW RULE requests to it.

use std::sync::Arc;

use shadow_rule::config::AdminConfig;
use shadow_rule::migration::SqliteIntrospector;
use shadow_rule::server::{self, AppState};
use shadow_rule::store::RuleStore;

fn main() -> anyhow::Result<()> {
    // Determine config path
    let config_path = {
        let args: Vec<String> = std::env::args().collect();
        // Check for --config flag first
        args.iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1).cloned())
            // Fall back to positional arg
            .or_else(|| args.get(1).filter(|a| !a.starts_with('-')).cloned())
            .or_else(|| std::env::var("SHADOW_RULE_CONFIG").ok())
            .unwrap_or_else(|| "shadow-rule.toml".to_string())
    };

    let config = AdminConfig::load(&config_path)?;

    // The tonic OTLP exporter needs a reactor context, so build the runtime first
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let tracing_guard = shadow_tracing::init_tracing(&config.tracing);

        tracing::info!(
            config_path = %config_path,
            listen_address = %config.server.listen_address,
            database = %config.database.name,
            rule_configured = config.rule.is_some(),
            otlp_export = tracing_guard.exporting(),
            "Starting shadow-rule admin"
        );

        run(config).await
    })
}

async fn run(config: AdminConfig) -> anyhow::Result<()> {
    let store = RuleStore::new(config.database.name.clone(), config.rule.clone());

    // Log every applied change; persistence and broadcast hook in here
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let current = changes.borrow_and_update().clone();
            match current {
                Some(rule) => tracing::info!(
                    data_sources = rule.data_sources().len(),
                    tables = rule.tables().len(),
                    shadow_algorithms = rule.shadow_algorithms().len(),
                    "Shadow rule changed"
                ),
                None => tracing::info!("Shadow rule removed"),
            }
        }
    });

    let state = AppState {
        config,
        store,
        introspector: Arc::new(SqliteIntrospector::new()),
    };

    server::run(state).await
}
