//! ids-core - JSON-lines front end for the decision engine
//!
//! Reads one flow record per line on stdin, prints one JSON result per line on
//! stdout, and appends decisions/alerts to the JSONL history.

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use ids_core::constants;
use ids_core::logic::history::{self, JsonlStore};
use ids_core::logic::ingest;
use ids_core::{
    DecisionEngine, DetectionError, EngineConfig, EventRef, FlowFeatureRecord, SharedSettings,
};

/// One input line: a flow record plus an optional caller-side event id
#[derive(Debug, Deserialize)]
struct FlowRequest {
    #[serde(default)]
    event_ref: Option<String>,
    #[serde(flatten)]
    record: FlowFeatureRecord,
}

struct App {
    engine: DecisionEngine,
    settings: SharedSettings,
    store: JsonlStore,
}

impl App {
    fn handle_line(&self, line: &str) -> serde_json::Value {
        let request: FlowRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                let err = DetectionError::InvalidInput(e.to_string());
                return json!({ "error": err.to_report() });
            }
        };

        // fresh snapshot per line
        let result = match self.engine.decide_with(&request.record, &self.settings) {
            Ok(r) => r,
            Err(e) => return json!({ "error": e.to_report() }),
        };

        let event_ref = request
            .event_ref
            .map(EventRef::from)
            .unwrap_or_else(|| result.event_ref());
        let alert = self.engine.maybe_alert(&result, &event_ref);

        history::persist(&self.store, &self.store, &result, alert.as_ref());

        json!({ "decision": result, "alert": alert })
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ids_core=info".into());

    let fmt_layer = if constants::is_json_logging() {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting {} v{}...", constants::APP_NAME, constants::APP_VERSION);

    let config = EngineConfig::from_env().context("invalid engine configuration")?;
    let engine = DecisionEngine::from_config(&config).context("failed to build decision engine")?;

    let store = JsonlStore::new(&config.history_dir);
    tracing::info!(dir = %config.history_dir.display(), "Decision history enabled");

    let app = Arc::new(App {
        engine,
        settings: SharedSettings::new(config.initial_settings),
        store,
    });

    let max_in_flight = constants::get_max_in_flight();
    let handler = {
        let app = app.clone();
        Arc::new(move |line: String| {
            let output = app.handle_line(&line);
            println!("{}", output);
        })
    };

    let stats = ingest::run_lines(BufReader::new(tokio::io::stdin()), max_in_flight, handler)
        .await
        .context("failed to read stdin")?;

    let status = app.store.status();
    tracing::info!(
        lines = stats.lines,
        failed_tasks = stats.failed_tasks,
        decisions = status.decisions_written,
        alerts = status.alerts_written,
        "Input closed, shutting down"
    );

    Ok(())
}
