//! Dashboard query surface.
//!
//! Serves the latest record, the history snapshot, and on-demand analysis
//! over the shared history. Stale upstream data shows the last-known
//! values; before any data arrives the current-reading endpoint serves a
//! waiting placeholder instead of an error.

use crate::counters::SharedCounters;
use crate::ingest::record::ProcessedRecord;
use crate::monitor::analysis::AnalysisClient;
use crate::monitor::history::SharedHistory;
use crate::monitor::stats;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Dashboard server configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
}

/// Shared dashboard state.
pub struct DashboardState {
    history: SharedHistory,
    analysis: Option<AnalysisClient>,
    counters: SharedCounters,
    instance_id: String,
}

impl DashboardState {
    /// Create new dashboard state.
    pub fn new(
        history: SharedHistory,
        analysis: Option<AnalysisClient>,
        counters: SharedCounters,
    ) -> Self {
        let host = hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        let instance_id = format!("fog-{}-{}", host, &uuid::Uuid::new_v4().to_string()[..8]);

        Self {
            history,
            analysis,
            counters,
            instance_id,
        }
    }
}

/// GET /health
async fn health(State(state): State<Arc<DashboardState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "counters": state.counters.stats(),
    }))
}

/// GET /api/current - latest record, or the waiting placeholder before
/// any data arrives.
async fn current(State(state): State<Arc<DashboardState>>) -> Json<Value> {
    match state.history.latest() {
        Some(record) => Json(serde_json::to_value(&record).unwrap_or_else(|_| json!({}))),
        None => Json(waiting_placeholder()),
    }
}

fn waiting_placeholder() -> Value {
    json!({
        "temp_filtered": 0,
        "light": 0,
        "door": 0,
        "risk": "N/A",
        "timestamp": "waiting...",
    })
}

/// GET /api/history - full snapshot, oldest first. Callers typically show
/// only the last 10 entries.
async fn history(State(state): State<Arc<DashboardState>>) -> Json<Vec<ProcessedRecord>> {
    Json(state.history.snapshot())
}

/// GET /api/analysis - summarize the snapshot and hand the report to the
/// analysis service. Failures come back as text in the payload, never as
/// an error status.
async fn analysis(State(state): State<Arc<DashboardState>>) -> Json<Value> {
    let snapshot = state.history.snapshot();
    let report = match stats::summarize(&snapshot) {
        Ok(report) => report,
        Err(empty) => return Json(json!({ "analysis": empty.to_string() })),
    };

    let text = match &state.analysis {
        Some(client) => client.analyze(&report.to_string()).await,
        None => "Analysis service not configured.".to_string(),
    };

    Json(json!({ "analysis": text }))
}

/// GET / - minimal page over the JSON endpoints.
async fn index() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Cold-Chain Monitor</title>
    <meta charset="utf-8">
    <style>
        body { font-family: 'Segoe UI', Arial, sans-serif; background: #1a1a2e; color: #eee; margin: 0; }
        .header { background: #16213e; padding: 20px; text-align: center; }
        .header h1 { margin: 0; color: #e94560; }
        .container { max-width: 900px; margin: 20px auto; padding: 0 20px; }
        .cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 15px; margin-bottom: 20px; }
        .card { background: #16213e; border-radius: 12px; padding: 20px; text-align: center; }
        .card .label { color: #999; font-size: 14px; }
        .card .value { font-size: 32px; font-weight: bold; }
        .risk-LOW { color: #00ff88; }
        .risk-MEDIUM { color: #ffaa00; }
        .risk-HIGH { color: #ff4444; }
        .panel { background: #16213e; border-radius: 12px; padding: 20px; margin-bottom: 20px; }
        table { width: 100%; border-collapse: collapse; }
        th, td { padding: 8px 12px; text-align: left; border-bottom: 1px solid #333; }
        th { color: #999; }
        button { background: #4fc3f7; color: #1a1a2e; border: none; padding: 10px 20px; border-radius: 8px; font-weight: bold; cursor: pointer; }
        #analysis { margin-top: 15px; white-space: pre-wrap; line-height: 1.5; }
    </style>
</head>
<body>
    <div class="header"><h1>Cold-Chain Monitor</h1></div>
    <div class="container">
        <div class="cards">
            <div class="card"><div class="label">Temperature</div><div class="value" id="temp">--</div></div>
            <div class="card"><div class="label">Light</div><div class="value" id="light">--</div></div>
            <div class="card"><div class="label">Door</div><div class="value" id="door">--</div></div>
            <div class="card"><div class="label">Risk</div><div class="value" id="risk">--</div></div>
        </div>
        <div class="panel">
            <button onclick="runAnalysis()">Analyze Current Data</button>
            <div id="analysis"></div>
        </div>
        <div class="panel">
            <h3>Recent Readings</h3>
            <table>
                <thead><tr><th>Time</th><th>Temp (C)</th><th>Light</th><th>Door</th><th>Risk</th></tr></thead>
                <tbody id="history"></tbody>
            </table>
        </div>
    </div>
    <script>
        function update() {
            fetch('/api/current').then(r => r.json()).then(d => {
                document.getElementById('temp').textContent = d.temp_filtered;
                document.getElementById('light').textContent = d.light;
                document.getElementById('door').textContent = d.door ? 'OPEN' : 'CLOSED';
                let risk = document.getElementById('risk');
                risk.textContent = d.risk;
                risk.className = 'value risk-' + d.risk;
            });
            fetch('/api/history').then(r => r.json()).then(rows => {
                let html = '';
                rows.slice(-10).reverse().forEach(r => {
                    html += '<tr><td>' + r.timestamp + '</td><td>' + r.temp_filtered + '</td><td>'
                        + r.light + '</td><td>' + (r.door ? 'OPEN' : 'CLOSED')
                        + '</td><td class="risk-' + r.risk + '">' + r.risk + '</td></tr>';
                });
                document.getElementById('history').innerHTML = html;
            });
        }
        function runAnalysis() {
            document.getElementById('analysis').textContent = 'Analyzing...';
            fetch('/api/analysis').then(r => r.json()).then(d => {
                document.getElementById('analysis').textContent = d.analysis;
            });
        }
        update();
        setInterval(update, 2000);
    </script>
</body>
</html>
"#;

/// Run the dashboard server.
///
/// Returns the bound address and a sender that triggers graceful
/// shutdown.
pub async fn run(
    config: DashboardConfig,
    state: DashboardState,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let state = Arc::new(state);

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/current", get(current))
        .route("/api/history", get(history))
        .route("/api/analysis", get(analysis))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("dashboard listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("dashboard shutdown signal received");
            })
            .await
        {
            tracing::error!("dashboard server error: {e}");
        }
    });

    Ok((actual_addr, shutdown_tx))
}
