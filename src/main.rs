mod app;
mod auth;
mod backend;
mod event;
mod format;
mod scenario;
mod session;
mod state;
mod theme;

use app::RehearseApp;
use backend::BackendClient;
use eframe::egui;
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let base_url = std::env::var("REHEARSE_BACKEND_URL")
        .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
    let (tx, rx) = mpsc::channel();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("rehearse-runtime")
        .build()?;

    let backend = runtime.block_on(async { BackendClient::new(base_url, tx.clone()) })?;
    let (authenticated, auth_warning) = auth::store::load();

    let app = RehearseApp::new(rx, backend, authenticated, auth_warning);
    let _runtime = runtime;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rehearse",
        native_options,
        Box::new(move |creation_context| {
            app.theme().apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
