//! B.E.E. Hive Manager control panel: standalone egui window.
//!
//! Run with: cargo run -p bee-control-panel
//! Reads `BEE_BASE_URL` (or `BEE_CONFIG` / config/bee.toml) to find the agent.

use std::time::Duration;

use bee_control_panel::{
    bee_control_panel_channel, bee_view_channel, run_panel_worker, BeeControlPanel,
};
use bee_core::{HivePanel, PanelConfig};
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const REPAINT_INTERVAL: Duration = Duration::from_millis(250);

fn main() -> eframe::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[bee-control-panel] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match PanelConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("bee-control-panel: config: {}", e);
            std::process::exit(1);
        }
    };

    let (tx, rx) = bee_control_panel_channel(64);
    let (view_tx, view_rx) = bee_view_channel();
    let panel = HivePanel::connect(&config);

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to start panel worker runtime");
                return;
            }
        };
        rt.block_on(run_panel_worker(panel, rx, view_tx));
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_title("B.E.E. Hive Manager"),
        ..Default::default()
    };

    eframe::run_native(
        "B.E.E. Hive Manager",
        options,
        Box::new(move |_cc| Ok(Box::new(BeeControlPanelApp::new(BeeControlPanel::new(view_rx, tx))))),
    )
}

struct BeeControlPanelApp {
    panel: BeeControlPanel,
}

impl BeeControlPanelApp {
    fn new(panel: BeeControlPanel) -> Self {
        Self { panel }
    }
}

impl eframe::App for BeeControlPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.panel.bee_ui(ui);
        });
        // Worker updates arrive off the UI thread.
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
