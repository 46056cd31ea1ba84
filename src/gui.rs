//! Dashboard window using egui
//!
//! Owns the loaded dataset, starts the one-shot CSV load on creation and lays
//! out the bar chart and scatter plot above the parallel coordinates plot.

use eframe::egui;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::charts::bar::BarChart;
use crate::charts::parallel::ParallelPlot;
use crate::charts::scatter::ScatterPlot;
use crate::config::Config;
use crate::loader;
use crate::signal::BrushSignal;
use crate::survey::Dataset;

const TITLE: &str = "Music & Mental Health Dashboard";

/// Run the dashboard window
pub fn run_dashboard(config: Config) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 1080.0])
            .with_title(TITLE),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

struct DashboardApp {
    pending: Option<oneshot::Receiver<Dataset>>,
    bar: BarChart,
    scatter: ScatterPlot,
    parallel: ParallelPlot,
}

impl DashboardApp {
    fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let signal = BrushSignal::new();
        let charts = &config.charts;

        Self {
            pending: Some(spawn_load(cc.egui_ctx.clone(), config.data.source.clone())),
            bar: BarChart::new(charts.bar, config.sort_duration_secs()),
            scatter: ScatterPlot::new(charts.scatter, signal.clone()),
            parallel: ParallelPlot::new(charts.parallel, &signal),
        }
    }

    /// Hand the dataset to the charts once the load finishes
    fn poll_load(&mut self) {
        let Some(rx) = self.pending.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(data) => {
                if data.is_empty() {
                    warn!("Dataset is empty, charts will render without marks");
                } else {
                    info!("Dataset arrived, distributing to charts");
                }
                self.bar.set_data(data.genres);
                self.scatter.set_data(data.scatter);
                self.parallel.set_data(data.parallel);
                self.pending = None;
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                warn!("Load task ended without a dataset");
                self.pending = None;
            }
        }
    }
}

/// Fetch once in the background; repaint when done
fn spawn_load(ctx: egui::Context, source: String) -> oneshot::Receiver<Dataset> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        info!("Loading survey data from {}", source);
        let data = loader::load_or_empty(&source).await;
        let _ = tx.send(data);
        ctx.request_repaint();
    });
    rx
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_load();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading(TITLE);
                });
                ui.add_space(8.0);

                ui.horizontal(|ui| {
                    ui.vertical(|ui| self.bar.show(ui));
                    ui.add_space(16.0);
                    ui.vertical(|ui| self.scatter.show(ui));
                });
                ui.add_space(24.0);

                self.parallel.show(ui);
            });
        });
    }
}
