//! bee-control-panel: egui control panel for the B.E.E. agent.
//!
//! The UI never awaits. It talks to a panel worker over tokio channels
//! (`bee_bridge`); the worker owns the bee-core `HivePanel`.
//! Public UI items use the `bee_` naming convention.

pub mod bee_control_panel;

pub use bee_control_panel::{
    bee_control_panel_channel, bee_view_channel, run_panel_worker, BeeControlPanel,
    BeeIntentSender, PanelIntent, PanelView,
};
