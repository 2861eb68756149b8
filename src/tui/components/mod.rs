//! Reusable widgets shared by the tabs.

pub mod panel;
pub mod status_bar;
pub mod tab_bar;
