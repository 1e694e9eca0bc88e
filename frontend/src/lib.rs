//! FinEase operator panel: enter or upload an organization's figures, get a
//! risk assessment from the backend, and view it as cards and charts.

pub mod analysis;
pub mod api;
pub mod app;
pub mod chartjs;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod inflight;
pub mod pages;
pub mod session;
