//! revlens: filter state and view derivation for a review-sentiment
//! dashboard.
//!
//! A precomputed [`model::BaselineDocument`] is loaded once. The
//! [`dashboard::Dashboard`] holds it together with the current
//! [`dataset::DatasetView`] and the sentiment / dimension selection, and
//! derives a [`view::DashboardView`] on demand. Date-range filtering goes
//! through [`filter::FilterOrchestrator`], which consults the
//! [`cache::ExpiringCache`] before asking a [`remote::Summarizer`] for fresh
//! dimension summaries.

pub mod aggregate;
pub mod analytics;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod filter;
pub mod model;
pub mod remote;
pub mod utils;
pub mod view;
pub mod web;
