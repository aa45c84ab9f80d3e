//! Lead Scoring Dashboard Library
//!
//! This library provides the dashboard that sits in front of the external
//! lead scoring API: it submits new leads for scoring, fetches the scored
//! leads and renders them into an HTML table ranked by reranked score.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `dashboard`: Dashboard controller and the view contract it drives.
//! - `errors`: Fetch and submit failure types.
//! - `handlers`: HTTP routes serving the dashboard page.
//! - `models`: Lead input coercion, scored leads and intent tiers.
//! - `page`: In-process page state rendered by the HTTP layer.
//! - `render`: HTML rendering (badges, rows, full page).
//! - `scoring_client`: Scoring API client.

pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod page;
pub mod render;
pub mod scoring_client;
