//! HTTP surface: health, scrape and KPI ingestion

pub mod middleware;
pub mod routes;
mod server;

pub use server::{ApiServer, build_router};
