pub mod catalog;
pub mod config;
pub mod mdx;
pub mod queries;
pub mod query_handler;
pub mod server;
pub mod xmla;

pub use server::DashboardServer;
