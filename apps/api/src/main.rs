mod cli;
mod client;
mod companies;
mod config;
mod dashboard;
mod db;
mod errors;
mod models;
mod reports;
mod results;
mod routes;
mod scoring;
mod server;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
