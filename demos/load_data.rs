//! Load Demo — loads a Turtle file into a database inside one transaction
//!
//! Run with: cargo run --example load_data -- path/to/data.ttl

use stardog::{RdfFormat, Server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/test.ttl".to_string());
    let rdf_data = std::fs::read_to_string(&path)?;

    let config = ServerConfig::from_env();
    let db = Server::new(config)?.db("rubytest");

    let mut tx = db.begin().await?;
    println!("Started transaction {}", tx.id().unwrap_or_default());

    if let Err(e) = tx.add(&rdf_data, RdfFormat::Turtle, None).await {
        tx.rollback().await?;
        return Err(e.into());
    }
    tx.commit().await?;

    println!("Loaded {} into '{}' ({} triples)", path, db.name(), db.size().await?);
    Ok(())
}
