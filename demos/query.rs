//! Query Demo — runs SPARQL queries against a running Stardog server
//!
//! Expects a database named `rubytest` (see `load_data`). Connection settings
//! come from `STARDOG_URL`, `STARDOG_USERNAME` and `STARDOG_PASSWORD`.
//!
//! Run with: cargo run --example query

use stardog::{QueryOptions, Server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let server = Server::new(ServerConfig::from_env())?;
    let db = server.db("rubytest");

    println!("Which distinct subjects are in our database?");
    let results = db
        .query(
            "SELECT DISTINCT ?s WHERE { ?s ?p ?o } LIMIT 10",
            &QueryOptions::default(),
        )
        .await?;
    for solution in &results {
        if let Some(subject) = solution.get("s") {
            println!("  {}", subject);
        }
    }

    println!("\nWho created Stardog?");
    let solutions = db
        .query(
            r#"
            PREFIX dc: <http://purl.org/dc/elements/1.1/>
            SELECT ?name
            WHERE {
                <http://stardog.com/> dc:creator ?creator .
                ?creator dc:title ?name .
            }
            "#,
            &QueryOptions::default(),
        )
        .await?;

    match solutions.iter().next().and_then(|s| s.get("name")) {
        Some(name) => println!("  {}", name.value()),
        None => println!("  (nobody)"),
    }

    Ok(())
}
