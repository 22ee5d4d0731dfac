//! Integration tests for the database read path and request plumbing

use std::sync::Arc;

use stardog::fakes::ScriptedTransport;
use stardog::{
    Database, ErrorKind, HttpResponse, QueryOptions, ReasoningLevel, Server, ServerConfig,
    StardogError,
};

fn setup(config: ServerConfig) -> (Arc<ScriptedTransport>, Database) {
    let transport = Arc::new(ScriptedTransport::new());
    let server = Server::with_transport(config, transport.clone());
    (transport, server.db("people"))
}

const SELECT: &str = "SELECT DISTINCT ?s WHERE { ?s ?p ?o } LIMIT 10";

#[tokio::test]
async fn test_query_request_shape() {
    let (transport, db) = setup(ServerConfig::default());
    transport.push_ok("");

    let options = QueryOptions::new()
        .with_base_uri("http://example.org/")
        .with_offset(20)
        .with_limit(10);
    db.query(SELECT, &options).await.unwrap();

    let req = transport.last_request().unwrap();
    assert_eq!(req.method, reqwest::Method::GET);
    assert_eq!(req.path, "/people/query");
    assert_eq!(req.param_value("query"), Some(SELECT));
    assert_eq!(req.param_value("baseURI"), Some("http://example.org/"));
    assert_eq!(req.param_value("offset"), Some("20"));
    assert_eq!(req.param_value("limit"), Some("10"));
    assert_eq!(req.header_value("Accept"), Some("application/sparql-results+json"));
    assert!(req.header_value("SD-Connection-String").is_none());
}

#[tokio::test]
async fn test_query_reasoning_header() {
    for level in ReasoningLevel::ALL {
        let (transport, db) = setup(ServerConfig::default());
        transport.push_ok("");

        let options = QueryOptions::new().with_reasoning(level);
        db.query(SELECT, &options).await.unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(
            req.header_value("SD-Connection-String"),
            Some(format!("reasoning={}", level.as_str()).as_str())
        );
    }
}

#[tokio::test]
async fn test_unknown_reasoning_level_fails_to_parse() {
    let (transport, db) = setup(ServerConfig::default());

    let result: Result<ReasoningLevel, StardogError> = "MAGIC".parse();
    match result {
        Err(err) => assert!(err.to_string().contains("Invalid reasoning level: MAGIC")),
        Ok(_) => panic!("MAGIC accepted as a reasoning level"),
    }

    assert_eq!(transport.request_count(), 0);
    assert_eq!(db.name(), "people");
}

#[tokio::test]
async fn test_empty_query_body_yields_no_results() {
    let (transport, db) = setup(ServerConfig::default());
    transport.push_ok("");

    let results = db.query(SELECT, &QueryOptions::default()).await.unwrap();
    assert!(results.is_empty());
    assert_eq!(results.iter().count(), 0);
}

#[tokio::test]
async fn test_query_decodes_bindings() {
    let (transport, db) = setup(ServerConfig::default());
    transport.push_ok(
        r#"{"head":{"vars":["s"]},"results":{"bindings":[
            {"s":{"type":"uri","value":"http://stardog.com/"}}]}}"#,
    );

    let results = db.query(SELECT, &QueryOptions::default()).await.unwrap();
    assert_eq!(results.len(), 1);
    let names: Vec<&str> = results
        .iter()
        .filter_map(|s| s.get("s").map(|t| t.value()))
        .collect();
    assert_eq!(names, vec!["http://stardog.com/"]);
}

#[tokio::test]
async fn test_query_error_classified() {
    let (transport, db) = setup(ServerConfig::default());
    transport.push_response(
        HttpResponse::new(reqwest::StatusCode::BAD_REQUEST)
            .with_header("SD-Error-Code", "2")
            .with_body("parse error"),
    );

    let err = db.query("SELEKT", &QueryOptions::default()).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::BadRequest));
    assert_eq!(err.error_code(), Some(2));
    assert!(err.to_string().contains("Query evaluation error HTTP Status=400, parse error"));
}

#[tokio::test]
async fn test_size() {
    let (transport, db) = setup(ServerConfig::default());
    transport.push_ok("42\n").push_ok("lots");

    assert_eq!(db.size().await.unwrap(), 42);
    assert_eq!(transport.last_request().unwrap().path, "/people/size");

    assert!(matches!(db.size().await, Err(StardogError::Protocol(_))));
}

#[tokio::test]
async fn test_credentials_attached_and_settable() {
    let (transport, db) = setup(ServerConfig::default().with_credentials("admin", "admin"));
    transport.push_ok("1").push_ok("2").push_ok("3");

    db.size().await.unwrap();
    let creds = transport.last_request().unwrap().credentials.unwrap();
    assert_eq!((creds.username.as_str(), creds.password.as_str()), ("admin", "admin"));

    let mut db = db.with_credentials("reader", "pw");
    db.size().await.unwrap();
    assert_eq!(transport.last_request().unwrap().credentials.unwrap().username, "reader");

    db.clear_credentials();
    db.size().await.unwrap();
    assert!(transport.last_request().unwrap().credentials.is_none());
}

#[tokio::test]
async fn test_database_name_is_path_encoded() {
    let transport = Arc::new(ScriptedTransport::new());
    let server = Server::with_transport(ServerConfig::default(), transport.clone());
    transport.push_ok("0");

    server.db("my db").size().await.unwrap();
    assert_eq!(transport.last_request().unwrap().path, "/my%20db/size");
}
