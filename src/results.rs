//! SPARQL query results
//!
//! Decodes the SPARQL 1.1 Query Results JSON format
//! (`application/sparql-results+json`).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StardogError, StardogResult};

/// RDF term bound to a variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RdfTerm {
    #[serde(rename = "uri")]
    Iri { value: String },

    #[serde(rename = "literal", alias = "typed-literal")]
    Literal {
        value: String,
        #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },

    #[serde(rename = "bnode")]
    BlankNode { value: String },
}

impl RdfTerm {
    /// Lexical value without type or language decoration
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri { value } | RdfTerm::Literal { value, .. } | RdfTerm::BlankNode { value } => value,
        }
    }
}

impl fmt::Display for RdfTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdfTerm::Iri { value } => write!(f, "<{}>", value),
            RdfTerm::BlankNode { value } => write!(f, "_:{}", value),
            RdfTerm::Literal { value, language: Some(lang), .. } => write!(f, "\"{}\"@{}", value, lang),
            RdfTerm::Literal { value, datatype: Some(dt), .. } => write!(f, "\"{}\"^^<{}>", value, dt),
            RdfTerm::Literal { value, .. } => write!(f, "\"{}\"", value),
        }
    }
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySolution {
    /// Variable name → RDF term bindings. Unbound variables are absent.
    pub bindings: HashMap<String, RdfTerm>,
}

impl QuerySolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<&RdfTerm> {
        self.bindings.get(variable)
    }

    pub fn bind(&mut self, variable: String, term: RdfTerm) {
        self.bindings.insert(variable, term);
    }
}

/// SPARQL query results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResults {
    /// Bindings from a SELECT query
    Bindings {
        variables: Vec<String>,
        solutions: Vec<QuerySolution>,
    },

    /// Result of an ASK query
    Boolean(bool),
}

#[derive(Deserialize)]
struct RawResults {
    #[serde(default)]
    head: RawHead,
    results: Option<RawBindings>,
    boolean: Option<bool>,
}

#[derive(Deserialize, Default)]
struct RawHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct RawBindings {
    #[serde(default)]
    bindings: Vec<QuerySolution>,
}

impl QueryResults {
    /// Create empty bindings result
    pub fn empty() -> Self {
        QueryResults::Bindings {
            variables: Vec::new(),
            solutions: Vec::new(),
        }
    }

    /// Decode a response body. A blank body is an empty result, not an error.
    pub fn parse(body: &str) -> StardogResult<Self> {
        if body.trim().is_empty() {
            return Ok(Self::empty());
        }

        let raw: RawResults = serde_json::from_str(body)?;
        match (raw.boolean, raw.results) {
            (Some(value), _) => Ok(QueryResults::Boolean(value)),
            (None, Some(results)) => Ok(QueryResults::Bindings {
                variables: raw.head.vars,
                solutions: results.bindings,
            }),
            (None, None) => Err(StardogError::Protocol(
                "query response has neither 'results' nor 'boolean'".to_string(),
            )),
        }
    }

    pub fn variables(&self) -> &[String] {
        match self {
            QueryResults::Bindings { variables, .. } => variables,
            QueryResults::Boolean(_) => &[],
        }
    }

    pub fn solutions(&self) -> &[QuerySolution] {
        match self {
            QueryResults::Bindings { solutions, .. } => solutions,
            QueryResults::Boolean(_) => &[],
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            QueryResults::Boolean(value) => Some(*value),
            QueryResults::Bindings { .. } => None,
        }
    }

    /// Number of solutions (0 for ASK results)
    pub fn len(&self) -> usize {
        self.solutions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuerySolution> {
        self.solutions().iter()
    }
}

impl<'a> IntoIterator for &'a QueryResults {
    type Item = &'a QuerySolution;
    type IntoIter = std::slice::Iter<'a, QuerySolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECT_BODY: &str = r#"{
        "head": { "vars": ["s", "name", "node"] },
        "results": { "bindings": [
            {
                "s": { "type": "uri", "value": "http://stardog.com/" },
                "name": { "type": "literal", "value": "Stardog", "xml:lang": "en" },
                "node": { "type": "bnode", "value": "b0" }
            },
            {
                "s": { "type": "uri", "value": "http://example.org/x" },
                "name": { "type": "typed-literal", "value": "42",
                          "datatype": "http://www.w3.org/2001/XMLSchema#integer" }
            }
        ] }
    }"#;

    #[test]
    fn test_empty_body() {
        assert_eq!(QueryResults::parse("").unwrap(), QueryResults::empty());
        assert!(QueryResults::parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_select_results() {
        let results = QueryResults::parse(SELECT_BODY).unwrap();
        assert_eq!(results.variables(), &["s", "name", "node"]);
        assert_eq!(results.len(), 2);

        let first = &results.solutions()[0];
        assert_eq!(first.get("s").unwrap().value(), "http://stardog.com/");
        assert_eq!(first.get("name").unwrap().to_string(), "\"Stardog\"@en");
        assert_eq!(first.get("node").unwrap().to_string(), "_:b0");

        let second = &results.solutions()[1];
        assert!(second.get("node").is_none());
        assert_eq!(
            second.get("name").unwrap().to_string(),
            "\"42\"^^<http://www.w3.org/2001/XMLSchema#integer>"
        );
    }

    #[test]
    fn test_ask_result() {
        let results = QueryResults::parse(r#"{ "head": {}, "boolean": true }"#).unwrap();
        assert_eq!(results.as_bool(), Some(true));
        assert!(results.is_empty());
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(
            QueryResults::parse("not json"),
            Err(StardogError::Serialization(_))
        ));
        assert!(matches!(
            QueryResults::parse(r#"{ "head": { "vars": [] } }"#),
            Err(StardogError::Protocol(_))
        ));
    }
}
