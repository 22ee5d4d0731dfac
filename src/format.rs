//! RDF serialization formats accepted by the server

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::StardogError;

/// RDF serialization format, sent as the request `Content-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RdfFormat {
    /// JSON-LD (.jsonld)
    JsonLd,
    /// N-Triples (.nt)
    NTriples,
    /// N-Quads (.nq)
    NQuads,
    /// RDF/XML (.rdf, .owl)
    #[default]
    RdfXml,
    /// Turtle (.ttl)
    Turtle,
    /// TriG (.trig)
    TriG,
    /// TriX (.trix)
    TriX,
}

impl RdfFormat {
    pub const ALL: [RdfFormat; 7] = [
        RdfFormat::JsonLd,
        RdfFormat::NTriples,
        RdfFormat::NQuads,
        RdfFormat::RdfXml,
        RdfFormat::Turtle,
        RdfFormat::TriG,
        RdfFormat::TriX,
    ];

    pub fn mime_type(&self) -> &'static str {
        match self {
            RdfFormat::JsonLd => "application/ld+json",
            RdfFormat::NTriples => "text/plain",
            RdfFormat::NQuads => "text/x-nquads",
            RdfFormat::RdfXml => "application/rdf+xml",
            RdfFormat::Turtle => "application/x-turtle",
            RdfFormat::TriG => "application/x-trig",
            RdfFormat::TriX => "application/trix",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            RdfFormat::JsonLd => "jsonld",
            RdfFormat::NTriples => "ntriples",
            RdfFormat::NQuads => "nquads",
            RdfFormat::RdfXml => "rdfxml",
            RdfFormat::Turtle => "turtle",
            RdfFormat::TriG => "trig",
            RdfFormat::TriX => "trix",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.mime_type() == mime)
    }

    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jsonld" => Some(RdfFormat::JsonLd),
            "nt" => Some(RdfFormat::NTriples),
            "nq" => Some(RdfFormat::NQuads),
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            "ttl" | "turtle" => Some(RdfFormat::Turtle),
            "trig" => Some(RdfFormat::TriG),
            "trix" => Some(RdfFormat::TriX),
            _ => None,
        }
    }
}

impl fmt::Display for RdfFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Accepts either a MIME type or a short name such as `turtle`
impl FromStr for RdfFormat {
    type Err = StardogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(format) = Self::from_mime_type(s) {
            return Ok(format);
        }
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.short_name() == lower)
            .ok_or_else(|| StardogError::InvalidFormat(s.to_string()))
    }
}
