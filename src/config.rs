use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::lookup::LookupKey;

/// Default number of documents shown in range mode
pub const DEFAULT_LIMIT: i64 = 10;

/// Field used for id-list lookups unless configured otherwise
pub const DEFAULT_ID_FIELD: &str = "id";

/// How results are rendered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(OutputFormat::Text),
            "json" | "jsonl" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Which retrieval path an inspection run takes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InspectMode {
    /// Page through ordinals, skipping deleted documents
    Range { offset: i64, limit: i64 },
    /// Resolve each key by exact-term lookup, in input order
    Ids(Vec<LookupKey>),
}

/// Inspection run configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InspectConfig {
    pub index_path: PathBuf,
    pub limit: i64,
    pub offset: i64,
    /// When present, id-list mode overrides range mode entirely
    pub doc_ids: Option<Vec<String>>,
    pub id_field: String,
    pub format: OutputFormat,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from("."),
            limit: DEFAULT_LIMIT,
            offset: 0,
            doc_ids: None,
            id_field: DEFAULT_ID_FIELD.to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl InspectConfig {
    pub fn new(index_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            ..Default::default()
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Switch to id-list mode with a raw comma-separated list
    pub fn with_doc_ids(mut self, raw: &str) -> Self {
        self.doc_ids = Some(parse_doc_ids(raw));
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn mode(&self) -> InspectMode {
        match &self.doc_ids {
            Some(ids) => InspectMode::Ids(
                ids.iter()
                    .map(|id| LookupKey::new(self.id_field.clone(), id.clone()))
                    .collect(),
            ),
            None => InspectMode::Range {
                offset: self.offset,
                limit: self.limit,
            },
        }
    }
}

/// Split a comma-separated id list, trimming whitespace and dropping empties
pub fn parse_doc_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}
