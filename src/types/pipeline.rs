use crate::{Error, ErrorContext};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Retrieval strategy for the `ask` capability. Interpreted by the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    #[default]
    Standard,
    Reranking,
}

impl Pipeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pipeline::Standard => "standard",
            Pipeline::Reranking => "reranking",
        }
    }
}

impl FromStr for Pipeline {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Pipeline::Standard),
            "reranking" => Ok(Pipeline::Reranking),
            _ => Err(Error::invalid_argument_with_context(
                format!("unknown pipeline {:?}; expected \"standard\" or \"reranking\"", s),
                ErrorContext::new()
                    .with_field_path("pipeline")
                    .with_source("request_codec"),
            )),
        }
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
