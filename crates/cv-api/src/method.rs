//! Request methods understood by the API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of call the lifecycle issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// GET, parameters travel in the query string.
    Read,
    /// POST, parameters travel as a JSON body.
    Create,
    /// DELETE, no parameters.
    Delete,
}

impl Method {
    /// HTTP verb for this method.
    pub fn verb(&self) -> &'static str {
        match self {
            Method::Read => "GET",
            Method::Create => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}
