//! Root-signature parsing.
//!
//! Roots arrive as a plain-text list, one declaration per line:
//!
//! ```text
//! # keep the public entry points
//! com/example/Gson
//! com/example/JsonNull#INSTANCE
//! com/example/Gson#newBuilder()Lcom/example/GsonBuilder;
//! ```
//!
//! Blank lines and `#`-comments are skipped. A field root carries no descriptor;
//! the analyzer resolves it from the owning class later. Lines are independent
//! and their order never affects the resulting keep sets.

/// A declaration the caller wants guaranteed to remain present and callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootSignature {
    /// Keep a class and everything its header references.
    Class {
        /// Internal name of the class
        owner: String,
    },
    /// Keep a field; the descriptor is resolved from the owner when absent.
    Field {
        /// Internal name of the owning class
        owner: String,
        /// Field name
        name: String,
        /// Field descriptor, if the root spelled one out
        descriptor: Option<String>,
    },
    /// Keep a method with an exact descriptor.
    Method {
        /// Internal name of the owning class
        owner: String,
        /// Method name
        name: String,
        /// Method descriptor
        descriptor: String,
    },
}

impl RootSignature {
    /// Parse one line of a root list. Returns `None` for blank and comment lines.
    ///
    /// Any non-empty, non-comment line that does not match the member grammar is
    /// best-effort-parsed as a class root; root parsing never fails.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<RootSignature> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let Some(hash) = trimmed.find('#') else {
            return Some(RootSignature::Class {
                owner: trimmed.to_string(),
            });
        };

        let owner = trimmed[..hash].to_string();
        let rest = &trimmed[hash + 1..];
        match rest.find('(') {
            None => Some(RootSignature::Field {
                owner,
                name: rest.to_string(),
                descriptor: None,
            }),
            Some(paren) => Some(RootSignature::Method {
                owner,
                name: rest[..paren].to_string(),
                descriptor: rest[paren..].to_string(),
            }),
        }
    }

    /// Parse a whole root list, skipping blank and comment lines.
    #[must_use]
    pub fn parse_list(text: &str) -> Vec<RootSignature> {
        text.lines().filter_map(RootSignature::parse_line).collect()
    }

    /// The class the root ultimately anchors to.
    #[must_use]
    pub fn owner(&self) -> &str {
        match self {
            RootSignature::Class { owner }
            | RootSignature::Field { owner, .. }
            | RootSignature::Method { owner, .. } => owner,
        }
    }
}
