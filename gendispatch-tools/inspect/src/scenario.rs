//! Scenario files.
//!
//! A scenario declares a class hierarchy, virtual ancestor registrations,
//! generic functions whose implementations return fixed labels, and queries
//! against those functions.
//!
//! ```toml
//! [[class]]
//! name = "Rock"
//!
//! [[class]]
//! name = "StrongRock"
//! bases = ["Rock"]
//!
//! [[function]]
//! name = "beats"
//! params = ["a", "b"]
//!
//! [[function.rule]]
//! types = ["Rock", "Rock"]
//! result = "draw"
//!
//! [[query]]
//! function = "beats"
//! types = ["StrongRock", "Rock"]
//! expect = "draw"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{parse_document, read_document, InspectError};

/// Expected outcome meaning "the call fails".
pub const EXPECT_ERROR: &str = "error";

/// A complete scenario file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Classes, in definition order; bases must be defined earlier.
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassDecl>,

    /// Virtual ancestor registrations, applied after all classes.
    #[serde(default, rename = "virtual")]
    pub virtuals: Vec<VirtualDecl>,

    #[serde(default, rename = "function")]
    pub functions: Vec<FunctionDecl>,

    #[serde(default, rename = "query")]
    pub queries: Vec<QueryDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub bases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualDecl {
    pub ancestor: String,
    pub subclass: String,
}

/// A generic function whose implementations return labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    /// Dispatch parameters; all parameters when omitted.
    #[serde(default)]
    pub dispatch_on: Option<Vec<String>>,
    /// Label returned when no rule matches; not-implemented when omitted.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default, rename = "rule")]
    pub rules: Vec<RuleDecl>,
}

impl FunctionDecl {
    /// The dispatch parameter names.
    pub fn dispatch_names(&self) -> &[String] {
        self.dispatch_on.as_deref().unwrap_or(&self.params)
    }
}

/// One registration: classes at the dispatch positions and the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDecl {
    pub types: Vec<String>,
    pub result: String,
}

/// A call to evaluate, named by the classes at the dispatch positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDecl {
    pub function: String,
    pub types: Vec<String>,
    /// Expected label, or `"error"` when the call should fail.
    #[serde(default)]
    pub expect: Option<String>,
}

impl Scenario {
    /// Load a scenario file, TOML or JSON by extension.
    pub fn from_file(path: &Path) -> Result<Self, InspectError> {
        read_document(path)
    }

    /// Parse a TOML scenario.
    pub fn from_toml_str(source: &str) -> Result<Self, InspectError> {
        parse_document(Path::new("<inline>.toml"), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_example() {
        let scenario = Scenario::from_toml_str(
            r#"
            [[class]]
            name = "Rock"

            [[class]]
            name = "StrongRock"
            bases = ["Rock"]

            [[function]]
            name = "beats"
            params = ["a", "b"]

            [[function.rule]]
            types = ["Rock", "Rock"]
            result = "draw"

            [[query]]
            function = "beats"
            types = ["StrongRock", "Rock"]
            expect = "draw"
            "#,
        )
        .unwrap();

        assert_eq!(scenario.classes.len(), 2);
        assert_eq!(scenario.classes[1].bases, vec!["Rock".to_string()]);
        assert!(scenario.virtuals.is_empty());
        assert_eq!(scenario.functions[0].rules[0].result, "draw");
        assert_eq!(scenario.functions[0].dispatch_names(), ["a", "b"]);
        assert_eq!(scenario.queries[0].expect.as_deref(), Some("draw"));
    }

    #[test]
    fn test_explicit_dispatch_on() {
        let scenario = Scenario::from_toml_str(
            r#"
            [[function]]
            name = "write"
            params = ["self", "obj"]
            dispatch_on = ["obj"]
            default = "fallback"
            "#,
        )
        .unwrap();

        let function = &scenario.functions[0];
        assert_eq!(function.dispatch_names(), ["obj"]);
        assert_eq!(function.default.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = Scenario::from_toml_str("[[class]]\nbases = 3").unwrap_err();
        assert!(matches!(err, InspectError::Parse { .. }));
        assert!(err.to_string().contains("<inline>.toml"));
    }
}
