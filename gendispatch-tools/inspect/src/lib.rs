//! Scenario runner and dispatch inspector for gendispatch.
//!
//! A scenario file declares classes, virtual ancestors and generic functions
//! whose implementations return labels. The inspector builds the hierarchy
//! and the registries, then answers queries: which label a call returns, and
//! which candidate keys dispatch walks to find it.
//!
//! # Module Structure
//!
//! - [`config`] - Inspector configuration
//! - [`scenario`] - Scenario file model
//! - [`report`] - Text and JSON rendering
//! - [`demo`] - Built-in rock-paper-scissors table

use std::fs;
use std::path::{Path, PathBuf};

use gendispatch::{
    ClassHierarchy, ClassId, DefinitionError, DispatchError, GenericFunction, HierarchyError,
    Instance, Signature,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub mod config;
pub mod demo;
pub mod report;
pub mod scenario;

pub use config::{Config, OutputFormat};
pub use scenario::{FunctionDecl, QueryDecl, Scenario, EXPECT_ERROR};

/// Errors raised while loading scenarios or answering queries.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to render output: {0}")]
    Render(String),

    #[error("in function `{function}`: {source}")]
    Function {
        function: String,
        #[source]
        source: DefinitionError,
    },

    #[error("function `{0}` is defined twice")]
    DuplicateFunction(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// A call argument that carries only its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub ClassId);

impl Instance for Token {
    fn class_id(&self) -> ClassId {
        self.0
    }
}

/// Scenario functions return the label of the rule that matched.
pub type LabelFunction = GenericFunction<Token, String>;

/// A scenario's hierarchy and generic functions, ready for queries.
#[derive(Debug)]
pub struct Workspace {
    hierarchy: ClassHierarchy,
    functions: IndexMap<String, LabelFunction>,
}

impl Workspace {
    /// Define the scenario's classes, virtual ancestors and functions.
    pub fn build(scenario: &Scenario) -> Result<Self, InspectError> {
        let mut hierarchy = ClassHierarchy::new();
        for class in &scenario.classes {
            let bases: Vec<&str> = class.bases.iter().map(String::as_str).collect();
            hierarchy.define(class.name.as_str(), &bases)?;
        }
        for decl in &scenario.virtuals {
            let ancestor = hierarchy.resolve_name(&decl.ancestor)?;
            let subclass = hierarchy.resolve_name(&decl.subclass)?;
            hierarchy.register_virtual(ancestor, subclass)?;
        }

        let mut functions = IndexMap::new();
        for decl in &scenario.functions {
            if functions.contains_key(&decl.name) {
                return Err(InspectError::DuplicateFunction(decl.name.clone()));
            }
            let function =
                build_function(&hierarchy, decl).map_err(|source| InspectError::Function {
                    function: decl.name.clone(),
                    source,
                })?;
            functions.insert(decl.name.clone(), function);
        }

        debug!(
            classes = hierarchy.len(),
            functions = functions.len(),
            "built workspace"
        );
        Ok(Self {
            hierarchy,
            functions,
        })
    }

    pub fn hierarchy(&self) -> &ClassHierarchy {
        &self.hierarchy
    }

    /// Look up a function by name.
    pub fn function(&self, name: &str) -> Result<&LabelFunction, InspectError> {
        self.functions
            .get(name)
            .ok_or_else(|| InspectError::UnknownFunction(name.to_string()))
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &LabelFunction> {
        self.functions.values()
    }

    /// The candidate keys a call with these dispatch classes walks.
    pub fn info(&self, function: &str, types: &[String]) -> Result<Vec<Vec<String>>, InspectError> {
        let function = self.function(function)?;
        let classes = self.classes(types)?;
        Ok(function.dispatch_info(&self.hierarchy, &classes)?)
    }

    /// Call `function` with the given classes at its dispatch positions.
    ///
    /// Parameters that are not dispatched on receive an `object` argument.
    pub fn resolve(&self, function: &str, types: &[String]) -> Result<String, InspectError> {
        let function = self.function(function)?;
        let classes = self.classes(types)?;
        let positions = function.signature().dispatch_positions();
        if classes.len() != positions.len() {
            return Err(DispatchError::TypeCount {
                function: function.name().to_string(),
                expected: positions.len(),
                found: classes.len(),
            }
            .into());
        }

        let mut args = vec![Token(ClassId::OBJECT); function.signature().params().len()];
        for (&position, &class) in positions.iter().zip(&classes) {
            args[position] = Token(class);
        }
        let label = function.call(&self.hierarchy, &args)?;
        debug!(function = function.name(), types = ?types, %label, "resolved call");
        Ok(label)
    }

    /// Evaluate queries in order.
    ///
    /// With `fail_fast` the reports end at the first failing query.
    pub fn check(&self, queries: &[QueryDecl], config: &Config) -> Vec<QueryReport> {
        let mut reports = Vec::with_capacity(queries.len());
        for query in queries {
            let report = QueryReport::new(query, self.resolve(&query.function, &query.types));
            debug!(
                function = %query.function,
                types = ?query.types,
                actual = %report.actual,
                passed = report.passed,
                "evaluated query"
            );
            let failed = !report.passed;
            reports.push(report);
            if failed && config.fail_fast {
                break;
            }
        }

        let passed = reports.iter().filter(|r| r.passed).count();
        info!(
            "Checked {} queries, {} failed",
            reports.len(),
            reports.len() - passed
        );
        reports
    }

    fn classes(&self, names: &[String]) -> Result<Vec<ClassId>, InspectError> {
        names
            .iter()
            .map(|name| self.hierarchy.resolve_name(name).map_err(Into::into))
            .collect()
    }
}

/// The result of one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    pub function: String,
    pub types: Vec<String>,
    pub expect: Option<String>,
    /// The returned label, or the error message.
    pub actual: String,
    /// Whether the call failed.
    pub errored: bool,
    pub passed: bool,
}

impl QueryReport {
    fn new(query: &QueryDecl, outcome: Result<String, InspectError>) -> Self {
        let (actual, errored) = match outcome {
            Ok(label) => (label, false),
            Err(err) => (err.to_string(), true),
        };
        let passed = match query.expect.as_deref() {
            None => !errored,
            Some(EXPECT_ERROR) => errored,
            Some(label) => !errored && actual == label,
        };
        Self {
            function: query.function.clone(),
            types: query.types.clone(),
            expect: query.expect.clone(),
            actual,
            errored,
            passed,
        }
    }
}

fn build_function(
    hierarchy: &ClassHierarchy,
    decl: &FunctionDecl,
) -> Result<LabelFunction, DefinitionError> {
    let signature = Signature::new(decl.name.as_str(), &decl.params)
        .dispatch_on(decl.dispatch_names())?;

    let mut function = LabelFunction::new(signature);
    if let Some(label) = &decl.default {
        let label = label.clone();
        function = function.with_default(move |_| Ok(label.clone()));
    }
    for rule in &decl.rules {
        let types: Vec<&str> = rule.types.iter().map(String::as_str).collect();
        let label = rule.result.clone();
        function.register_named(hierarchy, &types, move |_| Ok(label.clone()))?;
    }
    Ok(function)
}

pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, InspectError> {
    let content = fs::read_to_string(path).map_err(|source| InspectError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(path, &content)
}

/// Parse JSON for `.json` paths and TOML otherwise.
pub(crate) fn parse_document<T: DeserializeOwned>(
    path: &Path,
    content: &str,
) -> Result<T, InspectError> {
    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(content).map_err(|err| err.to_string())
    } else {
        toml::from_str(content).map_err(|err| err.to_string())
    };
    parsed.map_err(|message| InspectError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
