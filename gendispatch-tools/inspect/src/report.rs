//! Text and JSON rendering of inspector results.

use serde::Serialize;

use gendispatch::Signature;

use crate::config::{Config, OutputFormat};
use crate::demo::Outcome;
use crate::{InspectError, QueryReport};

/// Render a dispatch walk, one candidate key per line.
pub fn render_info(
    signature: &Signature,
    order: &[Vec<String>],
    config: &Config,
) -> Result<String, InspectError> {
    let rows: Vec<Vec<String>> = order
        .iter()
        .map(|key| qualify(signature, key, config.qualified_names))
        .collect();

    match config.format {
        OutputFormat::Text => Ok(rows
            .iter()
            .map(|row| format!("({})", row.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => to_json(&rows),
    }
}

/// Render the label a call returned.
pub fn render_resolve(
    function: &str,
    types: &[String],
    label: &str,
    config: &Config,
) -> Result<String, InspectError> {
    #[derive(Serialize)]
    struct Resolution<'a> {
        function: &'a str,
        types: &'a [String],
        result: &'a str,
    }

    match config.format {
        OutputFormat::Text => Ok(label.to_string()),
        OutputFormat::Json => to_json(&Resolution {
            function,
            types,
            result: label,
        }),
    }
}

/// Render query reports followed by a summary line.
pub fn render_check(reports: &[QueryReport], config: &Config) -> Result<String, InspectError> {
    if config.format == OutputFormat::Json {
        return to_json(reports);
    }

    let mut lines = Vec::with_capacity(reports.len() + 1);
    for report in reports {
        let call = format!("{}({})", report.function, report.types.join(", "));
        let line = match (&report.expect, report.passed) {
            (_, true) => format!("ok   {call} = {}", report.actual),
            (Some(expect), false) => {
                format!("FAIL {call} = {} (expected {expect})", report.actual)
            }
            (None, false) => format!("FAIL {call}: {}", report.actual),
        };
        lines.push(line);
    }
    let failed = reports.iter().filter(|r| !r.passed).count();
    lines.push(format!(
        "{} passed, {} failed",
        reports.len() - failed,
        failed
    ));
    Ok(lines.join("\n"))
}

/// Render the demonstration table.
pub fn render_demo(table: &[Outcome], config: &Config) -> Result<String, InspectError> {
    match config.format {
        OutputFormat::Text => Ok(table
            .iter()
            .map(|o| {
                let via = o
                    .matched
                    .as_ref()
                    .map_or_else(|| "default".to_string(), |key| key.join(", "));
                format!("{:<10} {:<10} {:>2}  [{via}]", o.first, o.second, o.result)
            })
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => to_json(table),
    }
}

fn qualify(signature: &Signature, key: &[String], qualified: bool) -> Vec<String> {
    if !qualified {
        return key.to_vec();
    }
    signature
        .dispatch_names()
        .zip(key)
        .map(|(param, class)| format!("{param}: {class}"))
        .collect()
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, InspectError> {
    serde_json::to_string_pretty(value).map_err(|err| InspectError::Render(err.to_string()))
}
