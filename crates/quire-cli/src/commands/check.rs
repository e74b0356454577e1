//! Check command - decide a single request.

use anyhow::Context;
use quire_authz::{DecisionEngine, Evaluation, classify_named};
use quire_core::{Decision, Operation, Requester, ResourcePath};
use serde::Serialize;

use crate::formatter::OutputFormat;
use crate::theme::Theme;

#[derive(Serialize)]
struct CheckReport<'a> {
    requester: &'a Requester,
    path: &'a ResourcePath,
    operation: Operation,
    #[serde(flatten)]
    evaluation: &'a Evaluation,
}

/// Evaluate one request and print the decision with its reason.
pub(crate) async fn run_check(
    engine: &DecisionEngine,
    requester: &Requester,
    path: &str,
    operation: &str,
    format: OutputFormat,
) -> anyhow::Result<Decision> {
    let path = ResourcePath::parse(path).with_context(|| format!("invalid path '{path}'"))?;
    let (operation, _) = classify_named(operation)?;
    let evaluation = engine.evaluate(requester, &path, operation).await?;

    match format {
        OutputFormat::Json => {
            let report = CheckReport {
                requester,
                path: &path,
                operation,
                evaluation: &evaluation,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
        OutputFormat::Pretty => {
            println!(
                "{} {operation} {path} {}",
                Theme::decision(evaluation.decision),
                Theme::dimmed(&format!("as {requester}"))
            );
            println!("  {}", evaluation.reason);
        },
    }
    Ok(evaluation.decision)
}
