//! Matrix command - decide every operation on every resource.

use quire_authz::{DecisionEngine, MemoryRepository};
use quire_core::{Decision, Operation, Requester, ResourceKind, ResourcePath};
use serde::Serialize;

use crate::formatter::OutputFormat;
use crate::theme::Theme;

/// Width of each operation column; fits `CREATE_DATASTREAM`.
const COLUMN: usize = 17;

/// Width of a rendered decision label.
const LABEL: usize = 5;

#[derive(Debug, Serialize)]
pub(crate) struct MatrixCell {
    pub(crate) operation: Operation,
    pub(crate) decision: Decision,
}

#[derive(Debug, Serialize)]
pub(crate) struct MatrixRow {
    pub(crate) path: ResourcePath,
    pub(crate) kind: ResourceKind,
    pub(crate) open: bool,
    pub(crate) decisions: Vec<MatrixCell>,
}

impl MatrixRow {
    fn decision(&self, operation: Operation) -> Option<Decision> {
        self.decisions
            .iter()
            .find(|cell| cell.operation == operation)
            .map(|cell| cell.decision)
    }
}

/// Evaluate every operation on every resource of `repo`, in path order.
pub(crate) async fn build_matrix(
    engine: &DecisionEngine,
    repo: &MemoryRepository,
    requester: &Requester,
) -> anyhow::Result<Vec<MatrixRow>> {
    let mut rows = Vec::new();
    for resource in repo.resources() {
        let mut decisions = Vec::with_capacity(Operation::ALL.len());
        for operation in Operation::ALL {
            let evaluation = engine
                .evaluate_resource(requester, &resource, operation)
                .await?;
            decisions.push(MatrixCell {
                operation,
                decision: evaluation.decision,
            });
        }
        rows.push(MatrixRow {
            path: resource.path,
            kind: resource.kind,
            open: resource.open,
            decisions,
        });
    }
    Ok(rows)
}

/// Print the decision matrix for `requester`.
pub(crate) async fn run_matrix(
    engine: &DecisionEngine,
    repo: &MemoryRepository,
    requester: &Requester,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rows = build_matrix(engine, repo, requester).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "\n{}",
        Theme::header(&format!("Decisions for {requester}"))
    );
    let width = rows
        .iter()
        .map(|row| row.path.as_str().chars().count())
        .max()
        .unwrap_or_default()
        .max(4);
    let mut heading = format!("{:width$}", "PATH");
    for operation in Operation::ALL {
        heading.push_str(&format!("  {:<COLUMN$}", operation.as_str()));
    }
    println!("{}", Theme::dimmed(&heading));
    println!("{}", Theme::separator());

    for row in &rows {
        let mut line = format!("{:width$}", row.path.as_str());
        for operation in Operation::ALL {
            let cell = row
                .decision(operation)
                .map_or_else(|| "-".to_owned(), Theme::decision);
            line.push_str("  ");
            line.push_str(&cell);
            // ANSI codes break `{:<w$}`, so pad by hand.
            line.push_str(&" ".repeat(COLUMN.saturating_sub(LABEL)));
        }
        println!("{}", line.trim_end());
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_test::{test_anonymous, test_engine, test_path, test_reader, test_roles_repository};

    #[tokio::test]
    async fn test_matrix_covers_every_cell() {
        let repo = test_roles_repository();
        let engine = test_engine(&repo);
        let rows = build_matrix(&engine, &repo, &test_reader()).await.unwrap();

        assert_eq!(rows.len(), repo.len());
        assert!(rows.iter().all(|r| r.decisions.len() == Operation::ALL.len()));
        assert_eq!(rows[0].path, ResourcePath::root());

        let row = rows
            .iter()
            .find(|r| r.path == test_path("/testparent1/testchild2WithACL/tsc2_data"))
            .unwrap();
        assert!(
            row.decisions
                .iter()
                .all(|cell| cell.decision == Decision::Deny)
        );
    }

    #[tokio::test]
    async fn test_anonymous_only_reads_open_resources() {
        let repo = test_roles_repository();
        let engine = test_engine(&repo);
        let rows = build_matrix(&engine, &repo, &test_anonymous()).await.unwrap();

        for row in rows {
            assert_eq!(
                row.decision(Operation::Read),
                Some(Decision::from_bool(row.open)),
                "{}",
                row.path
            );
            assert!(
                Operation::ALL
                    .into_iter()
                    .filter(|op| !op.is_read())
                    .all(|op| row.decision(op) == Some(Decision::Deny))
            );
        }
    }
}
