//! Operation classification: the minimum role each operation requires.

use quire_core::{Operation, Role};

use crate::error::{AuthzError, AuthzResult};

/// The minimum role required to perform `op`.
///
/// | Operation | Role |
/// |---|---|
/// | `READ` | reader |
/// | `CREATE_CHILD` | writer |
/// | `CREATE_DATASTREAM` | writer |
/// | `UPDATE_DATASTREAM` | writer |
/// | `DELETE` | admin |
/// | `ADD_ACL` | admin |
///
/// The open-read bypass for `READ` is applied by the engine, not here.
#[must_use]
pub const fn required_role(op: Operation) -> Role {
    match op {
        Operation::Read => Role::Reader,
        Operation::CreateChild | Operation::CreateDatastream | Operation::UpdateDatastream => {
            Role::Writer
        },
        Operation::Delete | Operation::AddAcl => Role::Admin,
    }
}

/// Resolve an operation by its wire name.
///
/// # Errors
///
/// Returns [`AuthzError::UnknownOperation`] if `name` is not in the table.
/// This is an integration bug and is never mapped to a role.
pub fn classify_named(name: &str) -> AuthzResult<(Operation, Role)> {
    let op = name
        .parse::<Operation>()
        .map_err(|_| AuthzError::UnknownOperation(name.to_string()))?;
    Ok((op, required_role(op)))
}
