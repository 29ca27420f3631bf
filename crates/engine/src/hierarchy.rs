//! Manager-chain walks.
//!
//! A chain is followed upward one `manager_id` at a time. The walk keeps a
//! visited set and never takes more steps than there are employees, so a
//! loop that somehow reached the store cannot hang the caller.

use std::collections::HashSet;

use staffing_core::EmployeeId;
use staffing_storage::Storage;

use crate::error::EngineError;

/// Managers above `start`, nearest first. Empty when `start` has no
/// manager or does not exist.
pub fn manager_chain<S: Storage>(store: &S, start: EmployeeId) -> Result<Vec<EmployeeId>, EngineError> {
    let bound = store.employee_count()?;
    let mut visited = HashSet::from([start]);
    let mut chain = Vec::new();
    let mut current = store.get_employee(start)?.and_then(|e| e.manager_id);

    while let Some(id) = current {
        if !visited.insert(id) || visited.len() as u64 > bound {
            return Err(EngineError::BrokenHierarchy(start));
        }
        chain.push(id);
        current = store.get_employee(id)?.and_then(|e| e.manager_id);
    }
    Ok(chain)
}

/// Fail if making `manager` the manager of `employee` would close a loop.
pub fn ensure_can_manage<S: Storage>(
    store: &S,
    employee: EmployeeId,
    manager: EmployeeId,
) -> Result<(), EngineError> {
    if employee == manager {
        return Err(EngineError::SelfManagement(employee));
    }
    if manager_chain(store, manager)?.contains(&employee) {
        return Err(EngineError::ManagementCycle { employee, manager });
    }
    Ok(())
}
