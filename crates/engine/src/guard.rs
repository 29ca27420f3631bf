//! Delete operations and the checks that stand in front of them.
//!
//! Every delete first looks for dependent rows. A department with roles,
//! or a role with employees, is blocked until the caller supplies a
//! resolution; employees are never blocked, their subordinates are
//! released instead.
//!
//! A resolution and the delete it unblocks run in one transaction. If any
//! step fails (a missing replacement role, a store error) nothing from
//! the flow is kept.

use std::collections::BTreeMap;

use staffing_core::{Department, DepartmentId, Employee, EmployeeId, EntityKind, Role, RoleId};
use staffing_storage::Storage;

use crate::error::EngineError;
use crate::{Directory, require_department, require_employee, require_role};

/// Result of checking a delete without performing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteCheck<D> {
    Permitted,
    Blocked(Vec<D>),
}

impl<D> DeleteCheck<D> {
    fn from_dependents(dependents: Vec<D>) -> Self {
        if dependents.is_empty() {
            Self::Permitted
        } else {
            Self::Blocked(dependents)
        }
    }

    pub fn state(&self) -> GuardState {
        match self {
            Self::Permitted => GuardState::Permitted,
            Self::Blocked(_) => GuardState::Blocked,
        }
    }

    pub fn is_permitted(&self) -> bool {
        matches!(self, Self::Permitted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardState {
    /// No dependents; the row was deleted directly.
    #[default]
    Permitted,
    /// Dependents exist and no resolution was supplied.
    Blocked,
    /// Dependents were reassigned or removed, then the row was deleted.
    Resolved,
}

/// How to clear the employees that still hold a role being deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleResolution {
    /// Give each dependent the role mapped to it. Every dependent needs an
    /// entry; extra entries are ignored.
    Reassign(BTreeMap<EmployeeId, RoleId>),
    /// Give every dependent the same role.
    ReassignAll(RoleId),
    /// Delete every dependent, releasing anyone they manage.
    Cascade,
}

/// How to clear the roles that still belong to a department being deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepartmentResolution {
    /// Move every role to another department.
    ReassignRoles(DepartmentId),
    /// Delete every role, clearing each role's employees with the given
    /// resolution first.
    DeleteRoles(RoleResolution),
}

/// What a delete did to reach its final state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub state: GuardState,
    pub reassigned_employees: Vec<EmployeeId>,
    pub removed_employees: Vec<EmployeeId>,
    /// Employees whose manager reference was cleared because their
    /// manager was removed.
    pub released_employees: Vec<EmployeeId>,
    pub reassigned_roles: Vec<RoleId>,
    pub removed_roles: Vec<RoleId>,
}

impl Directory {
    pub fn check_department_delete(&self, id: DepartmentId) -> Result<DeleteCheck<RoleId>, EngineError> {
        let tables = self.storage.tables();
        require_department(&tables, id)?;
        let roles = tables.roles_by_department(id)?;
        let check = DeleteCheck::from_dependents(roles.iter().map(|r| r.id).collect());
        tracing::debug!(department_id = %id, state = ?check.state(), "checked department delete");
        Ok(check)
    }

    pub fn check_role_delete(&self, id: RoleId) -> Result<DeleteCheck<EmployeeId>, EngineError> {
        let tables = self.storage.tables();
        require_role(&tables, id)?;
        let employees = tables.employees_by_role(id)?;
        let check = DeleteCheck::from_dependents(employees.iter().map(|e| e.id).collect());
        tracing::debug!(role_id = %id, state = ?check.state(), "checked role delete");
        Ok(check)
    }

    /// Delete a department that has no roles.
    pub fn delete_department(&mut self, id: DepartmentId) -> Result<Department, EngineError> {
        let department = self.storage.transaction(|tables| -> Result<_, EngineError> {
            let department = require_department(tables, id)?;
            let roles = tables.roles_by_department(id)?;
            if !roles.is_empty() {
                return Err(EngineError::DepartmentHasRoles {
                    department: id,
                    roles: roles.iter().map(|r| r.id).collect(),
                });
            }
            tables.delete_department(id)?;
            Ok(department)
        });
        match &department {
            Ok(_) => tracing::info!(department_id = %id, "deleted department"),
            Err(e @ EngineError::DepartmentHasRoles { .. }) => {
                tracing::warn!(department_id = %id, "department delete blocked: {e}");
            }
            Err(_) => {}
        }
        department
    }

    /// Delete a role that no employee holds.
    pub fn delete_role(&mut self, id: RoleId) -> Result<Role, EngineError> {
        let role = self.storage.transaction(|tables| -> Result<_, EngineError> {
            let role = require_role(tables, id)?;
            let employees = tables.employees_by_role(id)?;
            if !employees.is_empty() {
                return Err(EngineError::RoleHasEmployees {
                    role: id,
                    employees: employees.iter().map(|e| e.id).collect(),
                });
            }
            tables.delete_role(id)?;
            Ok(role)
        });
        match &role {
            Ok(_) => tracing::info!(role_id = %id, "deleted role"),
            Err(e @ EngineError::RoleHasEmployees { .. }) => {
                tracing::warn!(role_id = %id, "role delete blocked: {e}");
            }
            Err(_) => {}
        }
        role
    }

    /// Delete an employee. Anyone they managed is kept, with the manager
    /// reference cleared in the same transaction.
    pub fn delete_employee(&mut self, id: EmployeeId) -> Result<Employee, EngineError> {
        let (employee, released) = self
            .storage
            .transaction(|tables| remove_employee(tables, id))?;
        tracing::info!(employee_id = %id, released = released.len(), "deleted employee");
        Ok(employee)
    }

    /// Delete a role, clearing its employees with `resolution` first.
    pub fn delete_role_with(
        &mut self,
        id: RoleId,
        resolution: &RoleResolution,
    ) -> Result<DeletionReport, EngineError> {
        let report = self.storage.transaction(|tables| -> Result<_, EngineError> {
            require_role(tables, id)?;
            let mut report = DeletionReport::default();
            let employees = tables.employees_by_role(id)?;
            if !employees.is_empty() {
                resolve_employees(tables, &employees, resolution, &[id], &mut report)?;
                report.state = GuardState::Resolved;
            }
            tables.delete_role(id)?;
            report.removed_roles.push(id);
            Ok(report)
        })?;
        tracing::info!(
            role_id = %id,
            state = ?report.state,
            reassigned = report.reassigned_employees.len(),
            removed = report.removed_employees.len(),
            "deleted role"
        );
        Ok(report)
    }

    /// Delete a department, clearing its roles with `resolution` first.
    pub fn delete_department_with(
        &mut self,
        id: DepartmentId,
        resolution: &DepartmentResolution,
    ) -> Result<DeletionReport, EngineError> {
        let report = self.storage.transaction(|tables| -> Result<_, EngineError> {
            require_department(tables, id)?;
            let mut report = DeletionReport::default();
            let roles = tables.roles_by_department(id)?;

            if !roles.is_empty() {
                match resolution {
                    DepartmentResolution::ReassignRoles(target) => {
                        if *target == id {
                            return Err(EngineError::ReassignToDeletedDepartment(id));
                        }
                        require_department(tables, *target)?;
                        for mut role in roles {
                            role.department_id = *target;
                            tables.update_role(&role)?;
                            report.reassigned_roles.push(role.id);
                        }
                    }
                    DepartmentResolution::DeleteRoles(role_resolution) => {
                        let doomed: Vec<RoleId> = roles.iter().map(|r| r.id).collect();
                        for role in &roles {
                            let employees = tables.employees_by_role(role.id)?;
                            resolve_employees(tables, &employees, role_resolution, &doomed, &mut report)?;
                            tables.delete_role(role.id)?;
                            report.removed_roles.push(role.id);
                        }
                    }
                }
                report.state = GuardState::Resolved;
            }

            tables.delete_department(id)?;
            Ok(report)
        })?;
        tracing::info!(
            department_id = %id,
            state = ?report.state,
            reassigned_roles = report.reassigned_roles.len(),
            removed_roles = report.removed_roles.len(),
            "deleted department"
        );
        Ok(report)
    }
}

/// Clear `employees` off their role. `doomed` lists roles being deleted in
/// the same flow, which are not valid reassignment targets.
fn resolve_employees<S: Storage>(
    store: &S,
    employees: &[Employee],
    resolution: &RoleResolution,
    doomed: &[RoleId],
    report: &mut DeletionReport,
) -> Result<(), EngineError> {
    for employee in employees {
        match resolution {
            RoleResolution::Cascade => {
                let (_, released) = remove_employee(store, employee.id)?;
                report.removed_employees.push(employee.id);
                report.released_employees.extend(released);
            }
            RoleResolution::ReassignAll(target) => {
                reassign_employee(store, employee.id, *target, doomed)?;
                report.reassigned_employees.push(employee.id);
            }
            RoleResolution::Reassign(targets) => {
                let target = targets
                    .get(&employee.id)
                    .ok_or(EngineError::UnresolvedDependent(employee.id))?;
                reassign_employee(store, employee.id, *target, doomed)?;
                report.reassigned_employees.push(employee.id);
            }
        }
    }
    Ok(())
}

fn reassign_employee<S: Storage>(
    store: &S,
    id: EmployeeId,
    target: RoleId,
    doomed: &[RoleId],
) -> Result<(), EngineError> {
    if doomed.contains(&target) {
        return Err(EngineError::ReassignToDeletedRole(target));
    }
    require_role(store, target)?;
    // Re-read: an earlier step in the flow may have cleared this row's manager.
    let mut employee = require_employee(store, id, EntityKind::Employee)?;
    employee.role_id = target;
    store.update_employee(&employee)?;
    Ok(())
}

/// Release everyone `id` manages, then delete `id`. Returns the removed
/// row and the released subordinates.
fn remove_employee<S: Storage>(store: &S, id: EmployeeId) -> Result<(Employee, Vec<EmployeeId>), EngineError> {
    let employee = require_employee(store, id, EntityKind::Employee)?;
    let released: Vec<EmployeeId> = store.subordinates(id)?.iter().map(|e| e.id).collect();
    store.clear_manager(id)?;
    store.delete_employee(id)?;
    Ok((employee, released))
}
