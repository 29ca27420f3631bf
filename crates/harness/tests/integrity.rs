use std::collections::BTreeMap;

use staffing_core::{DepartmentId, EmployeeId, RoleId};
use staffing_engine::{
    DeleteCheck, DepartmentResolution, EngineError, ErrorKind, GuardState, RoleResolution,
};
use staffing_harness::TestDirectory;

// ============================================================================
// Checks and plain deletes
// ============================================================================

#[test]
fn role_with_employees_is_blocked() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let check = fx.directory.check_role_delete(org.engineer.id)?;
    assert_eq!(check, DeleteCheck::Blocked(vec![org.ada.id, org.alan.id]));
    assert_eq!(check.state(), GuardState::Blocked);

    let err = fx.directory.delete_role(org.engineer.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    match err {
        EngineError::RoleHasEmployees { role, employees } => {
            assert_eq!(role, org.engineer.id);
            assert_eq!(employees, vec![org.ada.id, org.alan.id]);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(fx.directory.role(org.engineer.id)?, org.engineer);
    assert_eq!(fx.directory.employee(org.ada.id)?.role_id, org.engineer.id);
    Ok(())
}

#[test]
fn unheld_role_deletes_directly() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    let clerk = fx.role("Clerk", 40_000, org.legal.id)?;

    assert!(fx.directory.check_role_delete(clerk.id)?.is_permitted());
    let removed = fx.directory.delete_role(clerk.id)?;
    assert_eq!(removed, clerk);
    assert!(fx.directory.list_roles()?.iter().all(|r| r.id != clerk.id));
    Ok(())
}

#[test]
fn department_with_roles_is_blocked() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let check = fx.directory.check_department_delete(org.engineering.id)?;
    assert_eq!(check, DeleteCheck::Blocked(vec![org.lead.id, org.engineer.id]));

    let err = fx.directory.delete_department(org.engineering.id).unwrap_err();
    assert!(matches!(err, EngineError::DepartmentHasRoles { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(fx.directory.department(org.engineering.id)?, org.engineering);
    Ok(())
}

#[test]
fn empty_department_deletes_directly() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    assert_eq!(
        fx.directory.check_department_delete(org.legal.id)?.state(),
        GuardState::Permitted
    );
    fx.directory.delete_department(org.legal.id)?;

    let names: Vec<String> = fx
        .directory
        .list_departments()?
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Engineering", "Sales"]);
    Ok(())
}

#[test]
fn deleting_missing_rows_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, _) = TestDirectory::seeded()?;
    let missing_dept = DepartmentId::new(404);
    let missing_role = RoleId::new(404);
    let missing_employee = EmployeeId::new(404);

    for err in [
        fx.directory.check_department_delete(missing_dept).unwrap_err(),
        fx.directory.delete_department(missing_dept).map(|_| ()).unwrap_err(),
        fx.directory
            .delete_department_with(missing_dept, &DepartmentResolution::DeleteRoles(RoleResolution::Cascade))
            .map(|_| ())
            .unwrap_err(),
        fx.directory.check_role_delete(missing_role).map(|_| ()).unwrap_err(),
        fx.directory.delete_role(missing_role).map(|_| ()).unwrap_err(),
        fx.directory
            .delete_role_with(missing_role, &RoleResolution::Cascade)
            .map(|_| ())
            .unwrap_err(),
        fx.directory.delete_employee(missing_employee).map(|_| ()).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::NotFound, "{err}");
    }
    Ok(())
}

// ============================================================================
// Employees
// ============================================================================

#[test]
fn deleting_manager_releases_subordinates() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let removed = fx.directory.delete_employee(org.grace.id)?;
    assert_eq!(removed, org.grace);

    assert_eq!(fx.directory.employee(org.ada.id)?.manager_id, None);
    assert_eq!(fx.directory.employee(org.alan.id)?.manager_id, None);
    assert_eq!(fx.directory.employee(org.tom.id)?.manager_id, Some(org.susan.id));
    assert_eq!(
        fx.directory.employee(org.grace.id).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    // The role itself is untouched by an employee delete.
    assert!(fx.directory.check_role_delete(org.lead.id)?.is_permitted());
    Ok(())
}

// ============================================================================
// Role resolutions
// ============================================================================

#[test]
fn reassign_all_then_delete_role() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let report = fx
        .directory
        .delete_role_with(org.engineer.id, &RoleResolution::ReassignAll(org.lead.id))?;
    assert_eq!(report.state, GuardState::Resolved);
    assert_eq!(report.reassigned_employees, vec![org.ada.id, org.alan.id]);
    assert!(report.removed_employees.is_empty());
    assert_eq!(report.removed_roles, vec![org.engineer.id]);

    let ada = fx.directory.employee(org.ada.id)?;
    assert_eq!(ada.role_id, org.lead.id);
    assert_eq!(ada.manager_id, Some(org.grace.id));
    assert_eq!(fx.directory.role(org.engineer.id).unwrap_err().kind(), ErrorKind::NotFound);
    Ok(())
}

#[test]
fn per_employee_reassignment() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    let targets = BTreeMap::from([
        (org.ada.id, org.lead.id),
        (org.alan.id, org.salesperson.id),
        // Not a dependent of the role: ignored.
        (org.tom.id, org.lead.id),
    ]);

    let report = fx
        .directory
        .delete_role_with(org.engineer.id, &RoleResolution::Reassign(targets))?;
    assert_eq!(report.reassigned_employees, vec![org.ada.id, org.alan.id]);

    assert_eq!(fx.directory.employee(org.ada.id)?.role_id, org.lead.id);
    assert_eq!(fx.directory.employee(org.alan.id)?.role_id, org.salesperson.id);
    assert_eq!(fx.directory.employee(org.tom.id)?.role_id, org.salesperson.id);
    Ok(())
}

#[test]
fn unresolved_dependent_rolls_back_everything() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    // Ada is resolved before Alan fails.
    let targets = BTreeMap::from([(org.ada.id, org.lead.id)]);

    let err = fx
        .directory
        .delete_role_with(org.engineer.id, &RoleResolution::Reassign(targets))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnresolvedDependent(id) if id == org.alan.id));
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert_eq!(fx.directory.employee(org.ada.id)?.role_id, org.engineer.id);
    assert_eq!(fx.directory.role(org.engineer.id)?, org.engineer);
    Ok(())
}

#[test]
fn reassigning_onto_the_deleted_role_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    let err = fx
        .directory
        .delete_role_with(org.engineer.id, &RoleResolution::ReassignAll(org.engineer.id))
        .unwrap_err();
    assert!(matches!(err, EngineError::ReassignToDeletedRole(id) if id == org.engineer.id));
    assert_eq!(fx.directory.role(org.engineer.id)?, org.engineer);
    Ok(())
}

#[test]
fn reassigning_onto_missing_role_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    let err = fx
        .directory
        .delete_role_with(org.engineer.id, &RoleResolution::ReassignAll(RoleId::new(404)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(fx.directory.employees_by_role(org.engineer.id)?.len(), 2);
    Ok(())
}

#[test]
fn cascade_removes_holders_and_releases_their_reports() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let report = fx
        .directory
        .delete_role_with(org.lead.id, &RoleResolution::Cascade)?;
    assert_eq!(report.state, GuardState::Resolved);
    assert_eq!(report.removed_employees, vec![org.grace.id]);
    assert_eq!(report.released_employees, vec![org.ada.id, org.alan.id]);

    let remaining: Vec<EmployeeId> = fx.directory.list_employees()?.iter().map(|e| e.id).collect();
    assert_eq!(remaining, vec![org.ada.id, org.alan.id, org.susan.id, org.tom.id]);
    assert_eq!(fx.directory.employee(org.ada.id)?.manager_id, None);
    Ok(())
}

#[test]
fn resolution_on_unheld_role_is_a_plain_delete() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    let clerk = fx.role("Clerk", 40_000, org.legal.id)?;

    let report = fx.directory.delete_role_with(clerk.id, &RoleResolution::Cascade)?;
    assert_eq!(report.state, GuardState::Permitted);
    assert!(report.removed_employees.is_empty());
    assert_eq!(report.removed_roles, vec![clerk.id]);
    Ok(())
}

// ============================================================================
// Department resolutions
// ============================================================================

#[test]
fn move_roles_then_delete_department() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let report = fx
        .directory
        .delete_department_with(org.sales.id, &DepartmentResolution::ReassignRoles(org.legal.id))?;
    assert_eq!(report.state, GuardState::Resolved);
    assert_eq!(report.reassigned_roles, vec![org.sales_manager.id, org.salesperson.id]);
    assert!(report.removed_roles.is_empty());

    assert_eq!(fx.directory.role(org.salesperson.id)?.department_id, org.legal.id);
    assert_eq!(fx.directory.employee(org.tom.id)?, org.tom);
    assert_eq!(fx.directory.department(org.sales.id).unwrap_err().kind(), ErrorKind::NotFound);
    Ok(())
}

#[test]
fn moving_roles_onto_the_deleted_department_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;
    let err = fx
        .directory
        .delete_department_with(org.sales.id, &DepartmentResolution::ReassignRoles(org.sales.id))
        .unwrap_err();
    assert!(matches!(err, EngineError::ReassignToDeletedDepartment(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(fx.directory.department(org.sales.id)?, org.sales);
    Ok(())
}

#[test]
fn cascade_department_removes_roles_and_staff() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let report = fx.directory.delete_department_with(
        org.engineering.id,
        &DepartmentResolution::DeleteRoles(RoleResolution::Cascade),
    )?;
    assert_eq!(report.removed_roles, vec![org.lead.id, org.engineer.id]);
    assert_eq!(report.removed_employees, vec![org.grace.id, org.ada.id, org.alan.id]);

    let remaining: Vec<EmployeeId> = fx.directory.list_employees()?.iter().map(|e| e.id).collect();
    assert_eq!(remaining, vec![org.susan.id, org.tom.id]);
    let roles: Vec<RoleId> = fx.directory.list_roles()?.iter().map(|r| r.id).collect();
    assert_eq!(roles, vec![org.sales_manager.id, org.salesperson.id]);
    Ok(())
}

#[test]
fn delete_roles_reassigning_staff_elsewhere() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let report = fx.directory.delete_department_with(
        org.engineering.id,
        &DepartmentResolution::DeleteRoles(RoleResolution::ReassignAll(org.salesperson.id)),
    )?;
    assert_eq!(report.reassigned_employees, vec![org.grace.id, org.ada.id, org.alan.id]);

    let holders: Vec<EmployeeId> = fx
        .directory
        .employees_by_role(org.salesperson.id)?
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(holders, vec![org.grace.id, org.ada.id, org.alan.id, org.tom.id]);
    assert_eq!(fx.directory.employee(org.ada.id)?.manager_id, Some(org.grace.id));
    Ok(())
}

#[test]
fn reassigning_onto_a_sibling_role_rolls_back() -> Result<(), Box<dyn std::error::Error>> {
    let (mut fx, org) = TestDirectory::seeded()?;

    let err = fx
        .directory
        .delete_department_with(
            org.engineering.id,
            &DepartmentResolution::DeleteRoles(RoleResolution::ReassignAll(org.engineer.id)),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::ReassignToDeletedRole(id) if id == org.engineer.id));

    assert_eq!(fx.directory.department(org.engineering.id)?, org.engineering);
    assert_eq!(fx.directory.role(org.lead.id)?, org.lead);
    assert_eq!(fx.directory.employee(org.grace.id)?, org.grace);
    Ok(())
}
