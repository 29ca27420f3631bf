//! Derived read-only views joining departments, roles and employees.

use staffing_core::{
    Decimal, DepartmentId, DepartmentOverview, DirectorySummary, Employee, EmployeeDetail,
    EmployeeId, EntityKind, RoleDetail, Salary,
};
use staffing_storage::{DetailFilter, Storage};

use crate::error::EngineError;
use crate::{Directory, hierarchy, require_department, require_employee};

impl Directory {
    /// Every employee with role title, salary, department and manager
    /// name. Employees without a manager have `manager_name: None`.
    pub fn employee_details(&self) -> Result<Vec<EmployeeDetail>, EngineError> {
        Ok(self.storage.tables().employee_details(DetailFilter::All)?)
    }

    pub fn employee_detail(&self, id: EmployeeId) -> Result<EmployeeDetail, EngineError> {
        self.storage
            .tables()
            .employee_details(DetailFilter::Employee(id))?
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::not_found(EntityKind::Employee, id))
    }

    /// Every role with its department name. Use
    /// [`RoleDetail::salary_display`] for the currency form.
    pub fn role_details(&self) -> Result<Vec<RoleDetail>, EngineError> {
        Ok(self.storage.tables().role_details()?)
    }

    /// Empty, not an error, for a department with no roles or employees.
    pub fn employees_by_department(&self, id: DepartmentId) -> Result<Vec<EmployeeDetail>, EngineError> {
        let tables = self.storage.tables();
        require_department(&tables, id)?;
        Ok(tables.employee_details(DetailFilter::Department(id))?)
    }

    pub fn employees_by_manager(&self, id: EmployeeId) -> Result<Vec<EmployeeDetail>, EngineError> {
        let tables = self.storage.tables();
        require_employee(&tables, id, EntityKind::Manager)?;
        Ok(tables.employee_details(DetailFilter::Manager(id))?)
    }

    /// Employees that at least one other employee reports to.
    pub fn managers(&self) -> Result<Vec<Employee>, EngineError> {
        Ok(self.storage.tables().managers()?)
    }

    /// Managers above `id`, nearest first.
    pub fn manager_chain(&self, id: EmployeeId) -> Result<Vec<Employee>, EngineError> {
        let tables = self.storage.tables();
        require_employee(&tables, id, EntityKind::Employee)?;
        hierarchy::manager_chain(&tables, id)?
            .into_iter()
            .map(|manager| require_employee(&tables, manager, EntityKind::Manager))
            .collect()
    }

    /// Total salary of everyone whose role is in the department. Zero when
    /// the department employs nobody.
    pub fn department_budget(&self, id: DepartmentId) -> Result<Decimal, EngineError> {
        let tables = self.storage.tables();
        require_department(&tables, id)?;
        let cents = tables.department_salary_cents(id)?;
        Ok(Salary::from_cents(cents)?.amount())
    }

    /// Department and employee totals, with each department's roles and
    /// headcount.
    pub fn summary(&self) -> Result<DirectorySummary, EngineError> {
        let tables = self.storage.tables();
        let departments = tables.list_departments()?;
        let employee_count = tables.employee_count()?;

        let mut overviews = Vec::with_capacity(departments.len());
        for department in departments {
            let roles = tables.roles_by_department(department.id)?;
            let headcount = tables.department_headcount(department.id)?;
            overviews.push(DepartmentOverview {
                department,
                roles,
                employee_count: headcount,
            });
        }

        Ok(DirectorySummary {
            department_count: overviews.len() as u64,
            employee_count,
            departments: overviews,
        })
    }
}
