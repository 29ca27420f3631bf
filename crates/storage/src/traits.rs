use staffing_core::{
    Department, DepartmentId, Employee, EmployeeDetail, EmployeeId, NewEmployee, NewRole, Role,
    RoleDetail, RoleId,
};

use crate::error::StorageError;

/// Which employees an employee-detail query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFilter {
    All,
    Employee(EmployeeId),
    Department(DepartmentId),
    Manager(EmployeeId),
}

/// Row-level primitives over the department/role/employee relations.
///
/// Writes take `&self` because implementations run against a borrowed
/// connection or an open transaction; grouping writes atomically is the
/// caller's job. Nothing here enforces cross-row rules beyond what the
/// schema itself rejects.
pub trait Storage {
    // Departments

    fn list_departments(&self) -> Result<Vec<Department>, StorageError>;

    fn get_department(&self, id: DepartmentId) -> Result<Option<Department>, StorageError>;

    fn find_department_by_name(&self, name: &str) -> Result<Option<Department>, StorageError>;

    fn insert_department(&self, name: &str) -> Result<Department, StorageError>;

    fn delete_department(&self, id: DepartmentId) -> Result<bool, StorageError>;

    // Roles

    fn list_roles(&self) -> Result<Vec<Role>, StorageError>;

    fn get_role(&self, id: RoleId) -> Result<Option<Role>, StorageError>;

    fn roles_by_department(&self, department_id: DepartmentId) -> Result<Vec<Role>, StorageError>;

    fn insert_role(&self, role: &NewRole) -> Result<Role, StorageError>;

    /// Overwrite every column of an existing role.
    fn update_role(&self, role: &Role) -> Result<bool, StorageError>;

    fn delete_role(&self, id: RoleId) -> Result<bool, StorageError>;

    // Employees

    fn list_employees(&self) -> Result<Vec<Employee>, StorageError>;

    fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError>;

    fn employees_by_role(&self, role_id: RoleId) -> Result<Vec<Employee>, StorageError>;

    fn subordinates(&self, manager_id: EmployeeId) -> Result<Vec<Employee>, StorageError>;

    fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, StorageError>;

    /// Overwrite every column of an existing employee.
    fn update_employee(&self, employee: &Employee) -> Result<bool, StorageError>;

    /// Null out `manager_id` on every employee reporting to `manager_id`.
    /// Returns the number of rows changed.
    fn clear_manager(&self, manager_id: EmployeeId) -> Result<usize, StorageError>;

    fn delete_employee(&self, id: EmployeeId) -> Result<bool, StorageError>;

    fn employee_count(&self) -> Result<u64, StorageError>;

    // Joined reads

    fn employee_details(&self, filter: DetailFilter) -> Result<Vec<EmployeeDetail>, StorageError>;

    fn role_details(&self) -> Result<Vec<RoleDetail>, StorageError>;

    /// Employees referenced as `manager_id` by at least one other row.
    fn managers(&self) -> Result<Vec<Employee>, StorageError>;

    /// Sum of salary cents over employees whose role is in the department.
    /// Zero when nobody is employed there.
    fn department_salary_cents(&self, department_id: DepartmentId) -> Result<i64, StorageError>;

    fn department_headcount(&self, department_id: DepartmentId) -> Result<u64, StorageError>;
}
