//! Read-only rows assembled by joining departments, roles and employees.

use serde::{Deserialize, Serialize};

use crate::ids::{EmployeeId, RoleId};
use crate::models::{Department, Role};
use crate::salary::Salary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetail {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub role_title: String,
    pub salary: Salary,
    pub department_name: String,
    /// "First Last" of the manager, `None` when the employee has no manager.
    pub manager_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDetail {
    pub id: RoleId,
    pub title: String,
    pub salary: Salary,
    pub department_name: String,
}

impl RoleDetail {
    pub fn salary_display(&self) -> String {
        self.salary.to_currency()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentOverview {
    pub department: Department,
    pub roles: Vec<Role>,
    pub employee_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub department_count: u64,
    pub employee_count: u64,
    pub departments: Vec<DepartmentOverview>,
}
