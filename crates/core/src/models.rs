use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::{DepartmentId, EmployeeId, RoleId};
use crate::salary::Salary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub title: String,
    pub salary: Salary,
    pub department_id: DepartmentId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
    pub manager_id: Option<EmployeeId>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub title: String,
    pub salary: Salary,
    pub department_id: DepartmentId,
}

impl NewRole {
    pub fn new(title: impl Into<String>, salary: Salary, department_id: DepartmentId) -> Self {
        Self {
            title: title.into(),
            salary,
            department_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: RoleId,
    pub manager_id: Option<EmployeeId>,
}

impl NewEmployee {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, role_id: RoleId) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            role_id,
            manager_id: None,
        }
    }

    pub fn with_manager(mut self, manager_id: EmployeeId) -> Self {
        self.manager_id = Some(manager_id);
        self
    }
}

/// Partial update of a role. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    pub title: Option<String>,
    pub salary: Option<Salary>,
    pub department_id: Option<DepartmentId>,
}

impl RoleUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.salary.is_none() && self.department_id.is_none()
    }
}

/// Partial update of an employee.
///
/// `manager_id` is tri-state: `None` keeps the current manager,
/// `Some(None)` clears it and `Some(Some(id))` assigns a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmployeeUpdate {
    pub role_id: Option<RoleId>,
    pub manager_id: Option<Option<EmployeeId>>,
}

impl EmployeeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, role_id: RoleId) -> Self {
        self.role_id = Some(role_id);
        self
    }

    pub fn manager(mut self, manager_id: EmployeeId) -> Self {
        self.manager_id = Some(Some(manager_id));
        self
    }

    pub fn clear_manager(mut self) -> Self {
        self.manager_id = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.role_id.is_none() && self.manager_id.is_none()
    }
}

/// Trim `value` and reject it if nothing is left.
pub fn required_text(field: &'static str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::EmptyField(field));
    }
    Ok(trimmed.to_string())
}
