pub mod aggregate;
pub mod error;
pub mod guard;
pub mod hierarchy;

pub use error::{EngineError, ErrorKind};
pub use guard::{DeleteCheck, DeletionReport, DepartmentResolution, GuardState, RoleResolution};

use staffing_core::{
    Decimal, Department, DepartmentId, Employee, EmployeeId, EmployeeUpdate, EntityKind,
    NewEmployee, NewRole, Role, RoleId, RoleUpdate, Salary, required_text,
};
use staffing_storage::{SqliteStorage, Storage, StoreConfig};

/// Entry point for every read and write against the staffing store.
///
/// Each mutating call runs in its own store transaction: the checks it
/// performs and the rows it writes either all land or none do.
pub struct Directory {
    storage: SqliteStorage,
}

impl Directory {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    pub fn open(config: &StoreConfig) -> Result<Self, EngineError> {
        Ok(Self::new(SqliteStorage::open_with(config)?))
    }

    pub fn open_in_memory() -> Result<Self, EngineError> {
        Ok(Self::new(SqliteStorage::open_in_memory()?))
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut SqliteStorage {
        &mut self.storage
    }

    // ========================================================================
    // Listing and lookup
    // ========================================================================

    pub fn list_departments(&self) -> Result<Vec<Department>, EngineError> {
        Ok(self.storage.tables().list_departments()?)
    }

    pub fn list_roles(&self) -> Result<Vec<Role>, EngineError> {
        Ok(self.storage.tables().list_roles()?)
    }

    pub fn list_employees(&self) -> Result<Vec<Employee>, EngineError> {
        Ok(self.storage.tables().list_employees()?)
    }

    pub fn department(&self, id: DepartmentId) -> Result<Department, EngineError> {
        require_department(&self.storage.tables(), id)
    }

    pub fn role(&self, id: RoleId) -> Result<Role, EngineError> {
        require_role(&self.storage.tables(), id)
    }

    pub fn employee(&self, id: EmployeeId) -> Result<Employee, EngineError> {
        require_employee(&self.storage.tables(), id, EntityKind::Employee)
    }

    pub fn employees_by_role(&self, id: RoleId) -> Result<Vec<Employee>, EngineError> {
        let tables = self.storage.tables();
        require_role(&tables, id)?;
        Ok(tables.employees_by_role(id)?)
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a department. Names are trimmed and must be unique.
    pub fn create_department(&mut self, name: &str) -> Result<Department, EngineError> {
        let name = required_text("department name", name)?;
        let department = self.storage.transaction(|tables| -> Result<_, EngineError> {
            if tables.find_department_by_name(&name)?.is_some() {
                return Err(EngineError::DuplicateDepartment(name.clone()));
            }
            Ok(tables.insert_department(&name)?)
        })?;
        tracing::info!(department_id = %department.id, name = %department.name, "created department");
        Ok(department)
    }

    /// Create a role in an existing department.
    pub fn create_role(
        &mut self,
        title: &str,
        salary: Decimal,
        department_id: DepartmentId,
    ) -> Result<Role, EngineError> {
        let new_role = NewRole::new(required_text("role title", title)?, Salary::new(salary)?, department_id);
        let role = self.storage.transaction(|tables| -> Result<_, EngineError> {
            require_department(tables, department_id)?;
            Ok(tables.insert_role(&new_role)?)
        })?;
        tracing::info!(role_id = %role.id, department_id = %department_id, title = %role.title, "created role");
        Ok(role)
    }

    /// Create an employee holding an existing role, optionally reporting to
    /// an existing employee.
    ///
    /// The new row's id is generated by the store, so it cannot already be
    /// named as its own manager and no chain walk is needed here.
    pub fn create_employee(
        &mut self,
        first_name: &str,
        last_name: &str,
        role_id: RoleId,
        manager_id: Option<EmployeeId>,
    ) -> Result<Employee, EngineError> {
        let mut new_employee = NewEmployee::new(
            required_text("first name", first_name)?,
            required_text("last name", last_name)?,
            role_id,
        );
        new_employee.manager_id = manager_id;

        let employee = self.storage.transaction(|tables| -> Result<_, EngineError> {
            require_role(tables, role_id)?;
            if let Some(manager_id) = manager_id {
                require_employee(tables, manager_id, EntityKind::Manager)?;
            }
            Ok(tables.insert_employee(&new_employee)?)
        })?;
        tracing::info!(
            employee_id = %employee.id,
            role_id = %role_id,
            manager_id = ?manager_id,
            "created employee"
        );
        Ok(employee)
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Apply a partial update. Omitted fields keep their current value; an
    /// explicit `clear_manager` sets the manager to null.
    pub fn update_employee(
        &mut self,
        id: EmployeeId,
        update: EmployeeUpdate,
    ) -> Result<Employee, EngineError> {
        let employee = self.storage.transaction(|tables| -> Result<_, EngineError> {
            let mut employee = require_employee(tables, id, EntityKind::Employee)?;

            if let Some(role_id) = update.role_id {
                require_role(tables, role_id)?;
                employee.role_id = role_id;
            }

            match update.manager_id {
                None => {}
                Some(None) => employee.manager_id = None,
                Some(Some(manager_id)) => {
                    if manager_id == id {
                        return Err(EngineError::SelfManagement(id));
                    }
                    require_employee(tables, manager_id, EntityKind::Manager)?;
                    hierarchy::ensure_can_manage(tables, id, manager_id)?;
                    employee.manager_id = Some(manager_id);
                }
            }

            if !update.is_empty() {
                tables.update_employee(&employee)?;
            }
            Ok(employee)
        })?;
        tracing::info!(
            employee_id = %id,
            role_id = %employee.role_id,
            manager_id = ?employee.manager_id,
            "updated employee"
        );
        Ok(employee)
    }

    /// Apply a partial update to a role. Moving a role to another
    /// department is how a blocked department delete is cleared by hand.
    pub fn update_role(&mut self, id: RoleId, update: RoleUpdate) -> Result<Role, EngineError> {
        let title = update
            .title
            .as_deref()
            .map(|t| required_text("role title", t))
            .transpose()?;

        let role = self.storage.transaction(|tables| -> Result<_, EngineError> {
            let mut role = require_role(tables, id)?;
            if let Some(title) = title {
                role.title = title;
            }
            if let Some(salary) = update.salary {
                role.salary = salary;
            }
            if let Some(department_id) = update.department_id {
                require_department(tables, department_id)?;
                role.department_id = department_id;
            }
            if !update.is_empty() {
                tables.update_role(&role)?;
            }
            Ok(role)
        })?;
        tracing::info!(role_id = %id, department_id = %role.department_id, "updated role");
        Ok(role)
    }
}

pub(crate) fn require_department<S: Storage>(store: &S, id: DepartmentId) -> Result<Department, EngineError> {
    store
        .get_department(id)?
        .ok_or_else(|| EngineError::not_found(EntityKind::Department, id))
}

pub(crate) fn require_role<S: Storage>(store: &S, id: RoleId) -> Result<Role, EngineError> {
    store
        .get_role(id)?
        .ok_or_else(|| EngineError::not_found(EntityKind::Role, id))
}

/// `kind` names the reference in the error: an employee looked up as
/// someone's manager reports as a missing manager.
pub(crate) fn require_employee<S: Storage>(
    store: &S,
    id: EmployeeId,
    kind: EntityKind,
) -> Result<Employee, EngineError> {
    store
        .get_employee(id)?
        .ok_or_else(|| EngineError::not_found(kind, id))
}
