use std::path::Path;

use rusqlite::{Connection, Row, params};

use staffing_core::{
    Department, DepartmentId, Employee, EmployeeDetail, EmployeeId, NewEmployee, NewRole, Role,
    RoleDetail, RoleId, Salary,
};

use crate::config::{StoreConfig, StoreLocation};
use crate::error::StorageError;
use crate::traits::{DetailFilter, Storage};

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, role_id, manager_id";

const EMPLOYEE_DETAIL_SELECT: &str = "
SELECT e.id, e.first_name, e.last_name, r.title, r.salary_cents, d.name,
       m.first_name || ' ' || m.last_name
FROM employee e
JOIN role r ON e.role_id = r.id
JOIN department d ON r.department_id = d.id
LEFT JOIN employee m ON e.manager_id = m.id";

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with(&StoreConfig::file(path.as_ref()))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::open_with(&StoreConfig::in_memory())
    }

    pub fn open_with(config: &StoreConfig) -> Result<Self, StorageError> {
        let conn = match &config.location {
            StoreLocation::InMemory => Connection::open_in_memory()?,
            StoreLocation::File(path) => Connection::open(path)?,
        };
        conn.busy_timeout(config.busy_timeout)?;
        crate::schema::init_schema(&conn)?;
        tracing::debug!(location = ?config.location, "opened staffing store");
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Borrow the store for reads or single-statement writes.
    pub fn tables(&self) -> Tables<'_> {
        Tables::new(&self.conn)
    }

    /// Run `f` inside one transaction. Commits when `f` returns `Ok`; any
    /// error, including a panic unwinding through here, rolls back.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Tables<'_>) -> Result<T, E>,
        E: From<StorageError>,
    {
        let tx = self.conn.transaction().map_err(StorageError::from)?;
        match f(&Tables::new(&tx)) {
            Ok(value) => {
                tx.commit().map_err(StorageError::from)?;
                Ok(value)
            }
            Err(e) => {
                tracing::debug!("rolling back transaction");
                Err(e)
            }
        }
    }
}

/// [`Storage`] over a borrowed connection, either the store's own or an
/// open transaction.
#[derive(Clone, Copy)]
pub struct Tables<'c> {
    conn: &'c Connection,
}

impl<'c> Tables<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

/// Map constraint failures to their own variant so callers can tell a
/// rejected write from a broken connection.
fn constraint_aware(e: rusqlite::Error) -> StorageError {
    match e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StorageError::ConstraintViolation(msg.unwrap_or_else(|| err.to_string()))
        }
        other => StorageError::Sqlite(other),
    }
}

fn salary_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Salary> {
    let cents: i64 = row.get(idx)?;
    Salary::from_cents(cents).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Integer, Box::new(e))
    })
}

fn read_department(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: DepartmentId::new(row.get(0)?),
        name: row.get(1)?,
    })
}

fn read_role(row: &Row<'_>) -> rusqlite::Result<Role> {
    Ok(Role {
        id: RoleId::new(row.get(0)?),
        title: row.get(1)?,
        salary: salary_column(row, 2)?,
        department_id: DepartmentId::new(row.get(3)?),
    })
}

fn read_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
    let manager_id: Option<i64> = row.get(4)?;
    Ok(Employee {
        id: EmployeeId::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        role_id: RoleId::new(row.get(3)?),
        manager_id: manager_id.map(EmployeeId::new),
    })
}

fn read_employee_detail(row: &Row<'_>) -> rusqlite::Result<EmployeeDetail> {
    Ok(EmployeeDetail {
        id: EmployeeId::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        role_title: row.get(3)?,
        salary: salary_column(row, 4)?,
        department_name: row.get(5)?,
        manager_name: row.get(6)?,
    })
}

fn read_role_detail(row: &Row<'_>) -> rusqlite::Result<RoleDetail> {
    Ok(RoleDetail {
        id: RoleId::new(row.get(0)?),
        title: row.get(1)?,
        salary: salary_column(row, 2)?,
        department_name: row.get(3)?,
    })
}

fn count(value: i64) -> Result<u64, StorageError> {
    u64::try_from(value).map_err(|_| StorageError::InvalidData(format!("negative count: {value}")))
}

impl Storage for Tables<'_> {
    fn list_departments(&self) -> Result<Vec<Department>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM department ORDER BY id")?;
        let rows = stmt
            .query_map([], read_department)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_department(&self, id: DepartmentId) -> Result<Option<Department>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM department WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id.get()], read_department)?;
        match rows.next() {
            Some(Ok(department)) => Ok(Some(department)),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(None),
        }
    }

    fn find_department_by_name(&self, name: &str) -> Result<Option<Department>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id, name FROM department WHERE name = ?1")?;
        let mut rows = stmt.query_map(params![name], read_department)?;
        match rows.next() {
            Some(Ok(department)) => Ok(Some(department)),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(None),
        }
    }

    fn insert_department(&self, name: &str) -> Result<Department, StorageError> {
        let id: i64 = self
            .conn
            .query_row(
                "INSERT INTO department (name) VALUES (?1) RETURNING id",
                params![name],
                |row| row.get(0),
            )
            .map_err(constraint_aware)?;
        Ok(Department {
            id: DepartmentId::new(id),
            name: name.to_string(),
        })
    }

    fn delete_department(&self, id: DepartmentId) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM department WHERE id = ?1", params![id.get()])
            .map_err(constraint_aware)?;
        Ok(changed > 0)
    }

    fn list_roles(&self) -> Result<Vec<Role>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, salary_cents, department_id FROM role ORDER BY id")?;
        let rows = stmt.query_map([], read_role)?.collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_role(&self, id: RoleId) -> Result<Option<Role>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, salary_cents, department_id FROM role WHERE id = ?1")?;
        let mut rows = stmt.query_map(params![id.get()], read_role)?;
        match rows.next() {
            Some(Ok(role)) => Ok(Some(role)),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(None),
        }
    }

    fn roles_by_department(&self, department_id: DepartmentId) -> Result<Vec<Role>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, salary_cents, department_id FROM role WHERE department_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![department_id.get()], read_role)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_role(&self, role: &NewRole) -> Result<Role, StorageError> {
        let id: i64 = self
            .conn
            .query_row(
                "INSERT INTO role (title, salary_cents, department_id) VALUES (?1, ?2, ?3) RETURNING id",
                params![role.title, role.salary.cents(), role.department_id.get()],
                |row| row.get(0),
            )
            .map_err(constraint_aware)?;
        Ok(Role {
            id: RoleId::new(id),
            title: role.title.clone(),
            salary: role.salary,
            department_id: role.department_id,
        })
    }

    fn update_role(&self, role: &Role) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute(
                "UPDATE role SET title = ?1, salary_cents = ?2, department_id = ?3 WHERE id = ?4",
                params![
                    role.title,
                    role.salary.cents(),
                    role.department_id.get(),
                    role.id.get(),
                ],
            )
            .map_err(constraint_aware)?;
        Ok(changed > 0)
    }

    fn delete_role(&self, id: RoleId) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM role WHERE id = ?1", params![id.get()])
            .map_err(constraint_aware)?;
        Ok(changed > 0)
    }

    fn list_employees(&self) -> Result<Vec<Employee>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employee ORDER BY id"))?;
        let rows = stmt
            .query_map([], read_employee)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn get_employee(&self, id: EmployeeId) -> Result<Option<Employee>, StorageError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id.get()], read_employee)?;
        match rows.next() {
            Some(Ok(employee)) => Ok(Some(employee)),
            Some(Err(e)) => Err(StorageError::Sqlite(e)),
            None => Ok(None),
        }
    }

    fn employees_by_role(&self, role_id: RoleId) -> Result<Vec<Employee>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE role_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![role_id.get()], read_employee)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn subordinates(&self, manager_id: EmployeeId) -> Result<Vec<Employee>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE manager_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt
            .query_map(params![manager_id.get()], read_employee)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_employee(&self, employee: &NewEmployee) -> Result<Employee, StorageError> {
        let id: i64 = self
            .conn
            .query_row(
                "INSERT INTO employee (first_name, last_name, role_id, manager_id) VALUES (?1, ?2, ?3, ?4) RETURNING id",
                params![
                    employee.first_name,
                    employee.last_name,
                    employee.role_id.get(),
                    employee.manager_id.map(EmployeeId::get),
                ],
                |row| row.get(0),
            )
            .map_err(constraint_aware)?;
        Ok(Employee {
            id: EmployeeId::new(id),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            role_id: employee.role_id,
            manager_id: employee.manager_id,
        })
    }

    fn update_employee(&self, employee: &Employee) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute(
                "UPDATE employee SET first_name = ?1, last_name = ?2, role_id = ?3, manager_id = ?4 WHERE id = ?5",
                params![
                    employee.first_name,
                    employee.last_name,
                    employee.role_id.get(),
                    employee.manager_id.map(EmployeeId::get),
                    employee.id.get(),
                ],
            )
            .map_err(constraint_aware)?;
        Ok(changed > 0)
    }

    fn clear_manager(&self, manager_id: EmployeeId) -> Result<usize, StorageError> {
        let changed = self
            .conn
            .execute(
                "UPDATE employee SET manager_id = NULL WHERE manager_id = ?1",
                params![manager_id.get()],
            )
            .map_err(constraint_aware)?;
        Ok(changed)
    }

    fn delete_employee(&self, id: EmployeeId) -> Result<bool, StorageError> {
        let changed = self
            .conn
            .execute("DELETE FROM employee WHERE id = ?1", params![id.get()])
            .map_err(constraint_aware)?;
        Ok(changed > 0)
    }

    fn employee_count(&self) -> Result<u64, StorageError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employee", [], |row| row.get(0))?;
        count(n)
    }

    fn employee_details(&self, filter: DetailFilter) -> Result<Vec<EmployeeDetail>, StorageError> {
        let (clause, param) = match filter {
            DetailFilter::All => ("", None),
            DetailFilter::Employee(id) => ("WHERE e.id = ?1", Some(id.get())),
            DetailFilter::Department(id) => ("WHERE d.id = ?1", Some(id.get())),
            DetailFilter::Manager(id) => ("WHERE e.manager_id = ?1", Some(id.get())),
        };
        let sql = format!("{EMPLOYEE_DETAIL_SELECT} {clause} ORDER BY e.id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = match param {
            Some(id) => stmt
                .query_map(params![id], read_employee_detail)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], read_employee_detail)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }

    fn role_details(&self) -> Result<Vec<RoleDetail>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT r.id, r.title, r.salary_cents, d.name
             FROM role r
             JOIN department d ON r.department_id = d.id
             ORDER BY r.id",
        )?;
        let rows = stmt
            .query_map([], read_role_detail)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn managers(&self) -> Result<Vec<Employee>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employee
             WHERE id IN (SELECT manager_id FROM employee WHERE manager_id IS NOT NULL)
             ORDER BY id"
        ))?;
        let rows = stmt
            .query_map([], read_employee)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn department_salary_cents(&self, department_id: DepartmentId) -> Result<i64, StorageError> {
        let cents: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(r.salary_cents), 0)
             FROM employee e
             JOIN role r ON e.role_id = r.id
             WHERE r.department_id = ?1",
            params![department_id.get()],
            |row| row.get(0),
        )?;
        Ok(cents)
    }

    fn department_headcount(&self, department_id: DepartmentId) -> Result<u64, StorageError> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM employee e
             JOIN role r ON e.role_id = r.id
             WHERE r.department_id = ?1",
            params![department_id.get()],
            |row| row.get(0),
        )?;
        count(n)
    }
}
