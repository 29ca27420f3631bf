use staffing_core::{Decimal, Department, DepartmentId, Employee, EmployeeId, Role, RoleId};
use staffing_engine::{Directory, EngineError};

/// A directory over a fresh in-memory store.
pub struct TestDirectory {
    pub directory: Directory,
}

/// Ids of the rows created by [`TestDirectory::seeded`].
///
/// ```text
/// Engineering: Lead Engineer 120000 (Grace), Engineer 90000 (Ada, Alan -> Grace)
/// Sales:       Sales Manager 70000 (Susan), Salesperson 50000 (Tom -> Susan)
/// Legal:       no roles
/// ```
#[derive(Debug, Clone)]
pub struct Org {
    pub engineering: Department,
    pub sales: Department,
    pub legal: Department,
    pub lead: Role,
    pub engineer: Role,
    pub sales_manager: Role,
    pub salesperson: Role,
    pub grace: Employee,
    pub ada: Employee,
    pub alan: Employee,
    pub susan: Employee,
    pub tom: Employee,
}

impl TestDirectory {
    pub fn new() -> Result<Self, EngineError> {
        crate::init_tracing();
        Ok(Self {
            directory: Directory::open_in_memory()?,
        })
    }

    pub fn seeded() -> Result<(Self, Org), EngineError> {
        let mut fx = Self::new()?;

        let engineering = fx.department("Engineering")?;
        let sales = fx.department("Sales")?;
        let legal = fx.department("Legal")?;

        let lead = fx.role("Lead Engineer", 120_000, engineering.id)?;
        let engineer = fx.role("Engineer", 90_000, engineering.id)?;
        let sales_manager = fx.role("Sales Manager", 70_000, sales.id)?;
        let salesperson = fx.role("Salesperson", 50_000, sales.id)?;

        let grace = fx.hire("Grace", "Hopper", lead.id, None)?;
        let ada = fx.hire("Ada", "Lovelace", engineer.id, Some(grace.id))?;
        let alan = fx.hire("Alan", "Turing", engineer.id, Some(grace.id))?;
        let susan = fx.hire("Susan", "Kare", sales_manager.id, None)?;
        let tom = fx.hire("Tom", "West", salesperson.id, Some(susan.id))?;

        let org = Org {
            engineering,
            sales,
            legal,
            lead,
            engineer,
            sales_manager,
            salesperson,
            grace,
            ada,
            alan,
            susan,
            tom,
        };
        Ok((fx, org))
    }

    pub fn department(&mut self, name: &str) -> Result<Department, EngineError> {
        self.directory.create_department(name)
    }

    /// Create a role paying a whole-dollar salary.
    pub fn role(&mut self, title: &str, salary: i64, department_id: DepartmentId) -> Result<Role, EngineError> {
        self.directory
            .create_role(title, Decimal::from(salary), department_id)
    }

    pub fn hire(
        &mut self,
        first_name: &str,
        last_name: &str,
        role_id: RoleId,
        manager_id: Option<EmployeeId>,
    ) -> Result<Employee, EngineError> {
        self.directory
            .create_employee(first_name, last_name, role_id, manager_id)
    }
}
