use staffing_core::{CoreError, DepartmentId, EmployeeId, EntityKind, RoleId};
use staffing_storage::StorageError;
use thiserror::Error;

/// Coarse classification callers use to decide how to recover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A supplied value breaks a rule. Retry with corrected input.
    Validation,
    /// A referenced row does not exist. Re-prompt from a fresh listing.
    NotFound,
    /// Dependents block the mutation until a resolution is supplied.
    Conflict,
    /// The store failed; the operation was aborted.
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Store => "store",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid value: {0}")]
    Invalid(#[from] CoreError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("department already exists: {0}")]
    DuplicateDepartment(String),

    #[error("employee {0} cannot be their own manager")]
    SelfManagement(EmployeeId),

    #[error("management cycle: {manager} already reports to {employee}")]
    ManagementCycle {
        employee: EmployeeId,
        manager: EmployeeId,
    },

    #[error("manager chain starting at {0} does not terminate")]
    BrokenHierarchy(EmployeeId),

    #[error("department {department} still has {} role(s)", .roles.len())]
    DepartmentHasRoles {
        department: DepartmentId,
        roles: Vec<RoleId>,
    },

    #[error("role {role} still has {} employee(s)", .employees.len())]
    RoleHasEmployees {
        role: RoleId,
        employees: Vec<EmployeeId>,
    },

    #[error("no replacement role given for employee {0}")]
    UnresolvedDependent(EmployeeId),

    #[error("replacement role {0} is itself being deleted")]
    ReassignToDeletedRole(RoleId),

    #[error("roles cannot be moved to department {0}, which is being deleted")]
    ReassignToDeletedDepartment(DepartmentId),
}

impl EngineError {
    pub fn not_found(kind: EntityKind, id: impl Into<i64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_)
            | Self::SelfManagement(_)
            | Self::ManagementCycle { .. }
            | Self::UnresolvedDependent(_)
            | Self::ReassignToDeletedRole(_)
            | Self::ReassignToDeletedDepartment(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuplicateDepartment(_)
            | Self::DepartmentHasRoles { .. }
            | Self::RoleHasEmployees { .. } => ErrorKind::Conflict,
            Self::Storage(_) | Self::BrokenHierarchy(_) => ErrorKind::Store,
        }
    }
}
