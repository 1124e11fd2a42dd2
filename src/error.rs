use thiserror::Error;

/// Kind of entity a command referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Machine,
    Optimization,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Machine => write!(f, "machine"),
            EntityKind::Optimization => write!(f, "optimization"),
        }
    }
}

/// Errors surfaced by engine commands
///
/// Invalid state transitions are not errors; they resolve to
/// `CommandOutcome::Unchanged`.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
}

impl EngineError {
    pub fn machine_not_found(id: &str) -> Self {
        EngineError::NotFound {
            kind: EntityKind::Machine,
            id: id.to_string(),
        }
    }

    pub fn optimization_not_found(id: &str) -> Self {
        EngineError::NotFound {
            kind: EntityKind::Optimization,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = EngineError::machine_not_found("m-42");
        assert_eq!(err.to_string(), "machine 'm-42' not found");

        let err = EngineError::optimization_not_found("o-7");
        assert_eq!(err.to_string(), "optimization 'o-7' not found");
    }
}
