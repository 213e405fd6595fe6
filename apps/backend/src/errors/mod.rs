pub mod domain;

#[cfg(test)]
mod tests_error_mapping;

pub use domain::{ConflictKind, DomainError, NotFoundKind};
