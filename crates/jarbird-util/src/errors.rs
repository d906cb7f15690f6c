use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Jarbird operations.
#[derive(Debug, Error, Diagnostic)]
pub enum JarbirdError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    #[diagnostic(code(jarbird::io))]
    Io(#[from] std::io::Error),

    /// Invalid or malformed `jarbird.toml`.
    #[error("Manifest error: {message}")]
    #[diagnostic(
        code(jarbird::manifest),
        help("Check your jarbird.toml for syntax errors")
    )]
    Manifest { message: String },

    /// A descriptor fragment (`pom.yaml`) could not be parsed.
    #[error("Descriptor error: {message}")]
    #[diagnostic(
        code(jarbird::descriptor),
        help("Check pom.yaml: every document must be a mapping of descriptor fields, and a version such as 1.10 must be quoted (version: \"1.10\")")
    )]
    Descriptor { message: String },

    /// A required descriptor field is still empty after merging and syncing.
    #[error("Publication '{unit}' is missing '{field}'")]
    #[diagnostic(
        code(jarbird::missing_metadata),
        help("Declare '{field}' in pom.yaml or in the [project] table of jarbird.toml")
    )]
    MissingMetadata { unit: String, field: String },

    /// A configuration property needed to build an endpoint is absent.
    #[error("Property '{name}' is not defined")]
    #[diagnostic(
        code(jarbird::missing_property),
        help("Add '{name}=...' to jarbird.properties in the project, the workspace root or ~/.jarbird")
    )]
    MissingProperty { name: String },

    /// Two publications in one scope share the same effective name.
    #[error("Duplicate publication name '{name}' declared by {first} and {second}")]
    #[diagnostic(
        code(jarbird::duplicate_unit),
        help("Give one of the publications a distinct name or variant")
    )]
    DuplicateUnitName {
        name: String,
        first: String,
        second: String,
    },

    /// Declared state of a publication is inconsistent.
    #[error("Publication '{unit}' is invalid: {message}")]
    #[diagnostic(code(jarbird::validation))]
    Validation { unit: String, message: String },

    /// A publication was moved through its lifecycle out of order.
    #[error("Publication '{unit}' cannot move from {from} to {to}")]
    #[diagnostic(code(jarbird::phase))]
    Phase {
        unit: String,
        from: String,
        to: String,
    },

    /// Two different things would be published under one task name.
    #[error("Task '{task}' would be shared by {first} and {second}")]
    #[diagnostic(
        code(jarbird::task_name_conflict),
        help("Rename the publication or the repository key so the generated task names differ")
    )]
    TaskNameConflict {
        task: String,
        first: String,
        second: String,
    },

    /// The task graph contains a cycle. Always a bug in graph synthesis.
    #[error("Task graph contains a cycle through '{task}'")]
    #[diagnostic(
        code(jarbird::task_cycle),
        help("This is a bug in Jarbird, please report it")
    )]
    TaskCycle { task: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias used by the library crates, which keep the typed error
/// so callers can tell failures apart.
pub type JarbirdResult<T> = Result<T, JarbirdError>;
