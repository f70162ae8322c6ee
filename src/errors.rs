use crate::ir::ExprId;
use thiserror::Error;

/// A structural precondition of the model is violated. These are detected by
/// the pre-generation validation pass and abort generation before any output
/// text is produced; the fix is a corrected model, not a retried call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("application name is empty")]
    EmptyAppName,
    #[error("brick name is empty")]
    EmptyBrickName,
    #[error("state name is empty")]
    EmptyStateName,
    #[error("duplicate brick name '{0}'")]
    DuplicateBrick(String),
    #[error("duplicate state name '{0}'")]
    DuplicateState(String),
    #[error("'{0}' is not a valid identifier in the target language")]
    InvalidName(String),
    #[error("'{0}' is a reserved word in the target language")]
    ReservedName(String),
    #[error("no initial state declared")]
    NoInitialState,
    #[error("initial state does not resolve to a declared state")]
    DanglingInitialState,
    #[error("transition {index} of state '{state}' targets an undeclared state")]
    DanglingTargetState { state: String, index: usize },
    #[error("guard of transition {index} of state '{state}' references an undeclared expression node")]
    DanglingGuardNode { state: String, index: usize },
    #[error("guard in state '{state}' reads an undeclared brick")]
    UndeclaredGuardBrick { state: String },
    #[error("guard in state '{state}' reads '{brick}', which is an actuator, not a sensor")]
    GuardOnActuator { state: String, brick: String },
    #[error("action in state '{state}' drives an undeclared brick")]
    UndeclaredActionBrick { state: String },
    #[error("action in state '{state}' drives '{brick}', which is a sensor, not an actuator")]
    ActionOnSensor { state: String, brick: String },
    #[error("expression node {node} appears in more than one guard position")]
    SharedGuardNode { node: ExprId },
}

/// Failure of a generation call. The caller receives either a complete
/// artifact or one of these; never a truncated buffer.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("invalid model: {0}")]
    Model(#[from] ModelError),
    /// A backend was asked to render a model node it has no rule for. The
    /// in-tree node set is closed and fully covered, so this is only ever
    /// constructed by out-of-tree backends with partial dialect support.
    #[error("no rendering rule for model node: {0}")]
    UnsupportedNode(String),
    #[error("failed to write generated sketch: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from evaluating a guard tree against a reading snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("no reading supplied for sensor '{0}'")]
    MissingReading(String),
    #[error("unresolved expression node {0}")]
    DanglingExpr(ExprId),
}

pub type GenerateResult<T> = std::result::Result<T, GenerateError>;
