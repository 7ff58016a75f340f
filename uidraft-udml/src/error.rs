use thiserror::Error;

pub type UdmlResult<T> = Result<T, UdmlError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UdmlError {
    #[error("XML parse error: {0}")]
    XmlError(String),

    #[error("unknown identifier: {name}")]
    UnknownIdentifier { name: String },

    #[error("Unknown prop '{prop}' for component '{component}'")]
    UnknownProp { component: String, prop: String },

    #[error("Missing required prop '{prop}' for component '{component}'")]
    MissingProperty { component: String, prop: String },

    #[error("Invalid property '{property}' for component '{component}': {reason}")]
    InvalidProperty {
        component: String,
        property: String,
        reason: String,
    },

    #[error("Invalid enum value '{value}' for property '{property}'. Expected one of: {expected}")]
    InvalidEnum {
        property: String,
        value: String,
        expected: String,
    },

    #[error("Invalid expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("Component '{component}' does not accept children")]
    ChildrenNotAllowed { component: String },

    #[error("Maximum nesting depth ({max_depth}) exceeded")]
    MaxNestingDepthExceeded { max_depth: usize },

    #[error("import/export statements are not allowed in UDML source")]
    ForbiddenStatement,

    #[error("Multiple root components found. A UDML document must have exactly one root component")]
    MultipleRootComponents,

    #[error("Empty document: no components found")]
    EmptyDocument,

    #[error("Duplicate component name '{name}': registry names are unique and immutable")]
    DuplicateName { name: String },

    #[error("Component '{name}' is not registered")]
    NotFound { name: String },
}

impl From<roxmltree::Error> for UdmlError {
    fn from(err: roxmltree::Error) -> Self {
        UdmlError::XmlError(err.to_string())
    }
}
