use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("selector '{selector}' contains no path components")]
    Empty { selector: String },

    #[error("malformed selector component '{component}' in '{selector}': {message}")]
    MalformedComponent {
        selector: String,
        component: String,
        message: String,
    },

    #[error("attribute reference '{component}' in '{selector}' must be the final component")]
    AttributeNotLast { selector: String, component: String },
}
