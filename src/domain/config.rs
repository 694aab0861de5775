//! Options that steer candidate matching and rewriting.

/// Name of the error variable the idiom is usually written with.
pub const DEFAULT_ERR_NAME: &str = "err";

/// Name of the predeclared error type.
pub const DEFAULT_ERROR_TYPE: &str = "error";

/// Name of the builtin the rewrite introduces.
pub const TRY_BUILTIN: &str = "try";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Report candidate positions.
    pub list: bool,
    /// Rewrite candidates in place.
    pub rewrite: bool,
    /// Required name of the error variable; `None` accepts any name.
    pub err_var_name: Option<String>,
    /// Type name that marks a function as error-returning.
    pub err_type_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list: false,
            rewrite: false,
            err_var_name: None,
            err_type_name: DEFAULT_ERROR_TYPE.to_string(),
        }
    }
}

impl Config {
    /// Builds the variable-name constraint from a command-line style value,
    /// where the empty string means "any name".
    pub fn with_err_var_name(mut self, name: &str) -> Self {
        self.err_var_name = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        self
    }
}
