//! Pipeline configuration.

/// Configuration for a compile request.
///
/// The defaults reproduce the documented analysis behavior: block-scope
/// declarations are also counted into every enclosing scope, no usage pass
/// runs so every declared variable is reported as unused, and the
/// control-flow graph is the chained tree. The switches below opt into the
/// corrected behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Name of the function the control-flow graph is built for.
    pub entry_function: String,

    /// Mark variables as used when they are read or assigned.
    pub track_variable_usage: bool,

    /// Collect block-scope declarations only into the block's own scope.
    pub isolate_block_scopes: bool,

    /// Report every unrecognized character as an error diagnostic.
    pub report_lexical_errors: bool,

    /// Join branch tails into the following statement and add loop back
    /// edges in the control-flow graph.
    pub join_control_flow: bool,

    /// Maximum block nesting depth before parsing fails.
    pub max_nesting_depth: usize,

    /// Declaration count above which the space estimate rises to O(log n).
    pub many_variables_threshold: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            entry_function: "main".to_string(),
            track_variable_usage: false,
            isolate_block_scopes: false,
            report_lexical_errors: false,
            join_control_flow: false,
            max_nesting_depth: 256,
            many_variables_threshold: 10,
        }
    }
}

impl CompilerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry_function(mut self, name: impl Into<String>) -> Self {
        self.entry_function = name.into();
        self
    }

    pub fn with_usage_tracking(mut self, enabled: bool) -> Self {
        self.track_variable_usage = enabled;
        self
    }

    pub fn with_isolated_block_scopes(mut self, enabled: bool) -> Self {
        self.isolate_block_scopes = enabled;
        self
    }

    pub fn with_lexical_errors(mut self, enabled: bool) -> Self {
        self.report_lexical_errors = enabled;
        self
    }

    pub fn with_joined_control_flow(mut self, enabled: bool) -> Self {
        self.join_control_flow = enabled;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_many_variables_threshold(mut self, threshold: usize) -> Self {
        self.many_variables_threshold = threshold;
        self
    }
}
