/// Limits applied by an [`Evaluator`](crate::ast::Evaluator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Deepest syntax-tree nesting evaluated before failing with `DepthExceeded`.
    pub max_depth: usize,
    /// Compiled-size limit, in bytes, for patterns handed to the regex built-ins.
    pub regex_size_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 256,
            regex_size_limit: 10 * (1 << 20),
        }
    }
}

impl Config {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_regex_size_limit(mut self, regex_size_limit: usize) -> Self {
        self.regex_size_limit = regex_size_limit;
        self
    }
}
