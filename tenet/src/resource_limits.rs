/// Resource limits to prevent abuse and keep evaluation predictable
///
/// These limits protect against malicious inputs while being generous enough
/// for all legitimate use cases.
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    /// Maximum expression nesting depth accepted by the parser
    /// Real usage: ~3 levels, Limit: 100 (30x+)
    pub max_expression_depth: usize,

    /// Maximum evaluation depth (nested expressions plus rule and function calls)
    /// Guards against `eval` cycles such as `rule a = eval(a)`
    pub max_evaluation_depth: usize,

    /// Maximum chain of nested imports
    pub max_import_depth: usize,

    /// Maximum number of nodes in a single document tree
    pub max_document_nodes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_expression_depth: 100,
            max_evaluation_depth: 256,
            max_import_depth: 32,
            max_document_nodes: 100_000,
        }
    }
}

impl ResourceLimits {
    /// Create a new ResourceLimits with default values
    pub fn new() -> Self {
        Self::default()
    }
}
