use crate::ast::ExpressionId;
use crate::evaluator::context::Scope;
use crate::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Names that are never namespace-qualified
pub const BUILTIN_FUNCTIONS: [&str; 3] = ["error", "path", "eval"];

/// Conventional binding for the current element in quantifiers and chains
pub const ITEM_BINDING: &str = "item";

/// An expression that can be evaluated, with source line and unique ID
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub line: Option<usize>,
    pub id: ExpressionId,
}

impl Expression {
    /// Create a new expression with kind, line, and ID
    pub fn new(kind: ExpressionKind, line: Option<usize>, id: ExpressionId) -> Self {
        Self { kind, line, id }
    }
}

/// The kind/type of expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Literal(Value),
    /// Identifier; evaluates to its binding, or to its own name when unbound
    Reference(String),
    Arithmetic(Box<Expression>, ArithmeticOperation, Box<Expression>),
    Comparison(Box<Expression>, ComparisonOperator, Box<Expression>),
    Logical(Box<Expression>, LogicalOperator, Box<Expression>),
    SetOperation(Box<Expression>, SetOperator, Box<Expression>),
    Membership(Box<Expression>, Box<Expression>),
    Negation(Box<Expression>),
    LogicalNegation(Box<Expression>),
    FunctionCall(FunctionCall),
}

/// Call of a builtin or compiled function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Vec<Expression>,
}

/// Arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOperation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl ArithmeticOperation {
    /// Returns a human-readable name for the operation
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "addition",
            ArithmeticOperation::Subtract => "subtraction",
            ArithmeticOperation::Multiply => "multiplication",
            ArithmeticOperation::Divide => "division",
            ArithmeticOperation::Modulo => "modulo",
            ArithmeticOperation::Power => "exponentiation",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOperation::Add => "+",
            ArithmeticOperation::Subtract => "-",
            ArithmeticOperation::Multiply => "*",
            ArithmeticOperation::Divide => "/",
            ArithmeticOperation::Modulo => "%",
            ArithmeticOperation::Power => "^",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Equal,
    NotEqual,
}

impl ComparisonOperator {
    /// Returns a human-readable name for the operator
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => "greater than",
            ComparisonOperator::LessThan => "less than",
            ComparisonOperator::GreaterThanOrEqual => "greater than or equal",
            ComparisonOperator::LessThanOrEqual => "less than or equal",
            ComparisonOperator::Equal => "equal",
            ComparisonOperator::NotEqual => "not equal",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
        }
    }
}

/// Binary boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
    /// Material implication; a false antecedent yields `true`
    Implies,
    /// Biconditional
    Iff,
}

impl LogicalOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::Implies => "=>",
            LogicalOperator::Iff => "<=>",
        }
    }
}

/// Set algebra operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    Union,
    Intersect,
    Diff,
}

impl SetOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            SetOperator::Union => "union",
            SetOperator::Intersect => "intersect",
            SetOperator::Diff => "diff",
        }
    }
}

/// Declaration kinds found in `symbols` sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Var,
    Const,
    Set,
    Graph,
    Entity,
}

impl SymbolKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "var" => Some(SymbolKind::Var),
            "const" => Some(SymbolKind::Const),
            "set" => Some(SymbolKind::Set),
            "graph" => Some(SymbolKind::Graph),
            "entity" => Some(SymbolKind::Entity),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SymbolKind::Var => "var",
            SymbolKind::Const => "const",
            SymbolKind::Set => "set",
            SymbolKind::Graph => "graph",
            SymbolKind::Entity => "entity",
        }
    }
}

/// Declared symbol types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    Number,
    String,
    Boolean,
    List,
    Set,
    Graph,
    Object,
    Any,
}

impl SymbolType {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "number" => Some(SymbolType::Number),
            "string" => Some(SymbolType::String),
            "boolean" => Some(SymbolType::Boolean),
            "list" => Some(SymbolType::List),
            "set" => Some(SymbolType::Set),
            "graph" => Some(SymbolType::Graph),
            "object" => Some(SymbolType::Object),
            "any" => Some(SymbolType::Any),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SymbolType::Number => "number",
            SymbolType::String => "string",
            SymbolType::Boolean => "boolean",
            SymbolType::List => "list",
            SymbolType::Set => "set",
            SymbolType::Graph => "graph",
            SymbolType::Object => "object",
            SymbolType::Any => "any",
        }
    }

    /// Whether a runtime value has the shape this type declares
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (SymbolType::Any, _)
                | (SymbolType::Number, Value::Number(_))
                | (SymbolType::String, Value::Text(_))
                | (SymbolType::Boolean, Value::Boolean(_))
                | (SymbolType::List, Value::List(_))
                | (SymbolType::Set, Value::Set(_))
                | (SymbolType::Graph, Value::Graph(_))
                | (SymbolType::Object, Value::Object(_))
        )
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub kind: SymbolKind,
    pub symbol_type: SymbolType,
    pub value: Value,
    pub mutable: bool,
    pub line: Option<usize>,
}

/// Namespace-qualified name → symbol
///
/// Entries can be added but never replaced: the first definition of a name
/// wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    entries: BTreeMap<String, SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entry; hands the entry back if the name is taken.
    pub fn insert(&mut self, name: impl Into<String>, entry: SymbolEntry) -> Result<(), SymbolEntry> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(entry);
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolEntry)> {
        self.entries.iter()
    }

    /// Flatten into the base value scope used by evaluation
    pub fn scope(&self) -> Scope {
        Scope::new(
            self.entries
                .iter()
                .map(|(name, entry)| (name.clone(), entry.value.clone()))
                .collect(),
        )
    }
}

/// What a compiled declaration was declared as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Rule,
    Function,
    Constraint,
}

impl RuleKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "rule" => Some(RuleKind::Rule),
            "function" => Some(RuleKind::Function),
            "constraint" => Some(RuleKind::Constraint),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Rule => "rule",
            RuleKind::Function => "function",
            RuleKind::Constraint => "constraint",
        }
    }
}

/// A declared function parameter (`name` or `name:type`)
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub param_type: SymbolType,
}

/// A named, compiled expression
///
/// `scope` is the value snapshot of the declaring document's symbols; calls
/// bind their arguments over it, so imported functions keep seeing the
/// symbols of the document they came from.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub kind: RuleKind,
    pub expression: Expression,
    pub parameters: Vec<Parameter>,
    pub line: Option<usize>,
    pub scope: Scope,
}

/// Compiled rules by qualified name, remembering declaration order
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: BTreeMap<String, CompiledRule>,
    order: Vec<String>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule; hands it back if the name is taken.
    pub fn insert(&mut self, rule: CompiledRule) -> Result<(), CompiledRule> {
        if self.rules.contains_key(&rule.name) {
            return Err(rule);
        }
        self.order.push(rule.name.clone());
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.get(name)
    }

    /// Expression tree registered under `name` (used by `eval` and chains)
    pub fn expression(&self, name: &str) -> Option<&Expression> {
        self.rules.get(name).map(|rule| &rule.expression)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in declaration (and merge) order
    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.order.iter().filter_map(|name| self.rules.get(name))
    }

    pub fn constraints(&self) -> impl Iterator<Item = &CompiledRule> {
        self.iter().filter(|rule| rule.kind == RuleKind::Constraint)
    }
}
