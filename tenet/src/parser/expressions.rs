use crate::ast::ExpressionIdGenerator;
use crate::error::TenetError;
use crate::parser::literals::parse_literal;
use crate::parser::{ParseOptions, Rule};
use crate::semantic::*;
use pest::iterators::Pair;

/// Walks the pest parse tree and builds an [`Expression`] tree.
///
/// Every node gets a fresh ID and the line of the document node the text
/// came from.
pub(crate) struct ExpressionBuilder<'o, 'g> {
    options: &'o ParseOptions<'o>,
    id_gen: &'g mut ExpressionIdGenerator,
    line: Option<usize>,
}

impl<'o, 'g> ExpressionBuilder<'o, 'g> {
    pub(crate) fn new(
        options: &'o ParseOptions<'o>,
        id_gen: &'g mut ExpressionIdGenerator,
        line: Option<usize>,
    ) -> Self {
        Self {
            options,
            id_gen,
            line,
        }
    }

    /// Build the top-level `expression` pair
    pub(crate) fn build(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        self.logical(pair)
    }

    fn node(&mut self, kind: ExpressionKind) -> Expression {
        Expression::new(kind, self.line, self.id_gen.next_id())
    }

    /// Descend one level of the tree being built
    fn enter(&mut self) -> Result<(), TenetError> {
        self.id_gen.push_depth().map_err(|depth| {
            TenetError::syntax(format!(
                "Expression nesting of {} exceeds the maximum depth of {}",
                depth,
                self.id_gen.max_depth()
            ))
            .with_line(self.line)
            .with_suggestion("Split the expression into smaller rules")
        })
    }

    /// One level per operator of a left-folded chain or a prefix run
    fn enter_operator(&mut self) -> Result<(), TenetError> {
        self.enter().map_err(|e| {
            e.with_suggestion(
                "Each operator in a chain or prefix run adds one level of nesting; split it across smaller rules",
            )
        })
    }

    fn exit(&mut self, levels: usize) {
        for _ in 0..levels {
            self.id_gen.pop_depth();
        }
    }

    /// Parenthesized groups, call arguments and power operands each nest one level
    fn nested(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        self.enter()?;
        let result = match pair.as_rule() {
            Rule::power => self.power(pair),
            _ => self.logical(pair),
        };
        self.id_gen.pop_depth();
        result
    }

    fn logical(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| self.malformed("expression without operands"))?;
        let mut left = self.comparison(first)?;
        let mut levels = 0;

        while let Some(op) = inner.next() {
            self.enter_operator()?;
            levels += 1;
            let operator = match op.as_rule() {
                Rule::op_and => LogicalOperator::And,
                Rule::op_or => LogicalOperator::Or,
                Rule::op_implies => LogicalOperator::Implies,
                Rule::op_iff => LogicalOperator::Iff,
                other => return Err(self.unexpected(other)),
            };
            let right_pair = inner
                .next()
                .ok_or_else(|| self.malformed("logical operator without right operand"))?;
            let right = self.comparison(right_pair)?;
            left = self.node(ExpressionKind::Logical(
                Box::new(left),
                operator,
                Box::new(right),
            ));
        }

        self.exit(levels);
        Ok(left)
    }

    fn comparison(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| self.malformed("comparison without operands"))?;
        let mut left = self.additive(first)?;
        let mut levels = 0;

        while let Some(op) = inner.next() {
            self.enter_operator()?;
            levels += 1;
            let right_pair = inner
                .next()
                .ok_or_else(|| self.malformed("comparison without right operand"))?;
            let right = Box::new(self.additive(right_pair)?);
            let kind = match op.as_rule() {
                Rule::op_in => ExpressionKind::Membership(Box::new(left), right),
                rule => {
                    let operator = match rule {
                        Rule::op_eq => ComparisonOperator::Equal,
                        Rule::op_ne => ComparisonOperator::NotEqual,
                        Rule::op_gt => ComparisonOperator::GreaterThan,
                        Rule::op_gte => ComparisonOperator::GreaterThanOrEqual,
                        Rule::op_lt => ComparisonOperator::LessThan,
                        Rule::op_lte => ComparisonOperator::LessThanOrEqual,
                        other => return Err(self.unexpected(other)),
                    };
                    ExpressionKind::Comparison(Box::new(left), operator, right)
                }
            };
            left = self.node(kind);
        }

        self.exit(levels);
        Ok(left)
    }

    fn additive(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| self.malformed("sum without operands"))?;
        let mut left = self.multiplicative(first)?;
        let mut levels = 0;

        while let Some(op) = inner.next() {
            self.enter_operator()?;
            levels += 1;
            let right_pair = inner
                .next()
                .ok_or_else(|| self.malformed("operator without right operand"))?;
            let right = Box::new(self.multiplicative(right_pair)?);
            let left_box = Box::new(left);
            let kind = match op.as_rule() {
                Rule::op_add => {
                    ExpressionKind::Arithmetic(left_box, ArithmeticOperation::Add, right)
                }
                Rule::op_sub => {
                    ExpressionKind::Arithmetic(left_box, ArithmeticOperation::Subtract, right)
                }
                Rule::op_union => ExpressionKind::SetOperation(left_box, SetOperator::Union, right),
                Rule::op_intersect => {
                    ExpressionKind::SetOperation(left_box, SetOperator::Intersect, right)
                }
                Rule::op_diff => ExpressionKind::SetOperation(left_box, SetOperator::Diff, right),
                other => return Err(self.unexpected(other)),
            };
            left = self.node(kind);
        }

        self.exit(levels);
        Ok(left)
    }

    fn multiplicative(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut inner = pair.into_inner();
        let first = inner
            .next()
            .ok_or_else(|| self.malformed("product without operands"))?;
        let mut left = self.power(first)?;
        let mut levels = 0;

        while let Some(op) = inner.next() {
            self.enter_operator()?;
            levels += 1;
            let operation = match op.as_rule() {
                Rule::op_mul => ArithmeticOperation::Multiply,
                Rule::op_div => ArithmeticOperation::Divide,
                Rule::op_mod => ArithmeticOperation::Modulo,
                other => return Err(self.unexpected(other)),
            };
            let right_pair = inner
                .next()
                .ok_or_else(|| self.malformed("operator without right operand"))?;
            let right = self.power(right_pair)?;
            left = self.node(ExpressionKind::Arithmetic(
                Box::new(left),
                operation,
                Box::new(right),
            ));
        }

        self.exit(levels);
        Ok(left)
    }

    // power = { unary ~ (op_pow ~ power)? }
    fn power(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut inner = pair.into_inner();
        let base_pair = inner
            .next()
            .ok_or_else(|| self.malformed("power without base"))?;
        let base = self.unary(base_pair)?;

        match (inner.next(), inner.next()) {
            (Some(_op), Some(exponent_pair)) => {
                let exponent = self.nested(exponent_pair)?;
                Ok(self.node(ExpressionKind::Arithmetic(
                    Box::new(base),
                    ArithmeticOperation::Power,
                    Box::new(exponent),
                )))
            }
            (None, _) => Ok(base),
            (Some(_), None) => Err(self.malformed("'^' without exponent")),
        }
    }

    // unary = { unary_op* ~ primary }; operators apply innermost first
    fn unary(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut operators = Vec::new();
        let mut operand = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::op_not | Rule::op_neg => {
                    self.enter_operator()?;
                    operators.push(inner.as_rule());
                }
                _ => operand = Some(self.primary(inner)?),
            }
        }
        self.exit(operators.len());

        let mut expression = operand.ok_or_else(|| self.malformed("operator without operand"))?;
        for operator in operators.into_iter().rev() {
            let kind = match operator {
                Rule::op_not => ExpressionKind::LogicalNegation(Box::new(expression)),
                _ => ExpressionKind::Negation(Box::new(expression)),
            };
            expression = self.node(kind);
        }
        Ok(expression)
    }

    fn primary(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        match pair.as_rule() {
            Rule::number | Rule::string | Rule::boolean => {
                let value = parse_literal(pair).map_err(|e| e.with_line(self.line))?;
                Ok(self.node(ExpressionKind::Literal(value)))
            }
            Rule::identifier => {
                let name = self.qualify(pair.as_str());
                Ok(self.node(ExpressionKind::Reference(name)))
            }
            Rule::call => self.call(pair),
            Rule::expression => self.nested(pair),
            other => Err(self.unexpected(other)),
        }
    }

    // call = { identifier ~ "(" ~ arguments? ~ ")" }
    fn call(&mut self, pair: Pair<Rule>) -> Result<Expression, TenetError> {
        let mut inner = pair.into_inner();
        let callee = inner
            .next()
            .ok_or_else(|| self.malformed("call without a name"))?;
        let name = self.qualify(callee.as_str());

        let mut arguments = Vec::new();
        for argument in inner {
            arguments.push(self.nested(argument)?);
        }

        Ok(self.node(ExpressionKind::FunctionCall(FunctionCall { name, arguments })))
    }

    /// Prefix the active namespace unless the name is a builtin, a declared
    /// parameter or the quantifier binding.
    fn qualify(&self, name: &str) -> String {
        match self.options.namespace {
            Some(namespace)
                if !BUILTIN_FUNCTIONS.contains(&name)
                    && name != ITEM_BINDING
                    && !self.options.parameters.iter().any(|p| p == name) =>
            {
                format!("{}.{}", namespace, name)
            }
            _ => name.to_string(),
        }
    }

    fn malformed(&self, what: &str) -> TenetError {
        TenetError::syntax(format!("Malformed expression: {}", what)).with_line(self.line)
    }

    fn unexpected(&self, rule: Rule) -> TenetError {
        TenetError::syntax(format!("Unexpected grammar rule {:?}", rule)).with_line(self.line)
    }
}
