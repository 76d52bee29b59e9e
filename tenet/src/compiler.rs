//! Rule compilation
//!
//! Parses the bodies of `rule`, `function` and `constraint` declarations and
//! registers them, together with their parameters and the symbol snapshot
//! they close over, in a [`RuleRegistry`].

use crate::document::DocNode;
use crate::parser::literals::split_list;
use crate::parser::{parse_expression, ParseOptions};
use crate::resolver::qualify;
use crate::resource_limits::ResourceLimits;
use crate::semantic::{CompiledRule, Parameter, RuleKind, RuleRegistry, SymbolTable, SymbolType};
use crate::TenetError;
use tracing::debug;

/// Tag of the sections holding rule declarations
pub const RULES_SECTION: &str = "rules";

/// Compiles rule declarations into a [`RuleRegistry`]
#[derive(Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Self
    }

    /// Compile every declaration in the document's `rules` sections.
    ///
    /// Declarations that fail to compile are reported and left out; the
    /// rest are registered in document order.
    pub fn compile(
        &self,
        doc: Option<&DocNode>,
        symbols: &SymbolTable,
        namespace: Option<&str>,
        limits: &ResourceLimits,
    ) -> (RuleRegistry, Vec<TenetError>) {
        let mut registry = RuleRegistry::new();
        let mut errors = Vec::new();

        let doc = match doc {
            Some(doc) => doc,
            None => return (registry, errors),
        };

        let scope = symbols.scope();
        let mut anonymous = 0usize;

        for section in doc.find_all(RULES_SECTION) {
            for declaration in &section.children {
                let kind = match RuleKind::from_tag(&declaration.tag) {
                    Some(kind) => kind,
                    None => {
                        errors.push(
                            TenetError::semantic(format!(
                                "Unknown rule type '{}'",
                                declaration.tag
                            ))
                            .with_line(declaration.line)
                            .with_suggestion("Use one of: rule, function, constraint"),
                        );
                        continue;
                    }
                };

                let name = match declaration.attr("name").map(str::trim) {
                    Some(name) if !name.is_empty() => qualify(namespace, name),
                    _ => {
                        anonymous += 1;
                        qualify(namespace, &format!("anonymous{}", anonymous))
                    }
                };

                let parameters = match parse_parameters(declaration, kind, &name) {
                    Ok(parameters) => parameters,
                    Err(error) => {
                        errors.push(error);
                        continue;
                    }
                };

                let expression = match compile_body(
                    declaration,
                    kind,
                    &name,
                    &parameters,
                    namespace,
                    limits,
                ) {
                    Ok(expression) => expression,
                    Err(error) => {
                        errors.push(error);
                        continue;
                    }
                };

                let rule = CompiledRule {
                    name,
                    kind,
                    expression,
                    parameters,
                    line: declaration.line,
                    scope: scope.clone(),
                };

                if let Err(rule) = registry.insert(rule) {
                    errors.push(
                        TenetError::semantic(format!("Duplicate rule '{}'", rule.name))
                            .with_line(rule.line)
                            .with_suggestion("Rename one of the declarations; the first one is kept"),
                    );
                }
            }
        }

        debug!(
            rules = registry.len(),
            errors = errors.len(),
            namespace = namespace.unwrap_or(""),
            "compiled rules"
        );
        (registry, errors)
    }
}

/// Parse `params="a, b:number"`
fn parse_parameters(
    node: &DocNode,
    kind: RuleKind,
    name: &str,
) -> Result<Vec<Parameter>, TenetError> {
    let mut parameters = Vec::new();

    for declared in split_list(node.attr("params").unwrap_or("")) {
        let (param_name, param_type) = match declared.split_once(':') {
            Some((param_name, type_name)) => {
                let type_name = type_name.trim();
                let param_type = SymbolType::parse(type_name).ok_or_else(|| {
                    TenetError::semantic(format!(
                        "Invalid type '{}' for parameter '{}' of {} '{}'",
                        type_name,
                        param_name.trim(),
                        kind.name(),
                        name
                    ))
                    .with_line(node.line)
                })?;
                (param_name.trim(), param_type)
            }
            None => (declared, SymbolType::Any),
        };

        if parameters.iter().any(|p: &Parameter| p.name == param_name) {
            return Err(TenetError::semantic(format!(
                "Duplicate parameter '{}' in {} '{}'",
                param_name,
                kind.name(),
                name
            ))
            .with_line(node.line));
        }

        parameters.push(Parameter {
            name: param_name.to_string(),
            param_type,
        });
    }

    Ok(parameters)
}

fn compile_body(
    node: &DocNode,
    kind: RuleKind,
    name: &str,
    parameters: &[Parameter],
    namespace: Option<&str>,
    limits: &ResourceLimits,
) -> Result<crate::semantic::Expression, TenetError> {
    let body = node
        .text_content()
        .or_else(|| node.attr("body"))
        .ok_or_else(|| {
            TenetError::syntax(format!(
                "Failed to compile {} '{}': missing body",
                kind.name(),
                name
            ))
            .with_line(node.line)
            .with_suggestion("Put the expression in the element text or a 'body' attribute")
        })?;

    let parameter_names: Vec<String> = parameters.iter().map(|p| p.name.clone()).collect();
    let options = ParseOptions {
        namespace,
        parameters: &parameter_names,
    };

    parse_expression(body, &options, limits, node.line).map_err(|e| {
        let mut error = TenetError::syntax(format!(
            "Failed to compile {} '{}': {}",
            kind.name(),
            name,
            e.message()
        ))
        .with_line(node.line);
        if let Some(suggestion) = e.suggestion() {
            error = error.with_suggestion(suggestion);
        }
        error
    })
}
