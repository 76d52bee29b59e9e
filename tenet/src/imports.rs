//! Import processing
//!
//! Imports are processed depth-first before the importing document is
//! resolved or compiled. Each document in progress is tracked on an import
//! chain that is passed by value down the recursion, so a cycle is detected
//! as soon as a document would import one of its own ancestors.

use crate::compiler::Compiler;
use crate::document::DocNode;
use crate::loader::DocumentLoader;
use crate::resolver::{qualify, Resolver};
use crate::resource_limits::ResourceLimits;
use crate::semantic::{RuleRegistry, SymbolTable};
use crate::TenetError;
use tracing::{debug, warn};

pub const IMPORT_TAG: &str = "import";

/// A document with its imports merged in, ready for evaluation
#[derive(Debug, Default)]
pub struct LinkedDocument {
    pub symbols: SymbolTable,
    pub rules: RuleRegistry,
    pub errors: Vec<TenetError>,
    /// Qualified names of the document's own constraints
    pub constraints: Vec<String>,
    /// Imports declared with `scope="full"`, in import order
    pub full_scope: Vec<ScopedImport>,
}

/// An imported document whose constructs run against the merged scope
#[derive(Debug, Clone)]
pub struct ScopedImport {
    pub root: DocNode,
    pub namespace: Option<String>,
    pub constraints: Vec<String>,
}

/// Loads, resolves and compiles a document together with its imports
pub struct Linker<'a> {
    loader: &'a dyn DocumentLoader,
    limits: &'a ResourceLimits,
}

impl<'a> Linker<'a> {
    pub fn new(loader: &'a dyn DocumentLoader, limits: &'a ResourceLimits) -> Self {
        Self { loader, limits }
    }

    /// Link `root`. `chain` holds the identities of the documents currently
    /// being imported, outermost first, ending with `root`'s own identity
    /// when it has one.
    pub fn link(
        &self,
        root: &DocNode,
        id: Option<&str>,
        namespace: Option<&str>,
        chain: Vec<String>,
    ) -> LinkedDocument {
        let mut linked = LinkedDocument::default();
        let mut imported_symbols = SymbolTable::new();
        let mut imported_rules = RuleRegistry::new();

        for import in root.find_all(IMPORT_TAG) {
            self.import(
                import,
                id,
                namespace,
                &chain,
                &mut imported_symbols,
                &mut imported_rules,
                &mut linked,
            );
        }

        let (mut symbols, errors) =
            Resolver::with_external(&imported_symbols).resolve(Some(root), namespace);
        linked.errors.extend(errors);
        for (name, entry) in imported_symbols.iter() {
            if symbols.insert(name.clone(), entry.clone()).is_err() {
                linked.errors.push(conflict("Symbol", name, entry.line));
            }
        }

        let (mut rules, errors) =
            Compiler::new().compile(Some(root), &symbols, namespace, self.limits);
        linked.errors.extend(errors);
        linked.constraints = rules
            .constraints()
            .map(|rule| rule.name.clone())
            .collect();
        for rule in imported_rules.iter() {
            if let Err(rule) = rules.insert(rule.clone()) {
                linked.errors.push(conflict("Rule", &rule.name, rule.line));
            }
        }

        linked.symbols = symbols;
        linked.rules = rules;
        linked
    }

    #[allow(clippy::too_many_arguments)]
    fn import(
        &self,
        node: &DocNode,
        importer: Option<&str>,
        namespace: Option<&str>,
        chain: &[String],
        symbols: &mut SymbolTable,
        rules: &mut RuleRegistry,
        linked: &mut LinkedDocument,
    ) {
        let reference = match node.attr("src").or_else(|| node.attr("path")) {
            Some(reference) if !reference.trim().is_empty() => reference.trim(),
            _ => {
                linked.errors.push(
                    TenetError::semantic("Import missing 'src' attribute").with_line(node.line),
                );
                return;
            }
        };

        if chain.len() > self.limits.max_import_depth {
            linked.errors.push(
                TenetError::semantic(format!(
                    "Import of '{}' exceeds the maximum import depth of {}",
                    reference, self.limits.max_import_depth
                ))
                .with_line(node.line),
            );
            return;
        }

        let loaded = match self.loader.load(reference, importer) {
            Ok(loaded) => loaded,
            Err(error) => {
                warn!(reference = %reference, error = %error, "skipping import");
                linked.errors.push(
                    TenetError::semantic(format!("Failed to import '{}': {}", reference, error))
                        .with_line(node.line),
                );
                return;
            }
        };

        if chain.contains(&loaded.id) {
            let mut cycle = chain.to_vec();
            cycle.push(loaded.id.clone());
            warn!(reference = %reference, "import cycle");
            linked.errors.push(
                TenetError::semantic(format!("Import cycle detected: {}", cycle.join(" -> ")))
                    .with_line(node.line)
                    .with_suggestion("Remove one of the imports that close the cycle"),
            );
            return;
        }

        let alias = node
            .attr("as")
            .map(str::trim)
            .filter(|alias| !alias.is_empty());
        let child_namespace = match alias {
            Some(alias) => Some(qualify(namespace, alias)),
            None => namespace.map(str::to_string),
        };

        let mut child_chain = chain.to_vec();
        child_chain.push(loaded.id.clone());
        debug!(
            reference = %reference,
            id = %loaded.id,
            namespace = ?child_namespace,
            "importing document"
        );

        let child = self.link(
            &loaded.root,
            Some(loaded.id.as_str()),
            child_namespace.as_deref(),
            child_chain,
        );
        linked.errors.extend(child.errors);

        for (name, entry) in child.symbols.iter() {
            if symbols.insert(name.clone(), entry.clone()).is_err() {
                linked.errors.push(conflict("Symbol", name, node.line));
            }
        }
        for rule in child.rules.iter() {
            if let Err(rule) = rules.insert(rule.clone()) {
                linked.errors.push(conflict("Rule", &rule.name, node.line));
            }
        }

        if node.attr("scope") == Some("full") {
            linked.full_scope.extend(child.full_scope);
            linked.full_scope.push(ScopedImport {
                root: loaded.root,
                namespace: child_namespace,
                constraints: child.constraints,
            });
        }
    }
}

fn conflict(what: &str, name: &str, line: Option<usize>) -> TenetError {
    TenetError::semantic(format!("{} conflict: '{}' is already defined", what, name))
        .with_line(line)
        .with_suggestion("Import the document under an alias with as=\"...\"")
}
