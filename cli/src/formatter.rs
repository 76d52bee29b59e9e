use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use tenet::{EvalResult, SymbolTable, TenetError};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    /// Results table, then errors, then (optionally) the trace
    pub fn format_result(&self, result: &EvalResult, show_trace: bool) -> String {
        let mut output = String::new();

        if result.results.is_empty() {
            output.push_str("No results\n");
        } else {
            output.push_str(&self.format_results_table(result));
            output.push('\n');
        }

        if !result.errors.is_empty() {
            output.push('\n');
            output.push_str(&self.format_errors(&result.errors));
        }

        if show_trace && !result.trace.is_empty() {
            output.push('\n');
            output.push_str(&self.format_trace(&result.trace));
        }

        output
    }

    fn format_results_table(&self, result: &EvalResult) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("Result").set_alignment(CellAlignment::Left),
            Cell::new("Value").set_alignment(CellAlignment::Left),
        ]));

        for (name, value) in &result.results {
            table.add_row(Row::from(vec![name.clone(), value.to_string()]));
        }

        table.to_string()
    }

    pub fn format_symbols(&self, symbols: &SymbolTable) -> String {
        if symbols.is_empty() {
            return "No symbols\n".to_string();
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec!["Symbol", "Kind", "Type", "Value"]));

        for (name, entry) in symbols.iter() {
            table.add_row(Row::from(vec![
                name.clone(),
                entry.kind.name().to_string(),
                entry.symbol_type.to_string(),
                entry.value.to_string(),
            ]));
        }

        format!("{}\n", table)
    }

    /// One block per error: kind and message, then location and fix hints
    pub fn format_errors(&self, errors: &[TenetError]) -> String {
        let mut output = format!(
            "{} error{}:\n",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        );
        for error in errors {
            output.push_str(&self.format_error(error));
        }
        output
    }

    fn format_error(&self, error: &TenetError) -> String {
        let mut output = format!("  error[{}]: {}\n", error.kind().name(), error.message());
        if let Some(line) = error.line() {
            output.push_str(&format!("    --> line {}\n", line));
        }
        if let Some(suggestion) = error.suggestion() {
            output.push_str(&format!("    help: {}\n", suggestion));
        }
        output
    }

    fn format_trace(&self, trace: &[String]) -> String {
        let mut output = String::from("Trace:\n");
        let last = trace.len().saturating_sub(1);
        for (i, line) in trace.iter().enumerate() {
            let symbol = if i == last { "└─" } else { "├─" };
            output.push_str(&format!("{} {}\n", symbol, line));
        }
        output
    }
}
