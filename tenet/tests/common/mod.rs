#![allow(dead_code)]

use tenet::DocNode;

pub fn document(sections: Vec<DocNode>) -> DocNode {
    DocNode::new("document").with_children(sections)
}

pub fn symbols(declarations: Vec<DocNode>) -> DocNode {
    DocNode::new("symbols").with_children(declarations)
}

pub fn rules(declarations: Vec<DocNode>) -> DocNode {
    DocNode::new("rules").with_children(declarations)
}

pub fn queries(constructs: Vec<DocNode>) -> DocNode {
    DocNode::new("queries").with_children(constructs)
}

pub fn var(name: &str, symbol_type: &str, init: &str) -> DocNode {
    DocNode::new("var")
        .with_attr("name", name)
        .with_attr("type", symbol_type)
        .with_attr("init", init)
}

pub fn set(name: &str, elements: &str) -> DocNode {
    DocNode::new("set")
        .with_attr("name", name)
        .with_attr("elements", elements)
}

pub fn graph(name: &str, edges: &str) -> DocNode {
    DocNode::new("graph")
        .with_attr("name", name)
        .with_attr("edges", edges)
}

pub fn rule(name: &str, body: &str) -> DocNode {
    DocNode::new("rule").with_attr("name", name).with_text(body)
}

pub fn function(name: &str, params: &str, body: &str) -> DocNode {
    DocNode::new("function")
        .with_attr("name", name)
        .with_attr("params", params)
        .with_text(body)
}

pub fn constraint(name: &str, body: &str) -> DocNode {
    DocNode::new("constraint")
        .with_attr("name", name)
        .with_text(body)
}

pub fn query(name: &str, expr: &str) -> DocNode {
    DocNode::new("query").with_attr("name", name).with_text(expr)
}

pub fn counterfactual(name: &str, overrides: &str, children: Vec<DocNode>) -> DocNode {
    DocNode::new("counterfactual")
        .with_attr("name", name)
        .with_attr("if", overrides)
        .with_children(children)
}

pub fn import(src: &str) -> DocNode {
    DocNode::new("import").with_attr("src", src)
}
