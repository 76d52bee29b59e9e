#![no_main]

use libfuzzer_sys::fuzz_target;
use tenet::{DocNode, Engine};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let engine = Engine::new();
        let _ = engine.compile_expression(s, Some("fuzz"));

        let doc = DocNode::new("document")
            .with_child(
                DocNode::new("symbols")
                    .with_child(DocNode::new("var").with_attr("name", "x").with_attr("init", "100"))
                    .with_child(DocNode::new("set").with_attr("name", "s").with_attr("elements", "1,2,3")),
            )
            .with_child(DocNode::new("rules").with_child(DocNode::new("rule").with_attr("name", "r").with_text(s)))
            .with_child(
                DocNode::new("queries")
                    .with_child(DocNode::new("query").with_text(s))
                    .with_child(DocNode::new("query").with_text("eval(r)")),
            );
        let _ = engine.evaluate(Some(&doc), None);
    }
});
