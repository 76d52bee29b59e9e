#![no_main]

use libfuzzer_sys::fuzz_target;
use tenet::{DocNode, Engine};

fuzz_target!(|input: (u8, u8)| {
    let engine = Engine::new();

    let depth = input.0 as usize + 1;
    let mut expr = String::from("1");
    for i in 0..depth {
        expr = match (input.1 as usize + i) % 5 {
            0 => format!("({} + 1)", expr),
            1 => format!("2 ^ {}", expr),
            2 => format!("!({})", expr),
            3 => format!("-{}", expr),
            _ => format!("!{}", expr),
        };
    }
    let prefix = if input.1 % 2 == 0 { "!" } else { "-" };
    let expr = format!("{}{}", prefix.repeat(input.1 as usize * 4), expr);

    let doc = DocNode::new("document")
        .with_child(DocNode::new("rules").with_child(DocNode::new("rule").with_attr("name", "deep").with_text(expr.as_str())))
        .with_child(DocNode::new("queries").with_child(DocNode::new("query").with_text("eval(deep)")));
    let _ = engine.evaluate(Some(&doc), None);
});
