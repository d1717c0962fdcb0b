#![no_main]

use gdl_core::{GraphReport, export::to_json_document};
use gdl_parser::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let result = parse(input);
    for edge in &result.graph.edges {
        assert!(result.graph.find_node(&edge.source).is_some());
        assert!(result.graph.find_node(&edge.target).is_some());
    }

    let _ = GraphReport::analyze(&result.graph);
    let document = to_json_document(&result.graph).expect("export never fails");
    let _: serde_json::Value = serde_json::from_str(&document).expect("export is valid JSON");
});
