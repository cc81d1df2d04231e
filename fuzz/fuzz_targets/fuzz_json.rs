#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        match json_parser::parse(s) {
            Ok(value) => {
                // Anything we accept must survive a render/re-parse cycle
                let rendered = value.to_string();
                let reparsed = json_parser::parse(&rendered);
                assert!(reparsed.is_ok(), "rendered JSON failed to re-parse: {rendered}");
            }
            Err(json_parser::JsonError::Syntax(failure)) => {
                // Reported positions must stay inside the input
                let chars = s.chars().count();
                assert!(failure.position.offset <= chars);
                assert!(failure.position.line >= 1);
                assert!(failure.position.column >= 1);
                // Rendering the report must not panic
                let _ = failure.to_string();
            }
        }
    }
});
