#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        match calc_parser::eval(s) {
            Ok(_) => {}
            Err(calc_parser::CalcError::Syntax(failure)) => {
                let chars = s.chars().count();
                assert!(failure.position.offset <= chars);
                let _ = failure.to_string();
            }
        }
    }
});
