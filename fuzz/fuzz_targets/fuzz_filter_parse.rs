#![no_main]

use csvquery::{QueryPolicy, parse_filter, tokenize};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    if let Err(err) = tokenize(input) {
        assert!(err.position() < input.len());
        return;
    }

    let columns: Vec<String> = ["name", "a", "b"].into_iter().map(str::to_owned).collect();
    for policy in [QueryPolicy::strict(), QueryPolicy::lenient()] {
        if let Ok(expr) = parse_filter(input, &columns, &policy) {
            // canonical text must parse again under the strict policy
            let canonical = expr.to_string();
            assert!(parse_filter(&canonical, &columns, &QueryPolicy::strict()).is_ok());
        }
    }
});
