#![no_main]

use csvquery::{QueryPolicy, filter_rows, filter_rows_with_stats, load_dataset, read_csv_str};
use libfuzzer_sys::fuzz_target;

const FIXTURE: &str = "id,age,score,active,name\n\
                       1,30,9.5,true,Ann\n\
                       2,17,,false,bob\n\
                       3,,1.25,,\n\
                       4,52,7,TRUE,Cy\n";

fuzz_target!(|data: &[u8]| {
    let Ok(filter) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(table) = read_csv_str(FIXTURE) else {
        return;
    };
    let Ok(dataset) = load_dataset(&table.headers, &table.rows) else {
        return;
    };

    let policy = QueryPolicy::default();
    let Ok((matched, stats)) =
        filter_rows_with_stats(dataset.rows(), dataset.schema(), filter, &policy)
    else {
        return;
    };
    assert_eq!(stats.matched, matched.len());
    assert!(stats.matched + stats.failed <= stats.scanned);

    let again = filter_rows(dataset.rows(), dataset.schema(), filter, &policy)
        .expect("a filter that parsed once parses again");
    assert_eq!(matched, again);
});
