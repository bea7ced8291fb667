#![no_main]

use csvquery::{Session, ViewRequest, read_csv_str};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if read_csv_str(input).is_err() {
        return;
    }

    let mut session = Session::default();
    let Ok(dataset) = session.load_csv_str(input) else {
        return;
    };
    let rows = dataset.len();
    for row in dataset.rows() {
        assert_eq!(row.len(), dataset.schema().len());
    }

    let view = session
        .view(&ViewRequest::new())
        .expect("blank filter cannot fail");
    assert_eq!(view.page.total, rows);

    let mut out = Vec::new();
    let written = session.export("", &mut out).expect("export to memory");
    assert_eq!(written, rows);
});
