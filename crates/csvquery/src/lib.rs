#![forbid(unsafe_code)]

//! Load a CSV, infer a type per column, then filter, sort, page and export
//! its rows.
//!
//! ```
//! use csvquery::{Session, SortKey, ViewRequest};
//!
//! let mut session = Session::default();
//! session
//!     .load_csv_str("age,name\n30,Ann\n17,bob\n")
//!     .expect("load");
//!
//! let view = session
//!     .view(
//!         &ViewRequest::new()
//!             .filter(r#"age > 18 AND name startsWith "a""#)
//!             .sort(SortKey::ascending("name")),
//!     )
//!     .expect("view");
//! assert_eq!(view.page.total, 1);
//! ```

mod session;

pub use cq_expr::{
    BinaryOp, EvalError, Expr, ExprError, FilterStats, LexError, LogicalOp, ParseError, evaluate,
    filter_rows, filter_rows_with_stats, parse_filter, tokenize,
};
pub use cq_frame::{
    Dataset, FrameError, LoadError, Page, RawRow, Schema, SortDirection, SortKey, TypedRow,
    coerce_row, infer_schema, load_dataset, paginate, sort_rows,
};
pub use cq_io::{IoError, RawTable, read_csv_path, read_csv_reader, read_csv_str, write_csv, write_csv_string};
pub use cq_runtime::{PolicyError, QueryPolicy, RuntimeMode};
pub use cq_types::{DType, Scalar, TypeError};
pub use session::{Session, SessionError, View, ViewRequest};
