#![forbid(unsafe_code)]

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use csvquery::{
    FrameError, PolicyError, QueryPolicy, Scalar, Session, SessionError, SortDirection, SortKey,
    View, ViewRequest,
};
use serde_json::{Map, Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub file: PathBuf,
    pub filter: String,
    pub sort: Option<String>,
    pub direction: SortDirection,
    pub page: usize,
    pub size: Option<usize>,
    pub export: Option<PathBuf>,
    pub policy: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Run(CliArgs),
}

pub fn parse_args<I>(args: I) -> Result<Command, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut file = None;
    let mut filter = String::new();
    let mut sort = None;
    let mut direction = SortDirection::default();
    let mut page = 0;
    let mut size = None;
    let mut export = None;
    let mut policy = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let mut value = |what: &str| {
            args.next()
                .ok_or_else(|| CliError::Usage(format!("{arg} requires {what}")))
        };
        match arg.as_str() {
            "--file" => file = Some(PathBuf::from(value("a path")?)),
            "--filter" => filter = value("an expression")?,
            "--sort" => sort = Some(value("a column name")?),
            "--dir" => direction = value("asc or desc")?.parse()?,
            "--page" => page = parse_number(&arg, &value("a page index")?)?,
            "--size" => size = Some(parse_number(&arg, &value("a page size")?)?),
            "--export" => export = Some(PathBuf::from(value("a path")?)),
            "--policy" => policy = Some(PathBuf::from(value("a path")?)),
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(CliError::Usage(format!("unknown argument: {other}"))),
        }
    }

    let file = file.ok_or_else(|| CliError::Usage("--file is required".to_owned()))?;
    Ok(Command::Run(CliArgs {
        file,
        filter,
        sort,
        direction,
        page,
        size,
        export,
        policy,
    }))
}

fn parse_number(flag: &str, value: &str) -> Result<usize, CliError> {
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("{flag} expects a non-negative integer, got {value:?}")))
}

/// Execute one invocation and return what should be printed on stdout.
pub fn run(args: &CliArgs) -> Result<String, CliError> {
    let policy = match &args.policy {
        Some(path) => QueryPolicy::from_json_path(path)?,
        None => QueryPolicy::default(),
    };
    tracing::debug!(?policy, "using query policy");

    let mut session = Session::new(policy);
    session.load_csv_path(&args.file)?;

    if let Some(path) = &args.export {
        let sink = BufWriter::new(File::create(path)?);
        let written = session.export(&args.filter, sink)?;
        return Ok(format!("exported {written} rows to {}", path.display()));
    }

    let mut request = ViewRequest::new().filter(args.filter.as_str()).page(args.page);
    if let Some(column) = &args.sort {
        request = request.sort(SortKey::new(column.as_str(), args.direction));
    }
    if let Some(size) = args.size {
        request = request.size(size);
    }

    let view = session.view(&request)?;
    Ok(serde_json::to_string_pretty(&render_view(&view))?)
}

/// Rows as plain JSON objects keyed in header order.
#[must_use]
pub fn render_view(view: &View) -> Value {
    let rows = view
        .page
        .content
        .iter()
        .map(|row| {
            view.headers
                .iter()
                .map(|name| (name.clone(), scalar_to_json(row.get(name))))
                .collect::<Map<_, _>>()
        })
        .map(Value::Object)
        .collect::<Vec<_>>();

    json!({
        "headers": view.headers,
        "rows": rows,
        "page": view.page.page_index,
        "size": view.page.page_size,
        "total": view.page.total,
        "total_pages": view.total_pages,
        "has_next": view.page.has_next(),
        "stats": view.stats,
    })
}

fn scalar_to_json(value: &Scalar) -> Value {
    match value {
        Scalar::Null => Value::Null,
        Scalar::Bool(v) => Value::Bool(*v),
        Scalar::Int64(v) => Value::from(*v),
        Scalar::Float64(v) => serde_json::Number::from_f64(*v).map_or(Value::Null, Value::Number),
        Scalar::Utf8(v) => Value::String(v.clone()),
    }
}

#[must_use]
pub fn usage() -> &'static str {
    "cq-cli\n\
     Usage:\n\
     \tcq-cli --file <path> [--filter <expr>] [--sort <column>] [--dir asc|desc] [--page N] [--size N] [--export <path>] [--policy <path>]\n\
     Options:\n\
     \t--file <path>      CSV file to load (first row is the header)\n\
     \t--filter <expr>    filter expression, e.g. 'age > 18 AND name startsWith \"a\"'\n\
     \t--sort <column>    sort the filtered rows by one column\n\
     \t--dir asc|desc     sort direction (default: asc)\n\
     \t--page N           zero-based page index (default: 0)\n\
     \t--size N           rows per page (default from policy: 20)\n\
     \t--export <path>    write the filtered rows as CSV instead of printing a page\n\
     \t--policy <path>    JSON query policy overriding the strict defaults\n\
     \t-h, --help         show this help\n\
     Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostic output on stderr."
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use csvquery::SortDirection;
    use serde_json::Value;

    use super::{CliArgs, CliError, Command, parse_args, run};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| (*arg).to_owned()).collect()
    }

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        file
    }

    fn run_args(list: &[&str]) -> CliArgs {
        match parse_args(args(list)).expect("parse args") {
            Command::Run(args) => args,
            Command::Help => panic!("unexpected help"),
        }
    }

    #[test]
    fn parses_every_flag() {
        let parsed = run_args(&[
            "--file", "people.csv", "--filter", "age > 1", "--sort", "age", "--dir", "DESC",
            "--page", "2", "--size", "5", "--export", "out.csv", "--policy", "policy.json",
        ]);
        assert_eq!(
            parsed,
            CliArgs {
                file: PathBuf::from("people.csv"),
                filter: "age > 1".to_owned(),
                sort: Some("age".to_owned()),
                direction: SortDirection::Descending,
                page: 2,
                size: Some(5),
                export: Some(PathBuf::from("out.csv")),
                policy: Some(PathBuf::from("policy.json")),
            }
        );
    }

    #[test]
    fn defaults_and_help() {
        let parsed = run_args(&["--file", "a.csv"]);
        assert_eq!(parsed.filter, "");
        assert_eq!(parsed.direction, SortDirection::Ascending);
        assert_eq!(parsed.page, 0);
        assert_eq!(parsed.size, None);
        assert_eq!(parse_args(args(&["-h"])).expect("help"), Command::Help);
    }

    #[test]
    fn rejects_bad_arguments() {
        let err = parse_args(args(&["--filter", "x"])).expect_err("missing file");
        assert_eq!(err.to_string(), "--file is required");

        let err = parse_args(args(&["--file"])).expect_err("missing value");
        assert_eq!(err.to_string(), "--file requires a path");

        let err = parse_args(args(&["--file", "a", "--page", "-1"])).expect_err("bad number");
        assert!(matches!(err, CliError::Usage(_)));

        let err = parse_args(args(&["--file", "a", "--dir", "up"])).expect_err("bad dir");
        assert!(matches!(err, CliError::Frame(_)));

        let err = parse_args(args(&["--bogus"])).expect_err("unknown flag");
        assert_eq!(err.to_string(), "unknown argument: --bogus");
    }

    #[test]
    fn prints_the_requested_page_as_json() {
        let file = csv_file("age,name\n30,Ann\n17,bob\n52,Cy\n");
        let path = file.path().to_string_lossy().into_owned();
        let out = run(&run_args(&[
            "--file", path.as_str(), "--filter", "age > 18", "--sort", "age", "--dir", "desc",
        ]))
        .expect("run");

        let json: Value = serde_json::from_str(&out).expect("json output");
        assert_eq!(json["total"], 2);
        assert_eq!(json["headers"], serde_json::json!(["age", "name"]));
        assert_eq!(json["rows"][0]["name"], "Cy");
        assert_eq!(json["rows"][1]["age"], 30);
        assert_eq!(json["stats"]["scanned"], 3);
        assert_eq!(json["has_next"], false);
    }

    #[test]
    fn exports_filtered_rows_to_a_file() {
        let file = csv_file("age,name\n30,Ann\n17,bob\n");
        let dir = tempfile::tempdir().expect("temp dir");
        let target = dir.path().join("out.csv");
        let source = file.path().to_string_lossy().into_owned();
        let export = target.to_string_lossy().into_owned();
        let out = run(&run_args(&[
            "--file",
            source.as_str(),
            "--filter",
            "name == \"BOB\"",
            "--export",
            export.as_str(),
        ]))
        .expect("run");
        assert!(out.starts_with("exported 1 rows"));
        let written = std::fs::read_to_string(&target).expect("read export");
        assert_eq!(written, "age,name\n17,bob\n");
    }

    #[test]
    fn filter_errors_surface_as_one_message() {
        let file = csv_file("age\n30\n");
        let source = file.path().to_string_lossy().into_owned();
        let err = run(&run_args(&[
            "--file",
            source.as_str(),
            "--filter",
            "height > 1",
        ]))
        .expect_err("unknown column");
        assert_eq!(
            err.to_string(),
            "Unknown column 'height' at position 0. Available columns: [age]"
        );
    }

    #[test]
    fn policy_file_is_applied() {
        let file = csv_file("n\n1\n2\n3\n");
        let mut policy = tempfile::NamedTempFile::new().expect("temp file");
        policy
            .write_all(br#"{"default_page_size":2}"#)
            .expect("write policy");
        let source = file.path().to_string_lossy().into_owned();
        let policy_path = policy.path().to_string_lossy().into_owned();
        let out = run(&run_args(&[
            "--file",
            source.as_str(),
            "--policy",
            policy_path.as_str(),
        ]))
        .expect("run");
        let json: Value = serde_json::from_str(&out).expect("json output");
        assert_eq!(json["size"], 2);
        assert_eq!(json["total_pages"], 2);
        assert_eq!(json["has_next"], true);
    }
}
