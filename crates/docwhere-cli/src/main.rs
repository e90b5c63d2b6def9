//! `docwhere`: translate SQL WHERE fragments into document filters.
//!
//! Each fragment given on the command line, or each non-blank stdin line when
//! none are given, is printed as one JSON object per line:
//!
//! ```text
//! {"filter":{"n":{"$gt":1}},"options":{"sort":[{"title":-1}]}}
//! ```
//!
//! Failures go to stderr and the exit status is 1 once every input has been
//! processed. Usage errors exit with status 2.

use std::ffi::OsString;
use std::io::{self, BufRead as _, Write as _};
use std::path::{Path, PathBuf};

use docwhere_criteria::{Criteria, CriteriaConfig};
use docwhere_error::{Result, WhereError};
use docwhere_types::FindOptions;
use serde_json::json;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let exit_code = run_cli(std::env::args_os());
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliArgs {
    config: Option<PathBuf>,
    keep_qualifiers: bool,
    order: Option<String>,
    select: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    where_func: Option<String>,
    json_log: bool,
    help: bool,
    fragments: Vec<String>,
}

fn parse_args(tail: &[String]) -> std::result::Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;
    while i < tail.len() {
        match tail[i].as_str() {
            "-h" | "--help" => args.help = true,
            "--keep-qualifiers" => args.keep_qualifiers = true,
            "--json-log" => args.json_log = true,
            "--config" => args.config = Some(PathBuf::from(value_of(tail, &mut i, "a file path")?)),
            "--order" => args.order = Some(value_of(tail, &mut i, "an ORDER BY list")?),
            "--select" => args.select = Some(value_of(tail, &mut i, "a field list")?),
            "--limit" => args.limit = Some(count_of(tail, &mut i)?),
            "--offset" => args.offset = Some(count_of(tail, &mut i)?),
            "--where-func" => args.where_func = Some(value_of(tail, &mut i, "JavaScript code")?),
            "--" => {
                args.fragments.extend(tail[i + 1..].iter().cloned());
                break;
            }
            other if other.starts_with("--") => return Err(format!("unknown option `{other}`")),
            fragment => args.fragments.push(fragment.to_owned()),
        }
        i += 1;
    }
    Ok(args)
}

fn value_of(tail: &[String], i: &mut usize, what: &str) -> std::result::Result<String, String> {
    let flag = &tail[*i];
    *i += 1;
    tail.get(*i)
        .cloned()
        .ok_or_else(|| format!("{flag} requires {what}"))
}

fn count_of(tail: &[String], i: &mut usize) -> std::result::Result<u64, String> {
    let flag = tail[*i].clone();
    let raw = value_of(tail, i, "a row count")?;
    raw.parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got `{raw}`"))
}

fn run_cli<I>(os_args: I) -> i32
where
    I: IntoIterator<Item = OsString>,
{
    let raw: Vec<String> = os_args
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let tail = if raw.len() > 1 { &raw[1..] } else { &[] };

    let args = match parse_args(tail) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };
    if args.help {
        print_help();
        return 0;
    }

    init_tracing(args.json_log);

    let criteria = match build_criteria(&args) {
        Ok(criteria) => criteria,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0_usize;
    let mut translate_one = |fragment: &str| -> io::Result<()> {
        match translate(&criteria, &args, fragment) {
            Ok(line) => writeln!(out, "{line}"),
            Err(err) => {
                failures += 1;
                warn!(error = %err, "fragment rejected");
                eprintln!("error: {err}");
                Ok(())
            }
        }
    };

    let io_result = if args.fragments.is_empty() {
        translate_stdin(&mut translate_one)
    } else {
        args.fragments
            .iter()
            .try_for_each(|fragment| translate_one(fragment))
    };
    if let Err(err) = io_result {
        eprintln!("error: {err}");
        return 1;
    }

    debug!(failures = failures, "done");
    i32::from(failures > 0)
}

fn translate_stdin(translate_one: &mut impl FnMut(&str) -> io::Result<()>) -> io::Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        translate_one(&line)?;
    }
    Ok(())
}

/// Translate one fragment into its output line.
fn translate(criteria: &Criteria, args: &CliArgs, fragment: &str) -> Result<String> {
    let (predicate, trailing) = criteria.with_trailing(fragment)?;
    let predicate = criteria.with_where_func(predicate, args.where_func.as_deref());
    let flags = criteria.find_options(
        args.select.as_deref(),
        args.order.as_deref(),
        args.limit,
        args.offset,
    );
    let options = merge_options(trailing, flags);
    let line = json!({
        "filter": predicate.to_document(),
        "options": options.to_document(),
    });
    Ok(line.to_string())
}

/// Command-line flags win over clauses written in the fragment.
fn merge_options(trailing: FindOptions, flags: FindOptions) -> FindOptions {
    FindOptions {
        projection: flags.projection.or(trailing.projection),
        sort: flags.sort.or(trailing.sort),
        limit: flags.limit.or(trailing.limit),
        offset: flags.offset.or(trailing.offset),
    }
}

fn build_criteria(args: &CliArgs) -> Result<Criteria> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => CriteriaConfig::default(),
    };
    if args.keep_qualifiers {
        config.strip_table_qualifiers = false;
    }
    Criteria::new(config)
}

fn load_config(path: &Path) -> Result<CriteriaConfig> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| WhereError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_config(&text).map_err(|e| match e {
        WhereError::Config(detail) => WhereError::Config(format!("{}: {detail}", path.display())),
        other => other,
    })
}

fn parse_config(text: &str) -> Result<CriteriaConfig> {
    toml::from_str(text).map_err(|e| WhereError::Config(e.to_string()))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("warning: tracing subscriber not installed: {err}");
    }
}

fn print_help() {
    println!(
        "\
docwhere: translate SQL WHERE fragments into document filters

USAGE:
    docwhere [OPTIONS] [FRAGMENT...]

With no FRAGMENT, each non-blank line of stdin is translated.

OPTIONS:
    --config <FILE>       TOML file with strip_table_qualifiers, primary_key, id_aliases
    --keep-qualifiers     Keep `table.` prefixes on field names
    --order <CLAUSE>      ORDER BY list, e.g. \"title DESC, n\"
    --select <FIELDS>     Comma-separated projection
    --limit <N>           Row limit
    --offset <N>          Rows to skip
    --where-func <JS>     Server-side JavaScript condition, added as $where
    --json-log            Emit logs as JSON lines on stderr (filter with RUST_LOG)
    -h, --help            Show this help"
    );
}

#[cfg(test)]
mod tests {
    use serde_json::Value as JsonValue;

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&[
            "--keep-qualifiers",
            "--order",
            "n desc",
            "--limit",
            "3",
            "a = 1",
            "--",
            "--weird = 2",
        ]))
        .expect("valid args");
        assert!(parsed.keep_qualifiers);
        assert_eq!(parsed.order.as_deref(), Some("n desc"));
        assert_eq!(parsed.limit, Some(3));
        assert_eq!(parsed.fragments, vec!["a = 1".to_owned(), "--weird = 2".to_owned()]);
    }

    #[test]
    fn test_parse_args_errors() {
        let err = parse_args(&args(&["--order"])).expect_err("missing value");
        assert!(err.contains("--order requires"));
        let err = parse_args(&args(&["--limit", "-1"])).expect_err("negative");
        assert!(err.contains("non-negative"));
        let err = parse_args(&args(&["--bogus"])).expect_err("unknown");
        assert!(err.contains("unknown option"));
    }

    #[test]
    fn test_translate_line() {
        let criteria = Criteria::default();
        let cli = CliArgs::default();
        let line = translate(&criteria, &cli, "books.n > 1 order by title desc").expect("ok");
        let parsed: JsonValue = serde_json::from_str(&line).expect("json line");
        assert_eq!(
            parsed,
            json!({
                "filter": { "n": { "$gt": 1 } },
                "options": { "sort": [{ "title": -1 }] },
            })
        );
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_flags_override_trailing_clauses() {
        let criteria = Criteria::default();
        let cli = CliArgs {
            order: Some("n".to_owned()),
            select: Some("id".to_owned()),
            ..CliArgs::default()
        };
        let line = translate(&criteria, &cli, "a = 1 order by b desc limit 4").expect("ok");
        let parsed: JsonValue = serde_json::from_str(&line).expect("json line");
        assert_eq!(
            parsed["options"],
            json!({ "fields": { "_id": 1 }, "sort": [{ "n": 1 }], "limit": 4 })
        );
    }

    #[test]
    fn test_where_func_joins_filter() {
        let parsed = parse_args(&args(&["--where-func", "this.n > 1", "a = 1"])).expect("args");
        assert_eq!(parsed.where_func.as_deref(), Some("this.n > 1"));
        let line = translate(&Criteria::default(), &parsed, "a = 1").expect("ok");
        let parsed: JsonValue = serde_json::from_str(&line).expect("json line");
        assert_eq!(parsed["filter"], json!({ "a": 1, "$where": "this.n > 1" }));
    }

    #[test]
    fn test_translate_error() {
        let err = translate(&Criteria::default(), &CliArgs::default(), "a = 1 or b = 2")
            .expect_err("or");
        assert!(err.is_syntax());
    }

    #[test]
    fn test_parse_config() {
        let config = parse_config(concat!(
            "strip_table_qualifiers = false\n",
            "primary_key = \"key\"\n",
            "id_aliases = [\"id\", \"pk\"]\n",
        ))
        .expect("config");
        assert!(!config.strip_table_qualifiers);
        assert!(config.is_id_alias("pk"));
        let err = parse_config("primary_key = 3").expect_err("wrong type");
        assert!(matches!(err, WhereError::Config(_)));
    }

    #[test]
    fn test_help_exits_zero() {
        let argv = ["docwhere", "--help"].map(OsString::from);
        assert_eq!(run_cli(argv), 0);
        let argv = ["docwhere", "--nope"].map(OsString::from);
        assert_eq!(run_cli(argv), 2);
    }
}
