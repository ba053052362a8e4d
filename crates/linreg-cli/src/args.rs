// =============================================================================
// Command-Line Arguments
// =============================================================================
//
//   linreg <TRAIN_CSV> <DEPENDENT> [UNLABELED_CSV] [options]
//
// Positional arguments come in order; options may appear anywhere.
// =============================================================================

use std::path::PathBuf;

use linreg_core::{CsvOptions, OlsConfig, RowPolicy, SolveMethod};
use thiserror::Error;

pub const USAGE: &str = "\
Fit an ordinary least squares model and predict unlabeled rows.

Usage: linreg <TRAIN_CSV> <DEPENDENT> [UNLABELED_CSV] [options]

Arguments:
  <TRAIN_CSV>       CSV file with a header row used for fitting
  <DEPENDENT>       Name of the column to predict
  [UNLABELED_CSV]   CSV file with rows to predict (no dependent column)

Options:
  --method <qr|cholesky>  Factorization for the normal equations [default: qr]
  --rank-tol <FLOAT>      Relative pivot tolerance for singularity [default: 1e-10]
  --delimiter <CHAR>      Field delimiter [default: ,]
  --skip-irregular        Drop rows whose field count differs from the header
  --print-table           Print the training table before fitting
  -h, --help              Print this help

Set RUST_LOG=debug for solver details.";

#[derive(Error, Debug, PartialEq)]
pub enum UsageError {
    #[error("missing required argument <{0}>")]
    MissingArgument(&'static str),

    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{0}' needs a value")]
    MissingValue(String),

    #[error("invalid value '{value}' for '{option}': {reason}")]
    InvalidValue {
        option: String,
        value: String,
        reason: String,
    },
}

/// Everything a run needs, resolved from argv.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub train_path: PathBuf,
    pub dependent: String,
    pub unlabeled_path: Option<PathBuf>,
    pub solver: OlsConfig,
    pub csv: CsvOptions,
    pub print_table: bool,
}

#[derive(Debug)]
pub enum Command {
    Run(CliArgs),
    Help,
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = String>,
{
    let mut positional = Vec::new();
    let mut solver = OlsConfig::default();
    let mut csv = CsvOptions::default();
    let mut print_table = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--print-table" => print_table = true,
            "--skip-irregular" => csv.row_policy = RowPolicy::SkipIrregular,
            "--method" => {
                let value = next_value(&mut args, &arg)?;
                solver.method = SolveMethod::from_name(&value)
                    .map_err(|e| invalid(&arg, &value, e.to_string()))?;
            }
            "--rank-tol" => {
                let value = next_value(&mut args, &arg)?;
                let tol: f64 = value
                    .parse()
                    .map_err(|_| invalid(&arg, &value, "not a number".to_string()))?;
                if !tol.is_finite() || tol < 0.0 {
                    return Err(invalid(&arg, &value, "must be non-negative".to_string()));
                }
                solver.rank_tolerance = tol;
            }
            "--delimiter" => {
                let value = next_value(&mut args, &arg)?;
                csv.delimiter = parse_delimiter(&value).ok_or_else(|| {
                    invalid(&arg, &value, "expected a single ASCII character".to_string())
                })?;
            }
            other if other.starts_with('-') && other.len() > 1 => {
                return Err(UsageError::UnknownOption(other.to_string()))
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let train_path = positional
        .next()
        .map(PathBuf::from)
        .ok_or(UsageError::MissingArgument("TRAIN_CSV"))?;
    let dependent = positional
        .next()
        .ok_or(UsageError::MissingArgument("DEPENDENT"))?;
    let unlabeled_path = positional.next().map(PathBuf::from);
    if let Some(extra) = positional.next() {
        return Err(UsageError::UnexpectedArgument(extra));
    }

    Ok(Command::Run(CliArgs {
        train_path,
        dependent,
        unlabeled_path,
        solver,
        csv,
        print_table,
    }))
}

fn next_value<I>(args: &mut I, option: &str) -> Result<String, UsageError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .ok_or_else(|| UsageError::MissingValue(option.to_string()))
}

fn invalid(option: &str, value: &str, reason: String) -> UsageError {
    UsageError::InvalidValue {
        option: option.to_string(),
        value: value.to_string(),
        reason,
    }
}

fn parse_delimiter(value: &str) -> Option<u8> {
    match value {
        "\\t" | "tab" => Some(b'\t'),
        _ => {
            let bytes = value.as_bytes();
            (bytes.len() == 1 && bytes[0].is_ascii()).then(|| bytes[0])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, UsageError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    fn run_args(args: &[&str]) -> CliArgs {
        match parse(args).unwrap() {
            Command::Run(a) => a,
            Command::Help => panic!("expected a run command"),
        }
    }

    #[test]
    fn test_positional_only() {
        let a = run_args(&["train.csv", "price"]);
        assert_eq!(a.train_path, PathBuf::from("train.csv"));
        assert_eq!(a.dependent, "price");
        assert!(a.unlabeled_path.is_none());
        assert_eq!(a.solver.method, SolveMethod::Qr);
        assert_eq!(a.csv.row_policy, RowPolicy::Strict);
        assert!(!a.print_table);
    }

    #[test]
    fn test_all_options() {
        let a = run_args(&[
            "--method", "cholesky", "train.csv", "--print-table", "y", "new.csv",
            "--rank-tol", "1e-8", "--skip-irregular", "--delimiter", ";",
        ]);
        assert_eq!(a.unlabeled_path, Some(PathBuf::from("new.csv")));
        assert_eq!(a.solver.method, SolveMethod::Cholesky);
        assert_eq!(a.solver.rank_tolerance, 1e-8);
        assert_eq!(a.csv.row_policy, RowPolicy::SkipIrregular);
        assert_eq!(a.csv.delimiter, b';');
        assert!(a.print_table);
    }

    #[test]
    fn test_tab_delimiter() {
        let a = run_args(&["t.tsv", "y", "--delimiter", "tab"]);
        assert_eq!(a.csv.delimiter, b'\t');
    }

    #[test]
    fn test_help() {
        assert!(matches!(parse(&["x.csv", "--help"]), Ok(Command::Help)));
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(
            parse(&["train.csv"]).unwrap_err(),
            UsageError::MissingArgument("DEPENDENT")
        );
        assert_eq!(parse(&[]).unwrap_err(), UsageError::MissingArgument("TRAIN_CSV"));
        assert!(matches!(
            parse(&["a", "b", "c", "d"]),
            Err(UsageError::UnexpectedArgument(_))
        ));
        assert!(matches!(parse(&["a", "b", "--verbose"]), Err(UsageError::UnknownOption(_))));
        assert!(matches!(parse(&["a", "b", "--method"]), Err(UsageError::MissingValue(_))));
        assert!(matches!(
            parse(&["a", "b", "--method", "svd"]),
            Err(UsageError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "--rank-tol", "-1"]),
            Err(UsageError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "--delimiter", ",,"]),
            Err(UsageError::InvalidValue { .. })
        ));
    }
}
