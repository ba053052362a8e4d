// =============================================================================
// Fit-then-predict driver
// =============================================================================

use std::io::{self, Write};

use linreg_core::{Dataset, LinRegError, RegressionEngine, TabularData};
use log::info;
use thiserror::Error;

use crate::args::CliArgs;
use crate::table::{render_coefficients, render_table};

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Regression(#[from] LinRegError),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Load, fit, report, predict. All output goes to `out`, which is flushed
/// before returning.
pub fn run<W: Write>(args: &CliArgs, out: &mut W) -> Result<(), CliError> {
    let status = report(args, out);
    let flushed = out.flush();
    status?;
    flushed?;
    Ok(())
}

fn report<W: Write>(args: &CliArgs, out: &mut W) -> Result<(), CliError> {
    let training = Dataset::from_csv_path(&args.train_path, &args.csv)?;
    info!(
        "training data: {} rows, columns [{}]",
        training.num_rows(),
        training.column_headers().join(", ")
    );

    if args.print_table {
        write!(out, "{}", render_table(&training))?;
        writeln!(out)?;
    }

    let mut engine = RegressionEngine::with_config(args.solver.clone());
    engine.fit(&args.dependent, &training)?;
    writeln!(
        out,
        "Fitted '{}' with {} solver:",
        args.dependent, args.solver.method
    )?;
    write!(out, "{}", render_coefficients(&engine.named_coefficients()))?;

    let Some(path) = &args.unlabeled_path else {
        return Ok(());
    };

    let unlabeled = Dataset::from_csv_path(path, &args.csv)?;
    let predictions = engine.predict_table(&unlabeled)?;
    writeln!(out)?;
    for value in predictions {
        writeln!(out, "The predicted value is: {}", value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{parse_args, Command};
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn cli(args: &[&str]) -> CliArgs {
        match parse_args(args.iter().map(|s| s.to_string())).unwrap() {
            Command::Run(a) => a,
            Command::Help => panic!("expected a run command"),
        }
    }

    fn run_to_string(args: &CliArgs) -> Result<String, CliError> {
        let mut out = Vec::new();
        run(args, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_fit_and_predict_output() {
        let train = csv_file("x,y\n0,2\n1,5\n2,8\n3,11\n");
        let new = csv_file("x\n4\n10\n");
        let args = cli(&[
            train.path().to_str().unwrap(),
            "y",
            new.path().to_str().unwrap(),
        ]);

        let output = run_to_string(&args).unwrap();
        assert!(output.contains("Fitted 'y' with qr solver:"));
        assert!(output.contains("(intercept)"));
        let predictions: Vec<f64> = output
            .lines()
            .filter_map(|l| l.strip_prefix("The predicted value is: "))
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(predictions.len(), 2);
        approx::assert_abs_diff_eq!(predictions[0], 14.0, epsilon = 1e-9);
        approx::assert_abs_diff_eq!(predictions[1], 32.0, epsilon = 1e-9);
    }

    #[test]
    fn test_positional_fallback_when_names_differ() {
        let train = csv_file("x,y\n0,2\n1,5\n2,8\n3,11\n");
        let new = csv_file("input\n4\n");
        let args = cli(&[
            train.path().to_str().unwrap(),
            "y",
            new.path().to_str().unwrap(),
        ]);
        let output = run_to_string(&args).unwrap();
        let value: f64 = output
            .lines()
            .find_map(|l| l.strip_prefix("The predicted value is: "))
            .unwrap()
            .parse()
            .unwrap();
        approx::assert_abs_diff_eq!(value, 14.0, epsilon = 1e-9);
    }

    #[test]
    fn test_print_table() {
        let train = csv_file("x,y\n0,2\n1,5\n2,8\n");
        let args = cli(&[train.path().to_str().unwrap(), "y", "--print-table"]);
        let output = run_to_string(&args).unwrap();
        assert!(output.starts_with("x y\n\n0 2\n"));
    }

    #[test]
    fn test_singular_fit_is_reported() {
        let train = csv_file("a,b,y\n1,1,3\n2,2,5\n3,3,7\n");
        let args = cli(&[train.path().to_str().unwrap(), "y"]);
        let err = run_to_string(&args).unwrap_err();
        assert!(matches!(
            err,
            CliError::Regression(LinRegError::SingularMatrix(_))
        ));
    }

    /// Accepts writes, fails on flush (a closed pipe behind a buffer).
    struct FailingFlush(Vec<u8>);

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let train = csv_file("x,y\n0,2\n1,5\n2,8\n");
        let args = cli(&[train.path().to_str().unwrap(), "y"]);
        let mut out = FailingFlush(Vec::new());
        let err = run(&args, &mut out).unwrap_err();
        assert!(matches!(err, CliError::Output(_)));
        assert!(err.to_string().contains("pipe closed"));
        assert!(!out.0.is_empty());
    }

    #[test]
    fn test_missing_training_file() {
        let args = cli(&["/no/such/train.csv", "y"]);
        let err = run_to_string(&args).unwrap_err();
        assert!(err.to_string().contains("train.csv"));
    }
}
