//! MongoDB download URL resolver CLI entrypoint.
//!
//! Resolves one request from the command line, or a JSON request read from
//! a file or standard input, and prints the resulting download URL.

use clap::Parser;
use log::LevelFilter;
use mongodb_download_url::DownloadUrlResolver;
use mongodb_download_url::cli::{Cli, CliError, STDIN_MARKER};
use mongodb_download_url::config::ResolverConfig;
use mongodb_download_url::request::{Request, Response, batch_slots};
use std::io::{Read, Write};

type Result<T> = std::result::Result<T, CliError>;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut std::io::stdin(), &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<()> {
    let config = ResolverConfig::load(cli.config.as_deref())?;
    let resolver = DownloadUrlResolver::from_config(&config);
    let request = read_request(cli, stdin)?;
    let response = resolver.handle(&request)?;
    render(&response, cli.json, stdout)
}

/// Maps `-v` occurrences onto a log level; `RUST_LOG` still takes precedence.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();
    if builder.try_init().is_err() {
        // A logger is already installed.
    }
}

/// Builds the request from `--request` input, or from the positional
/// selector and flags.
fn read_request(cli: &Cli, stdin: &mut dyn Read) -> Result<Request> {
    let Some(source) = cli.request.as_deref() else {
        return Ok(Request::Single(cli.to_request()));
    };

    let read_error = |source_err| CliError::RequestRead {
        path: source.to_owned(),
        source: source_err,
    };
    let text = if source == STDIN_MARKER {
        let mut buffer = String::new();
        stdin.read_to_string(&mut buffer).map_err(read_error)?;
        buffer
    } else {
        std::fs::read_to_string(source).map_err(read_error)?
    };
    Ok(Request::from_json(&text)?)
}

/// Writes the response; batches with failed entries are reported as an
/// error after every entry has been printed.
fn render(response: &Response, json: bool, stdout: &mut dyn Write) -> Result<()> {
    match response {
        Response::Single(descriptor) if json => write_json(stdout, descriptor),
        Response::Single(descriptor) => {
            writeln!(stdout, "{}", descriptor.url()).map_err(CliError::Write)
        }
        Response::Batch(results) => {
            if json {
                write_json(stdout, &batch_slots(results))?;
            } else {
                for (selector, outcome) in results {
                    let written = match outcome {
                        Ok(descriptor) => writeln!(stdout, "{selector}\t{}", descriptor.url()),
                        Err(err) => writeln!(stdout, "{selector}\terror: {err}"),
                    };
                    written.map_err(CliError::Write)?;
                }
            }

            let failed = results.values().filter(|outcome| outcome.is_err()).count();
            if failed > 0 {
                return Err(CliError::BatchFailed {
                    failed,
                    total: results.len(),
                });
            }
            Ok(())
        }
    }
}

fn write_json(stdout: &mut dyn Write, value: &impl serde::Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *stdout, value).map_err(|e| CliError::Write(e.into()))?;
    writeln!(stdout).map_err(CliError::Write)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests fail fast with a message naming the broken fixture"
)]
mod tests {
    use super::*;
    use mongodb_download_url::ArtifactDescriptor;
    use mongodb_download_url::batch::BatchResults;
    use mongodb_download_url::error::ResolveError;
    use rstest::{fixture, rstest};

    const URL: &str = "http://fastdl.mongodb.org/linux/mongodb-linux-x86_64-3.0.7.tgz";

    #[fixture]
    fn descriptor() -> ArtifactDescriptor {
        ArtifactDescriptor::new("3.0.7", "mongodb-linux-x86_64-3.0.7.tgz", URL)
    }

    fn rendered(response: &Response, json: bool) -> (Result<()>, String) {
        let mut stdout = Vec::new();
        let result = render(response, json, &mut stdout);
        let text = String::from_utf8(stdout).expect("stdout was not UTF-8");
        (result, text)
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = CliError::Resolve(ResolveError::NotFound {
            request: "9.9.9".to_owned(),
        });

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.contains("could not find a MongoDB version matching `9.9.9`"));
    }

    #[rstest]
    fn single_response_prints_bare_url(descriptor: ArtifactDescriptor) {
        let (result, text) = rendered(&Response::Single(descriptor), false);
        assert!(result.is_ok());
        assert_eq!(text, format!("{URL}\n"));
    }

    #[rstest]
    fn single_response_prints_json_descriptor(descriptor: ArtifactDescriptor) {
        let (result, text) = rendered(&Response::Single(descriptor), true);
        assert!(result.is_ok());

        let value: serde_json::Value = serde_json::from_str(&text).expect("valid JSON");
        assert_eq!(value["name"], "mongodb");
        assert_eq!(value["version"], "3.0.7");
        assert_eq!(value["url"], URL);
    }

    #[rstest]
    #[case::plain(false)]
    #[case::json(true)]
    fn batch_with_failure_prints_everything_then_fails(
        descriptor: ArtifactDescriptor,
        #[case] json: bool,
    ) {
        let mut results = BatchResults::new();
        results.insert("3.0.7".to_owned(), Ok(descriptor));
        results.insert(
            "9.9.9".to_owned(),
            Err(ResolveError::NotFound {
                request: "9.9.9".to_owned(),
            }),
        );

        let (result, text) = rendered(&Response::Batch(results), json);
        assert!(matches!(
            result,
            Err(CliError::BatchFailed {
                failed: 1,
                total: 2
            })
        ));
        assert!(text.contains(URL));
        assert!(text.contains("could not find a MongoDB version"));
    }

    #[test]
    fn request_defaults_to_command_line_selector() {
        let cli = Cli::parse_from(["mongodb-download-url", "stable", "--enterprise"]);
        let request = read_request(&cli, &mut std::io::empty()).expect("request");
        let Request::Single(options) = request else {
            panic!("expected single request");
        };
        assert_eq!(options.version, "stable");
        assert!(options.enterprise);
    }

    #[test]
    fn request_is_read_from_stdin() {
        let cli = Cli::parse_from(["mongodb-download-url", "--request", "-"]);
        let mut stdin = br#"[{"version":"3.0.x"},{"version":"latest"}]"#.as_slice();
        let request = read_request(&cli, &mut stdin).expect("request");
        assert!(matches!(request, Request::Batch(ref items) if items.len() == 2));
    }

    #[test]
    fn request_file_errors_name_the_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.json");
        let path = path.to_str().expect("UTF-8 path");
        let cli = Cli::parse_from(["mongodb-download-url", "--request", path]);

        let err = read_request(&cli, &mut std::io::empty()).expect_err("missing file");
        assert!(matches!(err, CliError::RequestRead { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn malformed_request_is_rejected() {
        let cli = Cli::parse_from(["mongodb-download-url", "--request", "-"]);
        let mut stdin = b"{\"bits\": 64}".as_slice();
        let err = read_request(&cli, &mut stdin).expect_err("no version");
        assert!(matches!(err, CliError::RequestParse(_)));
    }
}
