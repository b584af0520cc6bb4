use crate::run::cli::{CliOptions, OutputFormat};
use std::fmt::{Display, Formatter};
use std::io;
use std::io::Write;

/// A CLI-level failure: engine errors plus everything around them (file I/O).
#[derive(Debug)]
pub enum Error {
    Engine { query: String, error: crate::Error },
    FileRead(Input, io::Error),
}

#[derive(Debug)]
pub enum Input {
    Stdin,
    File(String),
}

impl Display for Input {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Stdin => f.write_str("stdin"),
            Input::File(file) => write!(f, "file {file:?}"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Engine {
                query,
                error: crate::Error::Compile(compile_error),
            } => {
                // the span-underlined rendering needs the query text
                writeln!(f, "Error evaluating query:")?;
                writeln!(f, "{}", compile_error.to_string_with(query))
            }
            Error::Engine { error, .. } => writeln!(f, "{error}"),
            Error::FileRead(input, err) => writeln!(f, "{err} while reading {input}"),
        }
    }
}

/// The CLI's view of the operating system, so integration tests can run fully in memory.
pub trait OsFacade {
    fn read_stdin(&self) -> io::Result<String>;
    fn read_file(&self, path: &str) -> io::Result<String>;
    fn stdout(&mut self) -> impl Write;
    fn write_error(&mut self, err: Error);

    fn read_all(&self, paths: &[String]) -> Result<String, Error> {
        if paths.is_empty() {
            return self.read_stdin().map_err(|err| Error::FileRead(Input::Stdin, err));
        }
        let mut contents = String::new();
        let mut have_read_stdin = false;
        for path in paths {
            if path == "-" {
                if !have_read_stdin {
                    contents.push_str(&self.read_stdin().map_err(|err| Error::FileRead(Input::Stdin, err))?);
                    have_read_stdin = true;
                }
            } else {
                let path_contents = self
                    .read_file(path)
                    .map_err(|err| Error::FileRead(Input::File(path.to_string()), err))?;
                contents.push_str(&path_contents);
            }
        }
        Ok(contents)
    }
}

/// Runs the CLI. Returns whether anything matched (conversion mode always "matches").
pub fn run(cli: &CliOptions, os: &mut impl OsFacade) -> bool {
    match run_or_error(cli, os) {
        Ok(found) => found,
        Err(err) => {
            os.write_error(err);
            false
        }
    }
}

fn run_or_error(cli: &CliOptions, os: &mut impl OsFacade) -> Result<bool, Error> {
    let contents = os.read_all(&cli.input_paths())?;

    if cli.html_to_markdown {
        let markdown = crate::html_to_markdown(&contents, &cli.conversion_options());
        if !cli.quiet {
            let mut stdout = os.stdout();
            let _ = write!(stdout, "{markdown}");
        }
        return Ok(true);
    }

    let query = cli.query.clone().unwrap_or_default();
    let result = crate::run(&query, &contents, &cli.options()).map_err(|error| Error::Engine {
        query: query.clone(),
        error,
    })?;

    let found_any = !result.is_empty();
    if !cli.quiet {
        let mut stdout = os.stdout();
        match cli.output {
            OutputFormat::Markdown | OutputFormat::Md => {
                let text = result.text();
                if !text.is_empty() {
                    let _ = writeln!(stdout, "{text}");
                }
            }
            OutputFormat::Json => {
                let _ = serde_json::to_writer(&mut stdout, &result);
                let _ = writeln!(stdout);
            }
        }
    }
    Ok(found_any)
}
