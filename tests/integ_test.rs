use clap::Parser;
use mq::run::{CliOptions, Error, OsFacade};
use std::io;
use std::io::ErrorKind;

#[derive(Debug)]
struct Case<const N: usize> {
    cli_args: [&'static str; N],
    stdin: &'static str,
    files: &'static [(&'static str, &'static str)],
    expect_output: &'static str,
    /// Checked with `contains`, since compile errors render multi-line span diagnostics.
    expect_error: &'static str,
    expect_success: bool,
}

impl<const N: usize> Default for Case<N> {
    fn default() -> Self {
        Self {
            cli_args: [""; N],
            stdin: "",
            files: &[],
            expect_output: "",
            expect_error: "",
            expect_success: true,
        }
    }
}

struct TestOs<'a> {
    stdin: &'a str,
    files: &'a [(&'a str, &'a str)],
    out: Vec<u8>,
    err: String,
}

impl OsFacade for TestOs<'_> {
    fn read_stdin(&self) -> io::Result<String> {
        Ok(self.stdin.to_string())
    }

    fn read_file(&self, path: &str) -> io::Result<String> {
        for (name, content) in self.files {
            if path == *name {
                return Ok(content.to_string());
            }
        }
        Err(io::Error::new(ErrorKind::NotFound, format!("File not found: {path}")))
    }

    fn stdout(&mut self) -> impl io::Write {
        &mut self.out
    }

    fn write_error(&mut self, err: Error) {
        self.err.push_str(&err.to_string());
    }
}

impl<const N: usize> Case<N> {
    fn check(&self) {
        let cli = CliOptions::try_parse_from(["mq"].iter().chain(&self.cli_args)).unwrap();
        let mut os = TestOs {
            stdin: self.stdin,
            files: self.files,
            out: Vec::new(),
            err: String::new(),
        };
        let success = mq::run::run(&cli, &mut os);
        let out = String::from_utf8(os.out).unwrap();
        assert_eq!(out, self.expect_output, "stdout for {:?}", self.cli_args);
        if self.expect_error.is_empty() {
            assert_eq!(os.err, "", "stderr for {:?}", self.cli_args);
        } else {
            assert!(
                os.err.contains(self.expect_error),
                "stderr for {:?}: expected {:?} within {:?}",
                self.cli_args,
                self.expect_error,
                os.err
            );
        }
        assert_eq!(success, self.expect_success, "exit status for {:?}", self.cli_args);
    }
}

#[test]
fn h1_from_stdin() {
    Case {
        cli_args: [".h1"],
        stdin: "# Hello World\n\n## Heading2\n\nText",
        expect_output: "# Hello World\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn piped_select() {
    Case {
        cli_args: [r#".h2 | select(contains("Feature"))"#],
        stdin: "# Product\n\n## Features\n\nText\n\n## Installation\n\nMore text",
        expect_output: "## Features\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn list_items_in_order() {
    Case {
        cli_args: [".[]"],
        stdin: "# List\n\n- Item 1\n- Item 2\n- Item 3",
        expect_output: "- Item 1\n- Item 2\n- Item 3\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn json_output() {
    Case {
        cli_args: ["-o", "json", ".h2"],
        stdin: "# T\n\n## Heading2A\n\nx\n\n## Heading2B",
        expect_output: "[\"## Heading2A\",\"## Heading2B\"]\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn no_match_fails_exit_code() {
    Case {
        cli_args: [".h3"],
        stdin: "# only a title",
        expect_output: "",
        expect_success: false,
        ..Case::default()
    }
    .check();
}

#[test]
fn quiet_suppresses_output() {
    Case {
        cli_args: ["--quiet", ".h1"],
        stdin: "# Hello",
        expect_output: "",
        ..Case::default()
    }
    .check();
}

#[test]
fn reads_named_files_in_order() {
    Case {
        cli_args: [".h1", "a.md", "b.md"],
        files: &[("a.md", "# First\n"), ("b.md", "# Second\n")],
        expect_output: "# First\n# Second\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn missing_file_reports_error() {
    Case {
        cli_args: [".h1", "nope.md"],
        expect_error: "while reading file \"nope.md\"",
        expect_success: false,
        ..Case::default()
    }
    .check();
}

#[test]
fn invalid_query_reports_evaluating_error() {
    Case {
        cli_args: [".invalid_selector!!!"],
        stdin: "# Heading",
        expect_error: "Error evaluating query",
        expect_success: false,
        ..Case::default()
    }
    .check();
}

#[test]
fn text_input_format() {
    Case {
        cli_args: ["--input-format", "text", r#"select(contains("2"))"#],
        stdin: "Line 1\nLine 2\nLine 3",
        expect_output: "Line 2\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn mdx_input_format() {
    Case {
        cli_args: ["--input-format", "mdx", "select(is_mdx())"],
        stdin: "# MDX Content\n\n<Component />",
        expect_output: "<Component />\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn html_input_format_matches_rendered_markdown() {
    Case {
        cli_args: ["--input-format", "html", r#"select(contains("Hello"))"#],
        stdin: "<h1>Hello</h1><p>World</p>",
        expect_output: "# Hello\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn list_style_flag() {
    Case {
        cli_args: ["--list-style", "star", ".[]"],
        stdin: "- Item 1\n- Item 2",
        expect_output: "* Item 1\n* Item 2\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn html_to_markdown_mode() {
    Case {
        cli_args: ["--html-to-markdown"],
        stdin: "<h1>Hello World</h1><p>This is a <strong>test</strong>.</p>",
        expect_output: "# Hello World\n\nThis is a **test**.\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn html_to_markdown_title_as_h1() {
    Case {
        cli_args: ["--html-to-markdown", "--title-as-h1"],
        stdin: "<html><head><title>Page Title</title></head><body><h1>Content</h1></body></html>",
        expect_output: "# Page Title\n\n# Content\n",
        ..Case::default()
    }
    .check();
}

#[test]
fn html_to_markdown_front_matter() {
    Case {
        cli_args: ["--html-to-markdown", "--front-matter"],
        stdin: "<html><head><title>Doc</title></head><body><p>body</p></body></html>",
        expect_output: "---\ntitle: Doc\n---\n\nbody\n",
        ..Case::default()
    }
    .check();
}
