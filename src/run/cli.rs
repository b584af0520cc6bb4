use crate::doc::InputFormat;
use crate::html2md::ConversionOptions;
use crate::output::{ListStyle, TitleSurroundStyle, UrlSurroundStyle};
use crate::Options;
use clap::{Parser, ValueEnum};
use std::path::Path;

#[derive(Debug, Parser)]
#[command(name = "mq", version, about = "Query, filter, and transform Markdown, MDX, HTML, and plain-text documents")]
pub struct CliOptions {
    /// The query to run, e.g. '.h2 | select(contains("Feature"))'.
    ///
    /// In --html-to-markdown mode there is no query; the first positional argument is a file.
    pub query: Option<String>,

    /// Files to read. With none (or "-"), reads stdin.
    pub files: Vec<String>,

    /// Format of the input content. Inferred from the first file's extension when omitted.
    #[arg(long, value_enum)]
    pub input_format: Option<InputFormatArg>,

    /// Bullet marker for list items.
    #[arg(long, value_enum)]
    pub list_style: Option<ListStyleArg>,

    /// Quoting around link titles.
    #[arg(long, value_enum)]
    pub link_title_style: Option<TitleStyleArg>,

    /// Angle-bracket or bare link URLs.
    #[arg(long, value_enum)]
    pub link_url_style: Option<UrlStyleArg>,

    /// Result output format.
    #[arg(long, short = 'o', value_enum, default_value = "markdown")]
    pub output: OutputFormat,

    /// Convert HTML input to Markdown instead of running a query.
    #[arg(long)]
    pub html_to_markdown: bool,

    /// With --html-to-markdown: turn <script> bodies into fenced code blocks.
    #[arg(long)]
    pub extract_scripts: bool,

    /// With --html-to-markdown: emit <head> metadata as a leading front-matter block.
    #[arg(long)]
    pub front_matter: bool,

    /// With --html-to-markdown: emit the document <title> as a level-1 heading.
    #[arg(long)]
    pub title_as_h1: bool,

    /// Print nothing; the exit code still reflects whether anything matched.
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    /// Alias for markdown.
    Md,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormatArg {
    Markdown,
    Mdx,
    Text,
    Html,
    Raw,
    Null,
}

impl From<InputFormatArg> for InputFormat {
    fn from(value: InputFormatArg) -> Self {
        match value {
            InputFormatArg::Markdown => InputFormat::Markdown,
            InputFormatArg::Mdx => InputFormat::Mdx,
            InputFormatArg::Text => InputFormat::Text,
            InputFormatArg::Html => InputFormat::Html,
            InputFormatArg::Raw => InputFormat::Raw,
            InputFormatArg::Null => InputFormat::Null,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListStyleArg {
    Dash,
    Plus,
    Star,
}

impl From<ListStyleArg> for ListStyle {
    fn from(value: ListStyleArg) -> Self {
        match value {
            ListStyleArg::Dash => ListStyle::Dash,
            ListStyleArg::Plus => ListStyle::Plus,
            ListStyleArg::Star => ListStyle::Star,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TitleStyleArg {
    Double,
    Single,
    Paren,
}

impl From<TitleStyleArg> for TitleSurroundStyle {
    fn from(value: TitleStyleArg) -> Self {
        match value {
            TitleStyleArg::Double => TitleSurroundStyle::Double,
            TitleStyleArg::Single => TitleSurroundStyle::Single,
            TitleStyleArg::Paren => TitleSurroundStyle::Paren,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum UrlStyleArg {
    Angle,
    None,
}

impl From<UrlStyleArg> for UrlSurroundStyle {
    fn from(value: UrlStyleArg) -> Self {
        match value {
            UrlStyleArg::Angle => UrlSurroundStyle::Angle,
            UrlStyleArg::None => UrlSurroundStyle::None,
        }
    }
}

impl CliOptions {
    /// Cross-flag checks that clap can't express. Prints to stderr and returns `false` on
    /// failure.
    pub fn extra_validation(&self) -> bool {
        if self.html_to_markdown {
            return true;
        }
        if self.query.is_none() {
            eprintln!("error: a query is required (or pass --html-to-markdown)");
            return false;
        }
        if self.extract_scripts || self.front_matter || self.title_as_h1 {
            eprintln!("error: --extract-scripts, --front-matter, and --title-as-h1 require --html-to-markdown");
            return false;
        }
        true
    }

    /// The files to read. In conversion mode the query positional is really the first file.
    pub(crate) fn input_paths(&self) -> Vec<String> {
        if self.html_to_markdown {
            self.query.iter().chain(self.files.iter()).cloned().collect()
        } else {
            self.files.clone()
        }
    }

    pub(crate) fn options(&self) -> Options {
        let input_format = self.input_format.map(InputFormat::from).or_else(|| self.inferred_format());
        Options {
            input_format,
            list_style: self.list_style.map(ListStyle::from),
            link_title_style: self.link_title_style.map(TitleSurroundStyle::from),
            link_url_style: self.link_url_style.map(UrlSurroundStyle::from),
        }
    }

    pub(crate) fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            extract_scripts_as_code_blocks: self.extract_scripts,
            generate_front_matter: self.front_matter,
            use_title_as_h1: self.title_as_h1,
        }
    }

    fn inferred_format(&self) -> Option<InputFormat> {
        let paths = self.input_paths();
        let first = paths.first()?;
        let extension = Path::new(first).extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "mdx" => Some(InputFormat::Mdx),
            "html" | "htm" => Some(InputFormat::Html),
            "txt" => Some(InputFormat::Text),
            _ => None,
        }
    }
}
