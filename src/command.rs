//! Driver commands.
//!
//! One command per input line. `-` clears a project or cluster selection.

use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reload the project list.
    Projects,
    SelectProject(Option<String>),
    SelectCluster(Option<String>),
    /// Go to a 1-based page.
    Page(usize),
    NextPage,
    PreviousPage,
    /// Open the detail view of the n-th image on the current page (0-based).
    Open(usize),
    Close,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
projects            reload the project list
project <id>|-      select a project, or clear it
cluster <id>|-      select a cluster, or show every cluster
page <n>            go to page n
next | prev         change page
open <index>        open an image of the current page
close               close the detail view
show                print the current view
help                print this text
quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
}

impl std::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseCommandError::Empty => write!(f, "empty command"),
            ParseCommandError::Unknown(cmd) => write!(f, "unknown command: {}", cmd),
            ParseCommandError::MissingArgument(cmd) => write!(f, "{} needs an argument", cmd),
            ParseCommandError::InvalidNumber(arg) => write!(f, "not a number: {}", arg),
        }
    }
}

impl std::error::Error for ParseCommandError {}

fn selection(arg: &str) -> Option<String> {
    (arg != "-").then(|| arg.to_string())
}

fn number(arg: &str) -> Result<usize, ParseCommandError> {
    arg.parse()
        .map_err(|_| ParseCommandError::InvalidNumber(arg.to_string()))
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ParseCommandError::Empty);
        };
        let arg = words.next();

        let required = |cmd: &'static str| arg.ok_or(ParseCommandError::MissingArgument(cmd));

        match name {
            "projects" => Ok(Command::Projects),
            "project" => Ok(Command::SelectProject(selection(required("project")?))),
            "cluster" => Ok(Command::SelectCluster(selection(required("cluster")?))),
            "page" => Ok(Command::Page(number(required("page")?)?)),
            "next" | "n" => Ok(Command::NextPage),
            "prev" | "p" => Ok(Command::PreviousPage),
            "open" => Ok(Command::Open(number(required("open")?)?)),
            "close" => Ok(Command::Close),
            "show" | "ls" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}
