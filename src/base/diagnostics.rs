use std::cell::RefCell;
use std::fmt;

/// Defines the tags prefixing user-visible diagnostics
///
/// Downstream tooling detects failures by searching the process output for these tags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tag {
    /// Fatal problem detected by the basin simulator
    BasinError,

    /// Non-fatal problem detected by the basin simulator
    BasinWarning,

    /// Fatal problem reported by the startup layer
    MessageError,

    /// Non-fatal problem reported by the startup layer
    MessageWarning,
}

impl Tag {
    /// Returns the tag text
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::BasinError => "Basin_Error",
            Tag::BasinWarning => "Basin_Warning",
            Tag::MessageError => "MeSsAgE ERROR",
            Tag::MessageWarning => "MeSsAgE WARNING",
        }
    }

    /// Returns true if the tag marks a fatal problem
    pub fn is_error(&self) -> bool {
        matches!(self, Tag::BasinError | Tag::MessageError)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Writes tagged diagnostics on rank 0 and mirrors them to the log
///
/// Every rank keeps the history of the messages it was asked to report, so
/// callers (and tests) can inspect what would have been printed.
pub struct Diagnostics {
    /// Rank of the process owning this instance
    rank: usize,

    /// Holds every reported line (including the tag)
    history: RefCell<Vec<String>>,

    /// Disables printing to stdout/stderr (the log and the history are kept)
    quiet: bool,
}

impl Diagnostics {
    /// Allocates a new instance
    pub fn new(rank: usize) -> Self {
        Diagnostics {
            rank,
            history: RefCell::new(Vec::new()),
            quiet: false,
        }
    }

    /// Allocates an instance that never prints
    pub fn new_quiet(rank: usize) -> Self {
        Diagnostics {
            rank,
            history: RefCell::new(Vec::new()),
            quiet: true,
        }
    }

    /// Reports a tagged message
    pub fn report(&self, tag: Tag, message: &str) {
        let line = format!("{} {}", tag, message);
        if tag.is_error() {
            log::error!("{}", line);
        } else {
            log::warn!("{}", line);
        }
        if self.rank == 0 && !self.quiet {
            if tag.is_error() {
                eprintln!("{}", line);
            } else {
                println!("{}", line);
            }
        }
        self.history.borrow_mut().push(line);
    }

    /// Prints an untagged informative message on rank 0
    pub fn info(&self, message: &str) {
        log::info!("{}", message);
        if self.rank == 0 && !self.quiet {
            println!("{}", message);
        }
    }

    /// Returns a copy of all reported lines
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// Returns true if any reported line contains the given text
    pub fn contains(&self, text: &str) -> bool {
        self.history.borrow().iter().any(|line| line.contains(text))
    }

    /// Returns the number of reported errors
    pub fn error_count(&self) -> usize {
        let errors = [Tag::BasinError.as_str(), Tag::MessageError.as_str()];
        self.history
            .borrow()
            .iter()
            .filter(|line| errors.iter().any(|e| line.starts_with(e)))
            .count()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
