//! Nagios-style check plugins for SpiderOak backup accounts
//!
//! The interesting code lives in two places:
//!
//! * [`spideroak`](spideroak/index.html) knows how to run `SpiderOak --space`
//!   and turn its legacy text report into typed facts
//! * [`Status`](enum.Status.html) is the standard monitoring-plugin verdict,
//!   shared by every threshold comparison and by the process exit code
//!
//! See [`scripts`](scripts/index.html) for the documentation of the installed
//! check script itself.

use std::fmt;
use std::process;

pub mod scripts;
pub mod spideroak;

/// A monitoring-plugin verdict, in increasing order of severity
///
/// `Unknown` and `Dependent` are part of the standard taxonomy and exist so
/// that exit codes round-trip with the supervisor, but the space checks never
/// produce them themselves: any operational failure is reported as
/// `Critical`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
    Dependent,
}

impl Status {
    /// The exit code that tells the monitoring supervisor our verdict
    pub fn exit_code(self) -> i32 {
        use crate::Status::*;
        match self {
            Ok => 0,
            Warning => 1,
            Critical => 2,
            Unknown => 3,
            Dependent => 4,
        }
    }

    /// Exit the process with the appropriate code
    pub fn exit(self) -> ! {
        process::exit(self.exit_code())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use crate::Status::*;
        let name = match *self {
            Ok => "OK",
            Warning => "WARNING",
            Critical => "CRITICAL",
            Unknown => "UNKNOWN",
            Dependent => "DEPENDENT",
        };
        write!(f, "{}", name)
    }
}
