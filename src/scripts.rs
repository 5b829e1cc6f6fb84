//! Documentation for the check script contained herein
//!
//! # check-spideroak
//!
//! Asks the locally installed SpiderOak client for its space report
//! (`SpiderOak --space`) and compares one usage figure against warning and
//! critical thresholds. Exits 0/1/2 for OK/WARNING/CRITICAL in the usual
//! monitoring-plugin way; every operational failure (client missing, client
//! exited non-zero, unparseable report, unknown category or device) is
//! reported as CRITICAL rather than crashing.
//!
//! ```plain
//! $ check-spideroak --help
//! check-spideroak (part of spideroak-plugins) 0.1.0
//! Check how space is used on a SpiderOak account.
//!
//! Reads the space report of the locally installed SpiderOak client and compares one usage figure
//! against the warning and critical thresholds. Thresholds are megabytes, or percentages in
//! percent mode.
//!
//! USAGE:
//!     check-spideroak [OPTIONS]
//!
//! FLAGS:
//!     -h, --help       Prints help information
//!     -V, --version    Prints version information
//!
//! OPTIONS:
//!     -c, --category <category>    Category to check (category mode only)
//!     -C, --critical <critical>    Critical level of space used, in MB (percent mode: a
//!                                  percentage). Must be more than warning.
//!     -d, --device <device>        Device to check (device mode only)
//!     -m, --mode <mode>            Mode of operation: total, percent, category or device
//!                                  [default: total]
//!     -q, --quota <quota>          Total account quota in MB (percent mode only) [default: 5120]
//!     -W, --warning <warning>      Warning level of space used, in MB (percent mode: a
//!                                  percentage). Must be less than critical.
//!
//! Examples:
//!
//!     check-spideroak -m total -W 3072 -C 5120
//!         Check total usage, warn if over 3072MB, critical if over 5120MB.
//!
//!     check-spideroak -m device -d mylaptop -W 1024 -C 2048
//!         Check usage of 'mylaptop', warn at 1024MB, critical at 2048MB.
//!
//!     check-spideroak -m percent -q 8192 -W 80 -C 90
//!         Check total usage against an 8GB quota. Warn at 80%, critical at 90%.
//! ```
//!
//! The status line carries performance data for the supervisor to graph:
//!
//! ```plain
//! OK: Total space current usage :123.456MB |Used=123.456 MB
//! WARNING: Total space is at 81.25% of a 5120MB quota, current usage :4160.000MB |Used=4160.000 MB |Percent=81.25 %
//! ```
