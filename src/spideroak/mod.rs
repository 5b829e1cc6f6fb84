//! Run `SpiderOak --space` and parse its space report
//!
//! The client prints a fixed, positional layout, at least four lines long:
//!
//! ```text
//! Recalculating space usage (this may take a moment...)
//! Space usage by category: {'': 20792934558L, 'Documents': 129539767}
//! Space usage by device: [{'storage_used': 233893, 'device_desc': u'Work Laptop', 'device_id': 1}]
//! Space of all stored files (if uncompressed and not deduplicated): 51771775477L
//! ```
//!
//! The first line is a banner and is ignored. The second and third lines are
//! python-ish literals handled by the [`literal`](literal/index.html) module,
//! the last line carries the total byte count after its final colon. Byte
//! counts routinely exceed 2^31, so everything is a `u64`.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::process::Command;
use std::result::Result as StdResult;
use std::str::FromStr;

pub mod literal;

use self::literal::{Literal, LiteralError};

/// The command whose output we check
pub const SPIDEROAK_BIN: &str = "/usr/bin/SpiderOak";

pub type Result<T> = StdResult<T, ReportError>;

/// Everything the client reports about account space usage
///
/// Built once per check from the command output and read-only after that.
#[derive(Debug, PartialEq)]
pub struct SpaceReport {
    /// Total bytes stored, from the last line of the report
    pub total_bytes: u64,
    /// Bytes used per backup category; the empty string is a real category
    pub categories: HashMap<String, u64>,
    /// Per-device usage, in the order the client reported it
    pub devices: Vec<Device>,
}

/// One backed-up device
///
/// Device names are unique in well-formed reports but nothing enforces that,
/// so lookups take the first match.
#[derive(Debug, PartialEq)]
pub struct Device {
    pub name: String,
    pub bytes_used: u64,
}

/// Everything that can go wrong between us and a usable `SpaceReport`
///
/// All of these mean the monitored client is unreachable or misbehaving, so
/// the check script reports every one of them as `CRITICAL`.
#[derive(Debug)]
pub enum ReportError {
    /// The client binary could not be run at all
    Io(io::Error),
    /// The client ran but exited non-zero
    Failed { code: Option<i32>, stderr: String },
    /// Fewer than the four lines the report always has
    Truncated(usize),
    /// The category mapping on line 1 did not tokenize
    Categories(LiteralError),
    /// The device sequence on line 2 did not tokenize
    Devices(LiteralError),
    /// A literal tokenized but did not have the expected shape
    Shape {
        section: &'static str,
        expected: &'static str,
    },
    /// The byte count on the last line is not a non-negative integer
    Total(String),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::ReportError::*;
        match self {
            Io(e) => write!(f, "unable to run {} --space: {}", SPIDEROAK_BIN, e),
            Failed { code, stderr } => {
                let code = code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_owned());
                write!(f, "{} --space exited {}: {}", SPIDEROAK_BIN, code, stderr)
            }
            Truncated(n) => write!(
                f,
                "expected at least 4 lines of space report, got {}",
                n
            ),
            Categories(e) => write!(f, "bad category mapping on line 1: {}", e),
            Devices(e) => write!(f, "bad device list on line 2: {}", e),
            Shape { section, expected } => {
                write!(f, "expected {} in the {} report", expected, section)
            }
            Total(raw) => write!(f, "bad total byte count {:?} on last line", raw),
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(e: io::Error) -> ReportError {
        ReportError::Io(e)
    }
}

impl SpaceReport {
    /// Ask the client for its space report and parse it
    ///
    /// This blocks until the client finishes; there is no timeout here, the
    /// monitoring supervisor's own check timeout is the recovery path.
    pub fn load() -> Result<SpaceReport> {
        let output = Command::new(SPIDEROAK_BIN).arg("--space").output()?;
        if !output.status.success() {
            return Err(ReportError::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        String::from_utf8_lossy(&output.stdout).parse()
    }

    /// Bytes used by a named category, if the client knows it
    pub fn category(&self, name: &str) -> Option<u64> {
        self.categories.get(name).cloned()
    }

    /// The first device with a matching name
    pub fn device(&self, name: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.name == name)
    }
}

impl FromStr for SpaceReport {
    type Err = ReportError;

    fn from_str(raw: &str) -> Result<SpaceReport> {
        let lines: Vec<&str> = raw.lines().collect();
        if lines.len() < 4 {
            return Err(ReportError::Truncated(lines.len()));
        }

        // the interesting part of each line sits after a fixed marker; the
        // marker text itself never appears twice, but taking the last split
        // keeps us honest if the banner wording ever changes
        let categories = rest_after(lines[1], "category:")
            .parse::<Literal>()
            .map_err(ReportError::Categories)?;
        let devices = rest_after(lines[2], "device:")
            .parse::<Literal>()
            .map_err(ReportError::Devices)?;
        let total = rest_after(lines[lines.len() - 1], ":");

        Ok(SpaceReport {
            total_bytes: parse_total(total)?,
            categories: category_map(categories)?,
            devices: device_list(devices)?,
        })
    }
}

fn rest_after<'a>(line: &'a str, marker: &str) -> &'a str {
    line.rsplit(marker).next().unwrap_or(line).trim()
}

fn parse_total(raw: &str) -> Result<u64> {
    let digits = raw.strip_suffix('L').unwrap_or(raw);
    digits
        .parse()
        .map_err(|_| ReportError::Total(raw.to_owned()))
}

fn category_map(parsed: Literal) -> Result<HashMap<String, u64>> {
    let entries = match parsed {
        Literal::Map(entries) => entries,
        _ => {
            return Err(ReportError::Shape {
                section: "category",
                expected: "a mapping of name to bytes",
            })
        }
    };
    let mut categories = HashMap::with_capacity(entries.len());
    for (name, value) in entries {
        match value {
            Literal::Int(bytes) => {
                categories.insert(name, bytes);
            }
            _ => {
                return Err(ReportError::Shape {
                    section: "category",
                    expected: "an integer byte count per category",
                })
            }
        }
    }
    Ok(categories)
}

fn device_list(parsed: Literal) -> Result<Vec<Device>> {
    let records = match parsed {
        Literal::Seq(records) => records,
        _ => {
            return Err(ReportError::Shape {
                section: "device",
                expected: "a sequence of device records",
            })
        }
    };
    let mut devices = Vec::with_capacity(records.len());
    for record in records {
        devices.push(device_record(record)?);
    }
    Ok(devices)
}

fn device_record(record: Literal) -> Result<Device> {
    let fields = match record {
        Literal::Map(fields) => fields,
        _ => {
            return Err(ReportError::Shape {
                section: "device",
                expected: "a record per device",
            })
        }
    };
    let mut name = None;
    let mut bytes_used = None;
    // records also carry a device_id and whatever else future client
    // versions add; only these two fields matter to us
    for (key, value) in fields {
        match (&*key, value) {
            ("device_desc", Literal::Str(desc)) => name = Some(desc),
            ("storage_used", Literal::Int(bytes)) => bytes_used = Some(bytes),
            _ => {}
        }
    }
    match (name, bytes_used) {
        (Some(name), Some(bytes_used)) => Ok(Device { name, bytes_used }),
        (None, _) => Err(ReportError::Shape {
            section: "device",
            expected: "a device_desc string in every record",
        }),
        (_, None) => Err(ReportError::Shape {
            section: "device",
            expected: "a storage_used byte count in every record",
        }),
    }
}
