use serde::Deserialize;
use structopt::StructOpt;

static AFTER_HELP: &str = "Examples:

    check-spideroak -m total -W 3072 -C 5120
        Check total usage, warn if over 3072MB, critical if over 5120MB.

    check-spideroak -m device -d mylaptop -W 1024 -C 2048
        Check usage of 'mylaptop', warn at 1024MB, critical at 2048MB.

    check-spideroak -m percent -q 8192 -W 80 -C 90
        Check total usage against an 8GB quota. Warn at 80%, critical at 90%.";

/// Check how space is used on a SpiderOak account.
///
/// Reads the space report of the locally installed SpiderOak client and
/// compares one usage figure against the warning and critical thresholds.
/// Thresholds are megabytes, or percentages in percent mode.
#[derive(Deserialize, StructOpt, Debug)]
#[structopt(
    name = "check-spideroak (part of spideroak-plugins)",
    raw(setting = "structopt::clap::AppSettings::ColoredHelp"),
    raw(after_help = "AFTER_HELP")
)]
pub(crate) struct Args {
    #[structopt(
        short = "m",
        long = "mode",
        default_value = "total",
        help = "Mode of operation: total, percent, category or device"
    )]
    pub mode: String,
    #[structopt(
        short = "c",
        long = "category",
        help = "Category to check (category mode only)"
    )]
    pub category: Option<String>,
    #[structopt(
        short = "d",
        long = "device",
        help = "Device to check (device mode only)"
    )]
    pub device: Option<String>,
    // the number flags stay strings here so that a malformed value comes out
    // as a CRITICAL verdict instead of a usage error (supervisors read a
    // usage-error exit code as WARNING)
    #[structopt(
        short = "q",
        long = "quota",
        default_value = "5120",
        raw(allow_hyphen_values = "true"),
        help = "Total account quota in MB (percent mode only)"
    )]
    pub quota: String,
    #[structopt(
        short = "W",
        long = "warning",
        raw(allow_hyphen_values = "true"),
        help = "Warning level of space used, in MB (percent mode: a percentage). \
                Must be less than critical."
    )]
    pub warning: Option<String>,
    #[structopt(
        short = "C",
        long = "critical",
        raw(allow_hyphen_values = "true"),
        help = "Critical level of space used, in MB (percent mode: a percentage). \
                Must be more than warning."
    )]
    pub critical: Option<String>,
}
