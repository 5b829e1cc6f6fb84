//! Pick the usage figure the operator asked about and judge it

use spideroak_plugins::spideroak::SpaceReport;
use spideroak_plugins::Status;

use crate::args::Args;

pub(crate) const BYTES_PER_MB: u64 = 1 << 20;

/// Which usage figure gets compared against the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Total,
    Percent,
    Category,
    Device,
}

impl Mode {
    /// Resolve a requested mode string
    ///
    /// The historical interface matched loosely: any mode string *containing*
    /// a keyword selects that mode, keywords tried in this order. So
    /// "totally" means total, and so does "devicetotal". Kept for
    /// compatibility with existing supervisor configs.
    pub fn matching(requested: &str) -> Option<Mode> {
        let requested = requested.to_lowercase();
        if requested.contains("total") {
            Some(Mode::Total)
        } else if requested.contains("percent") {
            Some(Mode::Percent)
        } else if requested.contains("category") {
            Some(Mode::Category)
        } else if requested.contains("device") {
            Some(Mode::Device)
        } else {
            None
        }
    }
}

/// A validated check request: a resolved mode, thresholds, and the quota
///
/// Thresholds are kept in the unit the operator gave them in (MB, or percent
/// in percent mode) and converted where they are compared.
#[derive(Debug, PartialEq)]
pub(crate) struct Check {
    pub mode: Mode,
    pub warn: u64,
    pub crit: u64,
    pub quota: u64,
}

impl Check {
    /// Validate the request, before the client is ever invoked
    ///
    /// Threshold problems are reported ahead of mode problems, so a missing
    /// threshold gives the same message no matter what mode was asked for.
    pub fn from_args(args: &Args) -> Result<Check, String> {
        let (warn, crit) = match (&args.warning, &args.critical) {
            (Some(warn), Some(crit)) => (
                parse_amount("Warning", warn)?,
                parse_amount("Critical", crit)?,
            ),
            _ => return Err("Both warning and critical values must be supplied.".to_owned()),
        };
        if warn >= crit {
            return Err("Critical must be more than warning.".to_owned());
        }
        let quota = parse_amount("Quota", &args.quota)?;
        let mode = Mode::matching(&args.mode).ok_or_else(|| {
            format!(
                "You must specify a valid mode, not '{}'. \
                 Options are: total, percent, category or device.",
                args.mode
            )
        })?;
        if mode == Mode::Percent && (warn > 100 || crit > 100) {
            return Err(
                "You cannot specify thresholds above 100% in percent mode.".to_owned(),
            );
        }
        // warn is below crit, so checking crit covers both conversions
        if mode != Mode::Percent && crit.checked_mul(BYTES_PER_MB).is_none() {
            return Err(format!(
                "Thresholds over {}MB cannot be expressed in bytes.",
                u64::max_value() / BYTES_PER_MB
            ));
        }
        Ok(Check {
            mode,
            warn,
            crit,
            quota,
        })
    }

    fn warn_bytes(&self) -> u64 {
        self.warn.saturating_mul(BYTES_PER_MB)
    }

    fn crit_bytes(&self) -> u64 {
        self.crit.saturating_mul(BYTES_PER_MB)
    }
}

fn parse_amount(what: &str, raw: &str) -> Result<u64, String> {
    raw.parse()
        .map_err(|_| format!("{} must be a non-negative integer, not '{}'.", what, raw))
}

/// The one threshold rule every mode shares
///
/// Boundary values belong to the higher-severity band: a value exactly equal
/// to a threshold already triggers it.
pub(crate) fn classify<T: PartialOrd>(value: T, warn: T, crit: T) -> Status {
    if value < warn {
        Status::Ok
    } else if value < crit {
        Status::Warning
    } else {
        Status::Critical
    }
}

/// Percent of the quota used, or `None` for a zero quota
pub(crate) fn percent_used(used_bytes: u64, quota_mb: u64) -> Option<f64> {
    if quota_mb == 0 {
        return None;
    }
    Some(used_bytes as f64 / (quota_mb as f64 * BYTES_PER_MB as f64) * 100.0)
}

pub(crate) fn mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB as f64
}

/// Compare the selected figure against the thresholds, print the status
/// line, and say how it went
pub(crate) fn do_check(check: &Check, args: &Args, report: &SpaceReport) -> Status {
    match check.mode {
        Mode::Total => judge("Total space", report.total_bytes, check),
        Mode::Percent => match percent_used(report.total_bytes, check.quota) {
            None => {
                println!("CRITICAL: Quota must be greater than zero to compute a percentage.");
                Status::Critical
            }
            Some(percent) => {
                let status = classify(percent, check.warn as f64, check.crit as f64);
                println!(
                    "{}: Total space is at {:.2}% of a {}MB quota, \
                     current usage :{:.3}MB |Used={:.3} MB |Percent={:.2} %",
                    status,
                    percent,
                    check.quota,
                    mb(report.total_bytes),
                    mb(report.total_bytes),
                    percent
                );
                status
            }
        },
        Mode::Category => {
            let name = match args.category {
                Some(ref name) => name,
                None => {
                    println!("CRITICAL: Category mode requires -c/--category.");
                    return Status::Critical;
                }
            };
            match report.category(name) {
                None => {
                    println!("CRITICAL: Category '{}' not found.", name);
                    Status::Critical
                }
                Some(bytes) => judge(&format!("Category '{}'", name), bytes, check),
            }
        }
        Mode::Device => {
            let name = match args.device {
                Some(ref name) => name,
                None => {
                    println!("CRITICAL: Device mode requires -d/--device.");
                    return Status::Critical;
                }
            };
            match report.device(name) {
                None => {
                    println!("CRITICAL: Device '{}' not found.", name);
                    Status::Critical
                }
                Some(device) => judge(&format!("Device '{}'", name), device.bytes_used, check),
            }
        }
    }
}

fn judge(what: &str, bytes: u64, check: &Check) -> Status {
    let status = classify(bytes, check.warn_bytes(), check.crit_bytes());
    println!(
        "{}: {} current usage :{:.3}MB |Used={:.3} MB",
        status,
        what,
        mb(bytes),
        mb(bytes)
    );
    status
}

#[cfg(test)]
mod test {
    use structopt::StructOpt;

    use spideroak_plugins::spideroak::SpaceReport;
    use spideroak_plugins::Status;

    use super::{classify, do_check, mb, percent_used, Check, Mode, BYTES_PER_MB};
    use crate::args::Args;

    fn build_args(argv: Vec<&str>) -> Args {
        Args::from_iter(argv.into_iter())
    }

    fn sample_report() -> SpaceReport {
        // 300MB total, a 75MB device, two categories
        let raw = format!(
            "banner\n\
             Space usage by category: {{'': {}, 'Docs': {}}}\n\
             Space usage by device: [{{'storage_used': {}, 'device_desc': 'A'}}]\n\
             Total: {}\n",
            250 * BYTES_PER_MB,
            50 * BYTES_PER_MB,
            75 * BYTES_PER_MB,
            300 * BYTES_PER_MB,
        );
        raw.parse().unwrap()
    }

    #[test]
    fn classify_puts_boundaries_in_the_higher_band() {
        assert_eq!(classify(199u64, 200, 300), Status::Ok);
        assert_eq!(classify(200u64, 200, 300), Status::Warning);
        assert_eq!(classify(299u64, 200, 300), Status::Warning);
        assert_eq!(classify(300u64, 200, 300), Status::Critical);
        assert_eq!(classify(301u64, 200, 300), Status::Critical);
    }

    #[test]
    fn classify_is_monotonic() {
        let mut worst = Status::Ok;
        for value in 0..500u64 {
            let status = classify(value, 200, 300);
            assert!(status >= worst, "classification went down at {}", value);
            worst = status;
        }
    }

    #[test]
    fn mode_matching_is_loose_and_ordered() {
        assert_eq!(Mode::matching("total"), Some(Mode::Total));
        assert_eq!(Mode::matching("TOTAL"), Some(Mode::Total));
        assert_eq!(Mode::matching("totally"), Some(Mode::Total));
        assert_eq!(Mode::matching("percent"), Some(Mode::Percent));
        assert_eq!(Mode::matching("my-category"), Some(Mode::Category));
        assert_eq!(Mode::matching("device"), Some(Mode::Device));
        // "total" wins over the later keywords
        assert_eq!(Mode::matching("devicetotal"), Some(Mode::Total));
        assert_eq!(Mode::matching("percenttotal"), Some(Mode::Total));
        assert_eq!(Mode::matching("nonsense"), None);
        assert_eq!(Mode::matching(""), None);
    }

    #[test]
    fn both_thresholds_are_required() {
        for argv in vec![
            vec!["check-spideroak"],
            vec!["check-spideroak", "-W", "100"],
            vec!["check-spideroak", "-C", "200"],
            vec!["check-spideroak", "-m", "percent", "-W", "80"],
            // even with a mode that is itself invalid
            vec!["check-spideroak", "-m", "nonsense", "-C", "200"],
        ] {
            let err = Check::from_args(&build_args(argv)).unwrap_err();
            assert_eq!(err, "Both warning and critical values must be supplied.");
        }
    }

    #[test]
    fn critical_must_exceed_warning() {
        let args = build_args(vec!["check-spideroak", "-W", "200", "-C", "200"]);
        assert_eq!(
            Check::from_args(&args).unwrap_err(),
            "Critical must be more than warning."
        );
    }

    #[test]
    fn percent_mode_rejects_thresholds_over_100() {
        let args = build_args(vec!["check-spideroak", "-m", "percent", "-W", "80", "-C", "110"]);
        assert!(Check::from_args(&args).unwrap_err().contains("100%"));

        // the same thresholds are fine in an absolute mode
        let args = build_args(vec!["check-spideroak", "-m", "total", "-W", "80", "-C", "110"]);
        assert!(Check::from_args(&args).is_ok());
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let args = build_args(vec!["check-spideroak", "-m", "nonsense", "-W", "1", "-C", "2"]);
        assert!(Check::from_args(&args).unwrap_err().contains("valid mode"));
    }

    #[test]
    fn thresholds_convert_to_bytes_for_absolute_modes() {
        let args = build_args(vec!["check-spideroak", "-W", "3072", "-C", "5120"]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(check.warn_bytes(), 3_221_225_472);
        assert_eq!(check.crit_bytes(), 5_368_709_120);
    }

    #[test]
    fn oversized_thresholds_are_an_argument_error() {
        // 2^44 MB does not fit in a u64 once converted to bytes; that has to
        // come out as a verdict, not an overflow
        let args = build_args(vec![
            "check-spideroak", "-W", "17592186044416", "-C", "17592186044417",
        ]);
        let err = Check::from_args(&args).unwrap_err();
        assert!(err.contains("cannot be expressed in bytes"), "got: {}", err);

        // the largest representable threshold still works
        let args = build_args(vec![
            "check-spideroak", "-W", "17592186044414", "-C", "17592186044415",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(check.crit_bytes(), 17_592_186_044_415 * BYTES_PER_MB);
    }

    #[test]
    fn malformed_numbers_are_an_argument_error() {
        let args = build_args(vec!["check-spideroak", "-W", "lots", "-C", "200"]);
        let err = Check::from_args(&args).unwrap_err();
        assert_eq!(err, "Warning must be a non-negative integer, not 'lots'.");

        let args = build_args(vec!["check-spideroak", "-W", "100", "-C", "-5"]);
        let err = Check::from_args(&args).unwrap_err();
        assert_eq!(err, "Critical must be a non-negative integer, not '-5'.");

        let args = build_args(vec![
            "check-spideroak", "-m", "percent", "-q", "8f", "-W", "80", "-C", "90",
        ]);
        let err = Check::from_args(&args).unwrap_err();
        assert_eq!(err, "Quota must be a non-negative integer, not '8f'.");
    }

    #[test]
    fn total_mode_bands() {
        let report = sample_report();

        let args = build_args(vec!["check-spideroak", "-W", "400", "-C", "500"]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Ok);

        let args = build_args(vec!["check-spideroak", "-W", "200", "-C", "400"]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Warning);

        // 300MB total is exactly the critical threshold
        let args = build_args(vec!["check-spideroak", "-W", "200", "-C", "300"]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Critical);
    }

    #[test]
    fn category_mode_looks_up_by_name() {
        let report = sample_report();

        let args = build_args(vec![
            "check-spideroak", "-m", "category", "-c", "Docs", "-W", "100", "-C", "200",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Ok);

        // the empty-string category is real and holds 250MB
        let args = build_args(vec![
            "check-spideroak", "-m", "category", "-c", "", "-W", "100", "-C", "200",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Critical);
    }

    #[test]
    fn unknown_category_is_critical_regardless_of_thresholds() {
        let report = sample_report();
        let args = build_args(vec![
            "check-spideroak", "-m", "category", "-c", "Missing", "-W", "999999", "-C", "9999999",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Critical);
    }

    #[test]
    fn device_mode_looks_up_by_name() {
        let report = sample_report();

        let args = build_args(vec![
            "check-spideroak", "-m", "device", "-d", "A", "-W", "50", "-C", "100",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Warning);

        let args = build_args(vec![
            "check-spideroak", "-m", "device", "-d", "B", "-W", "50", "-C", "100",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Critical);
    }

    #[test]
    fn missing_lookup_flag_is_critical() {
        let report = sample_report();
        for mode in &["category", "device"] {
            let args = build_args(vec!["check-spideroak", "-m", mode, "-W", "1", "-C", "2"]);
            let check = Check::from_args(&args).unwrap();
            assert_eq!(do_check(&check, &args, &report), Status::Critical);
        }
    }

    #[test]
    fn percent_mode_uses_the_quota() {
        let report = sample_report();

        // 300MB of a 600MB quota is 50%
        assert_eq!(percent_used(report.total_bytes, 600), Some(50.0));

        let args = build_args(vec![
            "check-spideroak", "-m", "percent", "-q", "600", "-W", "80", "-C", "90",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Ok);

        let args = build_args(vec![
            "check-spideroak", "-m", "percent", "-q", "600", "-W", "50", "-C", "90",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Warning);
    }

    #[test]
    fn zero_quota_is_critical_not_a_crash() {
        let report = sample_report();
        assert_eq!(percent_used(report.total_bytes, 0), None);

        let args = build_args(vec![
            "check-spideroak", "-m", "percent", "-q", "0", "-W", "80", "-C", "90",
        ]);
        let check = Check::from_args(&args).unwrap();
        assert_eq!(do_check(&check, &args, &report), Status::Critical);
    }

    #[test]
    fn mb_formatting_round_trips() {
        // the status line prints MB with 3 decimal places; reading that back
        // recovers the byte count to within half a kilobyte
        let bytes = 51_771_775_477u64;
        let printed = format!("{:.3}", mb(bytes));
        let recovered = printed.parse::<f64>().unwrap() * BYTES_PER_MB as f64;
        assert!((recovered - bytes as f64).abs() < BYTES_PER_MB as f64 / 1000.0);
    }
}
