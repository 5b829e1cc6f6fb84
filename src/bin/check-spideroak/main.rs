//! Check space usage of a SpiderOak backup account

use structopt::StructOpt;

use spideroak_plugins::spideroak::SpaceReport;
use spideroak_plugins::Status;

mod args;
mod check;

use crate::args::Args;
use crate::check::Check;

#[cfg_attr(test, allow(dead_code))]
fn main() {
    let args = Args::from_args();

    // thresholds and mode are validated before the client is invoked
    let check = match Check::from_args(&args) {
        Ok(check) => check,
        Err(msg) => {
            println!("CRITICAL: {}", msg);
            Status::Critical.exit();
        }
    };

    let report = match SpaceReport::load() {
        Ok(report) => report,
        Err(e) => {
            println!("CRITICAL: {}", e);
            Status::Critical.exit();
        }
    };

    check::do_check(&check, &args, &report).exit();
}
