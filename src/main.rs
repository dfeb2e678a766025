//! gear-crud entry point
//!
//! Parses configuration, then hands off to `http_server::run`. A boot
//! failure is printed to stderr and exits non-zero.

use gear_crud::http_server::{self, GearConfig};

#[tokio::main]
async fn main() {
    let config = GearConfig::parse_args();

    if let Err(e) = http_server::run(config).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
