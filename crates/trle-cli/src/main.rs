use trle_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible.
    if let Err(err) = logging::init_logging() {
        eprintln!("trle-scrape warning: logging disabled: {:#}", err);
    }

    let cli = match Cli::parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            // --help/--version go to stdout and are not failures.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = cli.execute() {
        tracing::error!("{:#}", err);
        eprintln!("trle-scrape error: {:#}", err);
        std::process::exit(1);
    }
}
