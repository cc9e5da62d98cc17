pub mod cli;
mod config;

use clap::App;

use crate::config::Config;

fn main() {
    init_tracing();

    let args = App::new("aaqz")
        .version("0.1.0")
        .author("Kiva <imkiva@icloud.com>")
        .about("AAQZ interpreter")
        .args_from_usage(
            "-i, --repl          'Starts an interactive AAQZ shell'
            -d, --dump-ast      'Prints every parsed form to stderr'
            -q, --quiet         'Does not print the final value'
            -e, --eval=[EXPR]   'Evaluates EXPR instead of a file'
            [INPUT]             'Run file'",
        )
        .get_matches();

    let mut cfg = Config::new();
    cfg.dump_ast = args.is_present("dump-ast");
    cfg.quiet = args.is_present("quiet");

    let code = if let Some(source) = args.value_of("eval") {
        cli::cli_main::eval_main(cfg, source)
    } else if args.is_present("repl") {
        cli::cli_main::cli_main(cfg, None)
    } else {
        cli::cli_main::cli_main(cfg, args.value_of("INPUT").map(|e| e.to_owned()))
    };

    std::process::exit(code);
}

/// Logging is off unless `RUST_LOG` is set, and always goes to stderr.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
