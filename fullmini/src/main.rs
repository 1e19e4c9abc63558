use fullmini::cli::{Args, BaseCommand, Command};
use tracing_subscriber::EnvFilter;

fn main() {
    // `RUST_LOG=debug fullmini ...` for progress and timings
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::new(pico_args::Arguments::from_env());

    match BaseCommand::try_from_cli_args(args).and_then(BaseCommand::run) {
        Ok(output) => println!("{}", output),
        Err(err) => {
            eprintln!("error: {}", err);
            eprintln!("Try 'fullmini --help' for more information.");
            std::process::exit(1);
        }
    }
}
