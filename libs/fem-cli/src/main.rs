use clap::Parser;
use fem_cli::{run, Cli};

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if let Err(err) = run(&cli) {
        log::error!("{err}");
        eprintln!("fem-mesher: {err}");
        std::process::exit(1);
    }
}
