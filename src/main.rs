use anyhow::Result;
use clap::Parser;
use gan_train_utils::cli::Cli;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gan_train_utils=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
