#![recursion_limit = "256"]
#![expect(
    clippy::multiple_crate_versions,
    reason = "transitive dependency duplication"
)]

use clap::Parser;

mod address;
mod bips;
mod cauldron;
mod chain;
mod cli_output;
mod config;
mod errors;
mod project;
mod prompt;
mod render;
mod request;
mod store;
mod templates;

#[derive(Parser, Debug)]
#[command(
    name = "spellgen",
    version,
    about = "Generate Solidity sources for a Foundry project"
)]
struct Cli {
    /// Template to generate: script, script:cauldron, interface, contract,
    /// contract:magic-vault, blast-wrapped or test.
    template: String,
}

fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("spellgen=warn"));
    // Questions and answers own stdout/stderr interactively; logs go to stderr
    // and stay quiet unless RUST_LOG asks for more.
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging();

    let kind = request::TemplateKind::parse(&cli.template)?;
    let cfg = store::ConfigStore::discover().load()?;

    let mut prompter = prompt::StderrPrompter;
    let collected = request::collect(kind, &cfg, &mut prompter, &chain::RpcConnect).await?;
    let path = collected.render_to_file()?;
    cli_output::note(&format!("Generated {}", path.display()));
    Ok(())
}
