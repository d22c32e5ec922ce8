#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

mod cli;
mod commands;
mod errors;
mod framework;
mod trends;
mod utils;

use clap::Parser;
use poise::serenity_prelude::{self as serenity, GatewayIntents};
use tracing::info;
use tracing_unwrap::ResultExt;

use framework::{data::PoiseData, Config};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();

    framework::logging::init_tracing(&cli).expect("log file should be writable");

    info!("trendmaster {}", env!("CARGO_PKG_VERSION"));

    let token = cli.token().expect_or_log("no discord token");
    let config = Config::load(cli.config_path()).expect_or_log("invalid config");
    let data = PoiseData::new(config).expect_or_log("failed to set up bot data");

    let framework = framework::poise::build(data);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;
    let mut client = serenity::Client::builder(token, intents)
        .framework(framework)
        .await
        .expect_or_log("client should be valid");

    client
        .start()
        .await
        .expect_or_log("client should not return error");
}
