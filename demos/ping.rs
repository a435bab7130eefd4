use std::time::Duration;

use argh::FromArgs;
use base64::{Engine, engine::general_purpose::STANDARD};
use slping::{DEFAULT_PORT, DEFAULT_PROTOCOL_VERSION, ListPing};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(FromArgs)]
/// Ping a Minecraft server and print its status as JSON.
struct Args {
    /// the server hostname or IP
    #[argh(positional)]
    hostname: String,
    /// the server port, overridden by any SRV record
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,
    /// the protocol version to send in the handshake
    #[argh(option, default = "DEFAULT_PROTOCOL_VERSION")]
    protocol: i32,
    /// seconds to wait for the status
    #[argh(option, default = "5")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    start_tracing()?;
    let args: Args = argh::from_env();

    let mut status = slping::tokio::get_status(ListPing {
        protocol_version: args.protocol,
        hostname: args.hostname,
        port: args.port,
        timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    })
    .await?;

    if let Some(favicon) = status.favicon.take() {
        let encoded = favicon.trim_start_matches("data:image/png;base64,");
        let icon = STANDARD.decode(encoded)?;
        status.favicon = Some(format!("<{} byte PNG>", icon.len()));
    }
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn start_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(concat!(env!("CARGO_PKG_NAME"), "=info").parse()?)
        .with_env_var("LOG")
        .from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
    Ok(())
}
