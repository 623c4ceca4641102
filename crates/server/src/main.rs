use clap::Parser as _;
use lark_bitable_mcp::config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    lark_bitable_mcp::logging::init(&args.log_level, args.log_format);

    tracing::info!(
        transport = ?args.transport,
        gateway = %args.gateway_url,
        auth = args.auth_secret().is_some(),
        "starting {} {}",
        args.server_name,
        args.server_version
    );

    if let Err(e) = lark_bitable_mcp::run(args).await {
        tracing::error!(error = %e, "server failed");
        return Err(e.into());
    }
    Ok(())
}
