use anyhow::Result;

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    flick::cli::run().await
}
