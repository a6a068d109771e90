#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mailassist_cli::cli::app::run().await
}
