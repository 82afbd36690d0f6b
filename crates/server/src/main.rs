#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pass_server::run().await
}
