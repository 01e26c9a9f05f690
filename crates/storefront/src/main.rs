#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront::run().await
}
