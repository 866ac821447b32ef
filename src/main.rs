#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gravy_core::server::run().await
}
