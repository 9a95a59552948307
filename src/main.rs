#[tokio::main]
async fn main() -> anyhow::Result<()> {
    policy_ledger::server::run().await
}
