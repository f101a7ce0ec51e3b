#[tokio::main]
async fn main() {
    minigram::server::run().await;
}
