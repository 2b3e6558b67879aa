#[tokio::main]
async fn main() {
    let code = pikreg_cli::run().await;
    std::process::exit(code);
}
