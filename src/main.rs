#[tokio::main]
async fn main() {
    if let Err(e) = medilogic_lib::run().await {
        eprintln!("medilogic: {e}");
        std::process::exit(1);
    }
}
