use safestreets_server::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("safestreets-server error: {err}");
        std::process::exit(1);
    }
}
