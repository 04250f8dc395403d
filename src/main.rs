use clap::Parser;
use env_logger::Builder;
use log::{info, LevelFilter};

use bird_proxy::cli::{run, Args};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let (proxy_level, other_level) = match args.verbose {
        0 => (LevelFilter::Info, LevelFilter::Warn),
        1 => (LevelFilter::Debug, LevelFilter::Warn),
        2 => (LevelFilter::Trace, LevelFilter::Warn),
        _ => (LevelFilter::Trace, LevelFilter::Trace),
    };
    Builder::new()
        .filter(Some("bird_proxy"), proxy_level)
        .filter(None, other_level)
        .init();
    info!("Logging at levels {}/{}", proxy_level, other_level);

    if !run(&args).await {
        std::process::exit(1);
    }
}
