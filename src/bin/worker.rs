use distributed_quadrature::config::WorkerConfig;
use distributed_quadrature::worker::service::WorkerService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <PORT> [--bind ADDR] [--samples N]", args[0]);
        std::process::exit(1);
    }

    let mut config = WorkerConfig::new(args[1].parse()?);

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                config.bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--samples" => {
                config.samples = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    WorkerService::new(config).run().await
}
