use distributed_quadrature::config::CoordinatorConfig;
use distributed_quadrature::scheduler::engine::SchedulerEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut config = CoordinatorConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--workers" => {
                config.worker_count = args[i + 1].parse()?;
                i += 2;
            }
            "--range-start" => {
                config.range_start = args[i + 1].parse()?;
                i += 2;
            }
            "--range-end" => {
                config.range_end = args[i + 1].parse()?;
                i += 2;
            }
            "--port" => {
                config.coordinator_port = args[i + 1].parse()?;
                i += 2;
            }
            "--base-port" => {
                config.discovery_base_port = args[i + 1].parse()?;
                i += 2;
            }
            "--broadcast" => {
                config.broadcast_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--bind" => {
                config.bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            "--retries" => {
                config.max_retries = args[i + 1].parse()?;
                i += 2;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: {} [--workers N] [--range-start X] [--range-end X] \
                     [--port P] [--base-port P] [--broadcast ADDR] [--bind ADDR] [--retries N]",
                    args[0]
                );
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    tracing::info!(
        "Coordinator starting: {} workers expected, integrating [{}, {}]",
        config.worker_count,
        config.range_start,
        config.range_end
    );

    let mut engine = SchedulerEngine::new(config).await?;
    let total = engine.run().await?;

    println!("Integral result: {:.4}", total);

    Ok(())
}
