use catalogue_service::app::seed::{parse_seed_file, sample_products, seed_products};
use catalogue_service::infra::{config::ServiceConfig, logging, wiring};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin seed -- [--file <path>]\n\
         \n\
         Without --file the built-in sample products are saved.\n\
         The file form takes a JSON array of products, each with its own updatedAt.\n\
         \n\
         Store selection uses the same env vars as the API server:\n\
           CATALOGUE_STORE, COSMOS_ENDPOINT, COSMOS_KEY, COSMOS_DATABASE_ID, COSMOS_CONTAINER_ID\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let records = match args.as_slice() {
        [] => sample_products()?,
        [flag, path] if flag == "--file" => {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path, e))?;
            parse_seed_file(&contents)?
        }
        _ => usage_and_exit(),
    };

    let config = ServiceConfig::from_env()?;
    let handle = wiring::build_product_repo(&config.store)?;
    if handle.store_kind == "memory" {
        tracing::warn!("seeding the in-memory store; records are discarded when this process exits");
    }

    if let Err(e) = seed_products(handle.repo.as_ref(), records).await {
        tracing::error!(error = %e, "Failed to seed products");
        return Err(e.into());
    }
    Ok(())
}
