use portfolio_cms::domain::Collection;
use portfolio_cms::infra::{Config, StorageBackend};
use portfolio_cms::storage::{ItemStore, PostgresItemStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--create-schema-if-missing]\n\
         \n\
         Reads the same env vars as api_server:\n\
           STORAGE_BACKEND, DATABASE_URL, DB_MAX_CONNECTIONS, BIND_ADDR,\n\
           UPLOAD_DIR, MAX_IMAGE_BYTES, OWNER_HEADER\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let create_schema = args.iter().any(|a| a == "--create-schema-if-missing");

    // Force-read config (nice error messages if anything is missing or malformed)
    let config = Config::from_env()?;

    println!("> Preflight:");
    println!("  STORAGE_BACKEND={:?}", config.storage_backend);
    println!("  BIND_ADDR={}", config.bind_addr);
    println!("  UPLOAD_DIR={}", config.upload_dir.display());
    println!("  MAX_IMAGE_BYTES={}", config.max_image_bytes);
    println!("  OWNER_HEADER={}", config.owner_header);

    if config.storage_backend == StorageBackend::Postgres {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let store = PostgresItemStore::connect(url, 1)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to DATABASE_URL: {}", e))?;
        store.ping().await?;
        println!("  Database is reachable.");

        let mut missing = Vec::new();
        for table in Collection::ALL
            .iter()
            .map(|c| c.table_name())
            .chain(std::iter::once("personal_info"))
        {
            let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
                .bind(format!("public.{}", table))
                .fetch_one(store.pool())
                .await?;
            if !exists {
                missing.push(table);
            }
        }

        if missing.is_empty() {
            println!("  Tables present.");
        } else if create_schema {
            println!("  Missing tables {:?} -> creating schema...", missing);
            store.ensure_schema().await?;
            println!("  Schema created.");
        } else {
            return Err(anyhow::anyhow!(
                "Missing tables {:?}. Re-run with --create-schema-if-missing or start api_server",
                missing
            ));
        }
    } else {
        println!("  In-memory store selected; skipping database checks.");
    }

    // Upload dir must be writable for project images.
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Cannot create {}: {}", config.upload_dir.display(), e))?;
    let probe = config.upload_dir.join(".preflight-probe");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("{} is not writable: {}", config.upload_dir.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    println!("  Upload directory is writable.");

    println!("> Preflight OK.");
    Ok(())
}
