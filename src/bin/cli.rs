use clap::{Parser, Subcommand};
use sharded_bloom::{
    BloomError, BloomFilter, FilterConfigBuilder, RedisStore, ShardConfigBuilder,
    ShardedBitSet,
};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Redis connection URL [env: REDIS_URI]
    #[arg(long, global = true)]
    redis_url: Option<String>,

    /// Prefix of the shard keys [env: BLOOM_KEY_PREFIX]
    #[arg(short, long, global = true)]
    prefix: Option<String>,

    /// Expected number of items [env: BLOOM_CAPACITY]
    #[arg(short, long, global = true)]
    capacity: Option<u64>,

    /// False positive rate, between 0 and 1 [env: BLOOM_FALSE_POSITIVE_RATE]
    #[arg(short, long, global = true)]
    fpr: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bit vector size and hash count for the configured capacity
    Estimate {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add items to the filter
    Add {
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Check whether items may be in the filter
    Exists {
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Set a time-to-live on every shard of the filter
    Expire {
        /// TTL in seconds
        #[arg(long)]
        secs: u64,
    },

    /// Delete every shard of the filter
    Delete,
}

/// Settings resolved from flags, then environment, then defaults.
struct Settings {
    redis_url: String,
    key_prefix: String,
    capacity: u64,
    false_positive_rate: f64,
}

impl Settings {
    fn resolve(cli: &Cli) -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let capacity = match cli.capacity {
            Some(capacity) => capacity,
            None => std::env::var("BLOOM_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| "Invalid BLOOM_CAPACITY")?,
        };
        let false_positive_rate = match cli.fpr {
            Some(fpr) => fpr,
            None => std::env::var("BLOOM_FALSE_POSITIVE_RATE")
                .unwrap_or_else(|_| "0.01".to_string())
                .parse()
                .map_err(|_| "Invalid BLOOM_FALSE_POSITIVE_RATE")?,
        };

        Ok(Self {
            redis_url: cli.redis_url.clone().unwrap_or_else(|| {
                std::env::var("REDIS_URI")
                    .unwrap_or_else(|_| "redis://127.0.0.1/".to_string())
            }),
            key_prefix: cli.prefix.clone().unwrap_or_else(|| {
                std::env::var("BLOOM_KEY_PREFIX")
                    .unwrap_or_else(|_| "bloom".to_string())
            }),
            capacity,
            false_positive_rate,
        })
    }
}

fn open_filter(
    settings: &Settings,
) -> Result<BloomFilter<ShardedBitSet<RedisStore>>, BloomError> {
    let config = FilterConfigBuilder::default()
        .capacity(settings.capacity)
        .false_positive_rate(settings.false_positive_rate)
        .build()
        .map_err(|e| BloomError::InvalidConfig(e.to_string()))?;
    let params = config.params()?;

    let shard_config = ShardConfigBuilder::default()
        .key_prefix(settings.key_prefix.clone())
        .build()
        .map_err(|e| BloomError::InvalidConfig(e.to_string()))?;

    let store = RedisStore::new(&settings.redis_url)?;
    let bits =
        ShardedBitSet::from_config(shard_config, params.bit_vector_size, store)?;
    info!(
        key_prefix = %settings.key_prefix,
        bit_vector_size = params.bit_vector_size,
        num_hashes = params.num_hashes,
        "opened filter"
    );
    BloomFilter::from_config(&config, bits)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;

    match &cli.command {
        Commands::Estimate { json } => {
            let params = sharded_bloom::estimate_parameters(
                settings.capacity,
                settings.false_positive_rate,
            )?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else {
                println!("Capacity: {}", settings.capacity);
                println!(
                    "False positive rate: {:.4}",
                    settings.false_positive_rate
                );
                println!("Bit vector size: {}", params.bit_vector_size);
                println!("Number of hash functions: {}", params.num_hashes);
            }
        }
        Commands::Add { items } => {
            let mut filter = open_filter(&settings)?;
            for item in items {
                filter.add(item.as_bytes())?;
                println!("Element '{item}' added");
            }
        }
        Commands::Exists { items } => {
            let filter = open_filter(&settings)?;
            for item in items {
                if filter.exists(item.as_bytes())? {
                    println!("Element '{item}' may exist in the filter");
                } else {
                    println!("Element '{item}' does not exist in the filter");
                }
            }
        }
        Commands::Expire { secs } => {
            let mut filter = open_filter(&settings)?;
            filter.expire(Duration::from_secs(*secs))?;
            println!("Filter '{}' expires in {secs} seconds", settings.key_prefix);
        }
        Commands::Delete => {
            let mut filter = open_filter(&settings)?;
            filter.delete()?;
            println!("Filter '{}' deleted", settings.key_prefix);
        }
    }

    Ok(())
}
