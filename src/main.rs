use clap::{Parser, Subcommand};
use lightbox::photo::Photo;
use lightbox::resolve::{
    DiskCache, HttpFetcher, ImageClass, RenderedImage, Resolver, ResolverConfig, classify,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "lightbox")]
#[command(about = "Resolve, classify, and cache viewer images")]
#[command(long_about = "\
Resolve, classify, and cache viewer images

The fetch command runs a URL through the same funnel the library uses:
byte cache → HTTP fetch → animated/static classification → decode → cache.
Fetching the same URL twice hits the cache and never touches the network.

Classification is by container signature: GIF is always animated, PNG is
animated when it carries an acTL chunk (APNG), WebP when its VP8X animation
flag or an ANIM chunk is present. Everything else is static.")]
#[command(version = version_string())]
struct Cli {
    /// Cache directory
    #[arg(long, default_value = ".lightbox-cache", global = true)]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a URL through the cache and report what it resolved to
    Fetch {
        /// Image URL
        url: String,
        /// Extra request header, as "Name: Value" (e.g. an Authorization header)
        #[arg(long)]
        header: Option<String>,
        /// Fetch timeout in seconds
        #[arg(long, default_value_t = 15)]
        timeout: u64,
    },
    /// Classify local files as animated or static without decoding
    Sniff {
        /// Image files
        files: Vec<PathBuf>,
    },
    /// Print cache statistics
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Fetch {
            url,
            header,
            timeout,
        } => {
            let mut photo = Photo::from_url(&url)?;
            if let Some(raw) = header {
                let (name, value) = raw
                    .split_once(':')
                    .ok_or("header must be formatted as 'Name: Value'")?;
                photo = photo.with_auth_header(name.trim(), value.trim());
            }

            let resolver = Resolver::with_config(
                Arc::new(DiskCache::open(&cli.cache_dir)),
                Arc::new(HttpFetcher::new()),
                ResolverConfig {
                    fetch_timeout: Duration::from_secs(timeout),
                },
            );
            let rendered = resolver.resolve(&photo)?;
            let (width, height) = rendered.dimensions();
            match &*rendered {
                RenderedImage::Static(_) => {
                    println!("{url}: static, {width}x{height}");
                }
                RenderedImage::Animated(animation) => {
                    println!(
                        "{url}: animated, {width}x{height}, {} frames",
                        animation.frame_count()
                    );
                }
            }
        }
        Command::Sniff { files } => {
            for file in files {
                let bytes = std::fs::read(&file)?;
                let label = match classify(&bytes) {
                    ImageClass::Animated => "animated",
                    ImageClass::Static => "static",
                };
                println!("{}: {label}", file.display());
            }
        }
        Command::Stats => {
            let cache = DiskCache::open(&cli.cache_dir);
            println!(
                "{}: {} entries, {} bytes",
                cli.cache_dir.display(),
                cache.len(),
                cache.total_bytes()
            );
            let mut keys = cache.keys();
            keys.sort();
            for key in keys {
                println!("  {key}");
            }
        }
    }

    Ok(())
}
