use clap::{Parser, Subcommand};
use gallery_publish::config::{self, RenderContext, SiteConfig};
use gallery_publish::output;
use gallery_publish::pages::AlbumInput;
use gallery_publish::publish::{self, PublishOptions};
use gallery_publish::store::{DirectoryStore, ObjectStore, S3Settings, S3Store};
use gallery_publish::types::AlbumManifest;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gallery-publish")]
#[command(version, about = "Render a photo gallery home page and publish it to S3")]
#[command(long_about = "\
Render a photo gallery home page and publish it to S3

The site directory holds the page templates and static assets:

  homepage/
  ├── index.html          # Home page template ({title}, {pictures}, {backTo}, ...)
  ├── error.html          # Error page template ({website}, ...)
  ├── assets/             # Published under assets/<section>/
  └── snippets/           # Never published
      ├── album.html      # Markup for one album ({album}, {title}, {cover}, ...)
      └── backto.html     # Footer block ({backLink})

  shared/snippets/ga.html # Analytics snippet ({gtag})

Albums are read from a JSON manifest with three parallel lists:

  {\"albums\": [...], \"pictures\": [[...], ...], \"metadata\": [{...}, ...]}

Settings come from gallery.toml and the environment (WEBSITE, WEBSITE_TITLE,
GOOGLEANALYTICS, HOME_PAGE_CREDITS_OVERRIDE, HIDE_HOME_PAGE_CREDITS,
SPACES_INSTEAD_OF_TABS, ALBUM_SORT, SITE_BUCKET). Run 'gallery-publish
gen-config' for a documented config file.")]
struct Cli {
    /// Site directory
    #[arg(long, default_value = "homepage", global = true)]
    site: PathBuf,

    /// Album manifest (JSON)
    #[arg(long, global = true)]
    albums: Option<PathBuf>,

    /// Config file; missing is fine
    #[arg(long, default_value = "gallery.toml", global = true)]
    config: PathBuf,

    /// Log progress at info level (otherwise RUST_LOG, default warn)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render and upload the site to the configured bucket
    Publish,
    /// Render the site into a local directory
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
    },
    /// Show which files would be published and under which keys
    Plan,
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Plan => {
            let site_config = config::load_config(&cli.config)?;
            let plan = publish::plan_files(&cli.site, &publish_options(&site_config))?;
            output::print_plan(&plan, &cli.site);
        }
        Command::Publish => {
            let site_config = config::load_config(&cli.config)?;
            if site_config.publish.bucket.is_empty() {
                return Err("no bucket configured: set publish.bucket or SITE_BUCKET".into());
            }
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let store = S3Store::connect(S3Settings {
                    bucket: site_config.publish.bucket.clone(),
                    region: site_config.publish.region.clone(),
                    endpoint: site_config.publish.endpoint.clone(),
                })
                .await;
                run(&cli.site, cli.albums.as_deref(), &site_config, &store).await
            })?;
        }
        Command::Build { output: out_dir } => {
            let site_config = config::load_config(&cli.config)?;
            let store = DirectoryStore::new(out_dir);
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run(&cli.site, cli.albums.as_deref(), &site_config, &store))?;
        }
    }

    Ok(())
}

fn publish_options(site_config: &SiteConfig) -> PublishOptions {
    PublishOptions {
        section: site_config.publish.section.clone(),
        shared_dir: site_config.publish.shared_dir.clone(),
    }
}

fn load_albums(path: Option<&Path>) -> Result<AlbumManifest, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
        None => {
            tracing::warn!("no --albums manifest given, rendering without albums");
            Ok(AlbumManifest::default())
        }
    }
}

/// Publish into `store`. Per-file failures are reported, not returned.
async fn run(
    site: &Path,
    albums: Option<&Path>,
    site_config: &SiteConfig,
    store: &dyn ObjectStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = load_albums(albums)?;
    let input = AlbumInput {
        albums: &manifest.albums,
        pictures: &manifest.pictures,
        metadata: &manifest.metadata,
    };
    let ctx = RenderContext::from(site_config);
    let report = publish::publish(site, input, &ctx, &publish_options(site_config), store).await?;
    output::print_publish_report(&report);
    Ok(())
}
