//! fedi-picbot - post a random image from a catalog to a Mastodon server

use clap::{Args, Parser, Subcommand};
use libpicbot::config::{Config, PostPaths};
use libpicbot::logging::LoggingConfig;
use libpicbot::picker::pick_image;
use libpicbot::platforms::mastodon::{MastodonPublisher, MastodonRegistrar};
use libpicbot::poster::publish;
use libpicbot::registration::{config_instructions, register};
use libpicbot::resolver::Resolver;
use libpicbot::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "fedi-picbot")]
#[command(version)]
#[command(about = "Post a random image from a catalog to a Mastodon server", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the bot on a server and print the credentials for config.ini
    Register(RegisterArgs),

    /// Pick a random image from the catalog and post it
    Post(PostArgs),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    /// URL of server to register on
    #[arg(long)]
    server: String,
}

#[derive(Args, Debug)]
struct PostArgs {
    /// Directory of config and sources file
    #[arg(long, env = "PICBOT_DIR", default_value = ".")]
    dir: String,

    /// Path to config file (default: $dir/config.ini)
    #[arg(long)]
    config: Option<String>,

    /// Path to sources file (default: $dir/sources.txt)
    #[arg(long)]
    sources: Option<String>,

    /// Path to folder containing local images (default: $dir/images)
    #[arg(long)]
    images: Option<String>,

    /// Pick and open an image but do not post it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Register(args) => run_register(args).await,
        Command::Post(args) => run_post(args).await,
    }
}

async fn run_register(args: RegisterArgs) -> Result<()> {
    let credentials = register(&MastodonRegistrar, &args.server).await?;
    println!("{}", config_instructions(&args.server, &credentials));
    Ok(())
}

async fn run_post(args: PostArgs) -> Result<()> {
    let paths = PostPaths::resolve(
        &args.dir,
        args.config.as_deref(),
        args.sources.as_deref(),
        args.images.as_deref(),
    );
    debug!("Using {:?}", paths);

    // Config is loaded before any image is fetched
    let config = if args.dry_run {
        None
    } else {
        Some(Config::load_from_path(&paths.config)?)
    };

    let resolver = Resolver::new(paths.images.clone())?;
    let mut rng = StdRng::from_entropy();
    let image = pick_image(&paths.sources, &resolver, &mut rng).await?;

    let Some(config) = config else {
        println!("Would post image from {}", image.location);
        println!("Caption: {}", image.caption());
        return Ok(());
    };

    println!("Posting image from {}", image.location);

    let mut publisher = MastodonPublisher::new(config.app)?;
    let published = publish(&mut publisher, &config.login, image).await?;
    debug!("Published {:?}", published);

    Ok(())
}
