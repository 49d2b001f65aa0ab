use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cli::render::{breadcrumb, render_image, render_view};
use cli::repl;
use gallery_core::bootstrap::{build_gallery, build_http, open_store};
use gallery_core::config::{self, AppConfig};
use gallery_core::Gallery;
use providers::pixiv::{self, PixivLogin};
use providers::twitter;
use tokio::io::BufReader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    debug!(store = ?cfg.store.kind, offline = cli.offline, "configuration loaded");

    match cli.command {
        Commands::Ls { id, wait, json } => {
            let mut gallery = open_gallery(&cfg, cli.offline).await?;
            match id {
                Some(id) => gallery.enter(&id).await?,
                None => gallery.start(Some(cfg.gallery.start_directory.as_str())).await?,
            }
            print_listing(&mut gallery, wait, json).await
        }
        Commands::Search { query, wait, json } => {
            let mut gallery = open_gallery(&cfg, cli.offline).await?;
            gallery.start(Some(cfg.gallery.start_directory.as_str())).await?;
            gallery.search(&query).await?;
            print_listing(&mut gallery, wait, json).await
        }
        Commands::Path { id } => {
            let gallery = open_gallery(&cfg, true).await?;
            let node = gallery.tree().node(&id).await?;
            let path = gallery.tree().ancestor_path(&id).await?;
            println!("{}", breadcrumb(&path, Some(&node)));
            Ok(())
        }
        Commands::Resolve { id, json } => {
            let gallery = open_gallery(&cfg, cli.offline).await?;
            let node = gallery.tree().node(&id).await?;
            let image = gallery.resolver().resolve(&node).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&image)?);
            } else {
                print!("{}", render_image(&image));
            }
            Ok(())
        }
        Commands::Browse { start } => {
            let mut gallery = open_gallery(&cfg, cli.offline).await?;
            let start = start.unwrap_or_else(|| cfg.gallery.start_directory.clone());
            gallery.start(Some(start.as_str())).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            repl::run(&mut gallery, stdin, &mut stdout).await
        }
        Commands::Token { host } => run_token(&cfg, host, cli.offline).await,
        #[cfg(feature = "still-frame")]
        Commands::Frame { input, output } => {
            let gif = std::fs::read(&input).with_context(|| format!("reading {}", input))?;
            let png = gallery_core::still_frame::first_frame_png(&gif)?;
            std::fs::write(&output, png).with_context(|| format!("writing {}", output))?;
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(name = "bookmark-gallery")]
#[command(about = "Browse a bookmark collection as an image gallery", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    /// Never touch the network; only url shapes decide what is an image
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory as directories, links and images
    Ls {
        /// Directory id (default: gallery.start_directory)
        id: Option<String>,
        /// Wait for link probes before printing
        #[arg(long)]
        wait: bool,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Search bookmark titles and urls
    Search {
        query: String,
        /// Wait for link probes before printing
        #[arg(long)]
        wait: bool,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the breadcrumb of a bookmark
    Path { id: String },
    /// Resolve one bookmark to its full-size and preview urls
    Resolve {
        id: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive browsing
    Browse {
        /// Start location, e.g. `12` or `?id=12`
        #[arg(long)]
        start: Option<String>,
    },
    /// Fetch an api token with the configured credentials
    Token {
        #[arg(value_enum, default_value_t = TokenHost::Twitter)]
        host: TokenHost,
    },
    /// Write the first frame of a GIF as PNG
    #[cfg(feature = "still-frame")]
    Frame { input: String, output: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum TokenHost {
    /// App token from client id and secret
    Twitter,
    /// Password login; prints the device token to reuse on stderr
    Pixiv,
}

async fn open_gallery(cfg: &AppConfig, offline: bool) -> Result<Gallery> {
    let store = open_store(cfg).await?;
    let http = build_http(cfg, offline)?;
    Ok(build_gallery(cfg, store, http))
}

async fn print_listing(gallery: &mut Gallery, wait: bool, json: bool) -> Result<()> {
    if wait {
        gallery.settle().await;
    } else {
        gallery.pump();
    }
    let view = gallery.view();
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        let current = gallery.tree().node(&view.directory_id).await.ok();
        print!("{}", render_view(&view, current.as_ref()));
    }
    Ok(())
}

async fn run_token(cfg: &AppConfig, host: TokenHost, offline: bool) -> Result<()> {
    let creds = &cfg.credentials;
    let http = build_http(cfg, offline)?;
    match host {
        TokenHost::Twitter => {
            let (Some(id), Some(secret)) = (&creds.twitter_client_id, &creds.twitter_client_secret)
            else {
                bail!("credentials.twitter_client_id and credentials.twitter_client_secret are required");
            };
            let token = twitter::fetch_app_token(http.as_ref(), id, secret)
                .await
                .context("requesting twitter app token")?;
            println!("{}", token);
        }
        TokenHost::Pixiv => {
            let (Some(client_id), Some(client_secret), Some(username), Some(password)) = (
                &creds.pixiv_client_id,
                &creds.pixiv_client_secret,
                &creds.pixiv_username,
                &creds.pixiv_password,
            ) else {
                bail!("credentials.pixiv_client_id, pixiv_client_secret, pixiv_username and pixiv_password are required");
            };
            let login = PixivLogin {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                username: username.clone(),
                password: password.clone(),
                device_token: creds.pixiv_device_token.clone(),
            };
            let token = pixiv::fetch_token(http.as_ref(), &login)
                .await
                .context("logging in to pixiv")?;
            println!("{}", token.access_token);
            if let Some(device) = token.device_token {
                eprintln!("device token: {}", device);
            }
        }
    }
    Ok(())
}
