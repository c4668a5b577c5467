//! verset server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the draw API over HTTP.
//!
//! # Password hash generation
//!
//! To generate the argon2 PHC string for `admin_password_hash` in
//! config.toml:
//!
//! ```
//! cargo run -p verset-api --bin server -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use verset_api::{
  AppState, ServerConfig,
  session::{AdminAuth, Sessions},
};
use verset_core::{store::VersetStore as _, verse::NewVerse};
use verset_store_sqlite::SqliteStore;

/// Starter pool from the original deployment, used by `--seed`.
const SAMPLE_VERSES: [(&str, &str); 8] = [
  (
    "Car Dieu a tant aimé le monde qu'il a donné son Fils unique, afin que \
     quiconque croit en lui ne périsse point, mais qu'il ait la vie éternelle.",
    "Jean 3:16",
  ),
  ("L'Éternel est mon berger: je ne manquerai de rien.", "Psaume 23:1"),
  ("Je puis tout par celui qui me fortifie.", "Philippiens 4:13"),
  (
    "Confie-toi en l'Éternel de tout ton cœur, Et ne t'appuie pas sur ta \
     sagesse.",
    "Proverbes 3:5",
  ),
  (
    "Car je connais les projets que j'ai formés sur vous, dit l'Éternel, \
     projets de paix et non de malheur, afin de vous donner un avenir et de \
     l'espérance.",
    "Jérémie 29:11",
  ),
  (
    "Ne crains point, car je suis avec toi; Ne promène pas des regards \
     inquiets, car je suis ton Dieu.",
    "Ésaïe 41:10",
  ),
  (
    "Venez à moi, vous tous qui êtes fatigués et chargés, et je vous \
     donnerai du repos.",
    "Matthieu 11:28",
  ),
  (
    "L'amour est patient, il est plein de bonté; l'amour n'est point \
     envieux; l'amour ne se vante point.",
    "1 Corinthiens 13:4",
  ),
];

#[derive(Parser)]
#[command(author, version, about = "Verset draw server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,

  /// Insert the sample verse pool if the store is empty, then exit.
  #[arg(long)]
  seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = password_from_stdin()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("VERSET"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.session_secret.is_empty() {
    anyhow::bail!("session_secret must not be empty");
  }

  // Open SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: populate an empty pool and exit.
  if cli.seed {
    seed_pool(&store).await?;
    return Ok(());
  }

  // Build application state.
  let state = AppState {
    store:    Arc::new(store),
    auth:     Arc::new(AdminAuth {
      username:      server_cfg.admin_username.clone(),
      password_hash: server_cfg.admin_password_hash.clone(),
    }),
    sessions: Sessions::new(
      server_cfg.session_secret.clone(),
      server_cfg.session_ttl_secs,
    ),
  };

  let app = verset_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Insert the sample verses unless the pool already has content.
async fn seed_pool(store: &SqliteStore) -> anyhow::Result<()> {
  let existing = store.count_verses().await?;
  if existing > 0 {
    tracing::info!(existing, "pool is not empty; skipping seed");
    return Ok(());
  }

  for (text, reference) in SAMPLE_VERSES {
    let verse = NewVerse::new(text, reference)
      .context("sample verse failed validation")?;
    store.add_verse(verse).await?;
  }
  tracing::info!(count = SAMPLE_VERSES.len(), "seeded sample verses");
  Ok(())
}

/// Read a password from stdin.
fn password_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
