// Diagnostic driver for the prefetch cache core, not the filesystem
// adapter (out of scope). Feeds paths from stdin to CacheManager.

use anyhow::{bail, Context, Result};
use prefetchd::{CacheManager, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(root) = args.next() else {
        bail!("usage: prefetchd <backing-root-dir>");
    };

    let root_path = std::path::PathBuf::from(&root);
    if !root_path.is_dir() {
        bail!("backing root {root:?} is not a directory");
    }

    let config = Config::default().with_root(root_path);
    let mut manager = CacheManager::new(config);

    tracing::info!(root, "prefetchd ready, reading paths from stdin");

    tokio::select! {
        result = read_stdin_loop(&manager) => result?,
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received");
        }
    }

    manager.shutdown().await;
    println!("{}", manager.status());
    Ok(())
}

async fn read_stdin_loop(manager: &CacheManager) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let path = line.trim();
        if path.is_empty() {
            continue;
        }
        manager.request(path);
        let lookup = manager.lookup(path);
        println!("requested {path:?} (resident: {})", lookup.present);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
