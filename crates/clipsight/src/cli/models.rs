//! The `clipsight models` command for managing the CLIP model files.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use clipsight_core::embedding::{ClipEmbedder, REQUIRED_FILES};
use clipsight_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download the CLIP vision encoder, text encoder and tokenizer
    Download {
        /// Hugging Face repository to download from
        #[arg(long, default_value = DEFAULT_REPO)]
        repo: String,
    },

    /// List installed model files
    List,

    /// Show model directory path
    Path,
}

/// ONNX export of CLIP ViT-B/32 with separate vision and text towers.
const DEFAULT_REPO: &str = "Xenova/clip-vit-base-patch32";

/// Hugging Face download URL for one file of a repository.
fn remote_url(repo: &str, file: &str) -> String {
    format!("https://huggingface.co/{}/resolve/main/{}", repo, file)
}

/// Temporary path a file is streamed to before it is moved into place.
fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Download every missing model file. Skips files already on disk.
pub async fn download(config: &Config, repo: &str, client: &reqwest::Client) -> anyhow::Result<()> {
    let root = ClipEmbedder::model_root(&config.embedding, &config.model_dir());

    for file in REQUIRED_FILES {
        let dest = root.join(file);
        if dest.exists() {
            tracing::info!("{} already exists at {:?}", file, dest);
            continue;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let url = remote_url(repo, file);
        tracing::info!("Downloading {}...", file);
        tracing::info!("  Source: {}", url);
        tracing::info!("  Destination: {:?}", dest);

        download_file(client, &url, &dest).await?;

        let file_size = std::fs::metadata(&dest)?.len();
        tracing::info!(
            "  {} complete ({:.1} MB)",
            file,
            file_size as f64 / (1024.0 * 1024.0)
        );
    }

    Ok(())
}

/// Execute the models command.
pub async fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    match args.command {
        ModelsCommand::Download { repo } => {
            let client = reqwest::Client::new();
            download(config, &repo, &client).await?;
            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            let model_dir = config.model_dir();
            let root = ClipEmbedder::model_root(&config.embedding, &model_dir);

            if !root.exists() {
                println!("No models installed.");
                println!("Run `clipsight models download` to download required models.");
                return Ok(());
            }

            println!("Installed models:");
            println!("  Directory: {}\n", root.display());
            println!("  {}:", config.embedding.model);
            for file in REQUIRED_FILES {
                let status = if root.join(file).exists() {
                    "ready"
                } else {
                    "not installed"
                };
                println!("    - {:30} {}", file, status);
            }

            if !ClipEmbedder::model_exists(&config.embedding, &model_dir) {
                println!("\nRun `clipsight models download` to fetch the missing files.");
            }
        }

        ModelsCommand::Path => {
            println!("{}", config.model_dir().display());
        }
    }

    Ok(())
}

/// Stream a URL to `dest`.
///
/// The body is written to a `.part` file that is renamed on completion, so
/// an interrupted download never leaves a truncated model in place.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    if let Some(size) = total_size {
        tracing::info!("  Size: {:.1} MB", size as f64 / (1024.0 * 1024.0));
    }

    let partial = partial_path(dest);
    let mut file = tokio::fs::File::create(&partial).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (50 * 1024 * 1024) < chunk.len() as u64 {
                tracing::info!(
                    "  Progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    file.flush().await?;
    drop(file);

    if let Some(total) = total_size {
        if downloaded != total {
            let _ = tokio::fs::remove_file(&partial).await;
            anyhow::bail!(
                "Incomplete download of {}: got {} of {} bytes",
                url,
                downloaded,
                total
            );
        }
    }

    tokio::fs::rename(&partial, dest).await?;
    Ok(())
}
