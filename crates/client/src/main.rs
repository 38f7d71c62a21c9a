//! `imagen-client` -- command-line polling client.
//!
//! Submits a prompt to the imagen server, polls until the task settles,
//! and writes the decoded result to disk.
//!
//! # Usage
//!
//! ```text
//! imagen-client "a red fox in the snow"
//! ```
//!
//! # Environment variables
//!
//! | Variable              | Required | Default                 | Description              |
//! |-----------------------|----------|-------------------------|--------------------------|
//! | `IMAGEN_API_URL`      | no       | `http://localhost:3000` | Server base URL          |
//! | `IMAGEN_ACCESS_TOKEN` | yes      | --                      | Bearer token             |
//! | `IMAGEN_OUTPUT`       | no       | `generated-image.png`   | Output file path         |

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imagen_client::{ApiClient, GenerationSession, PollConfig, SessionOutcome};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imagen_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prompt: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        tracing::error!("Usage: imagen-client <prompt>");
        std::process::exit(1);
    }

    let base_url =
        std::env::var("IMAGEN_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());

    let token = std::env::var("IMAGEN_ACCESS_TOKEN").unwrap_or_else(|_| {
        tracing::error!("IMAGEN_ACCESS_TOKEN environment variable is required");
        std::process::exit(1);
    });

    let output =
        std::env::var("IMAGEN_OUTPUT").unwrap_or_else(|_| "generated-image.png".into());

    tracing::info!(%base_url, prompt = %prompt.trim(), "Submitting generation request");

    let api = ApiClient::new(&base_url, Some(token));
    let session = GenerationSession::new(api, PollConfig::default());

    let mut last_reported = 0u8;
    let outcome = session
        .start(prompt.trim(), &mut |progress| {
            // Log every 10% step rather than every poll.
            if progress.percent >= last_reported + 10 || progress.percent == 100 {
                last_reported = progress.percent;
                tracing::info!(
                    percent = progress.percent,
                    attempt = progress.attempt,
                    status = ?progress.status,
                    "Generation in progress",
                );
            }
        })
        .await;

    match outcome {
        SessionOutcome::Succeeded { task_id, payload } => {
            let bytes = match BASE64.decode(payload.as_bytes()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(%task_id, error = %e, "Result payload is not valid base64");
                    std::process::exit(1);
                }
            };
            if let Err(e) = tokio::fs::write(&output, &bytes).await {
                tracing::error!(path = %output, error = %e, "Failed to write output file");
                std::process::exit(1);
            }
            tracing::info!(%task_id, path = %output, size = bytes.len(), "Image saved");
        }
        SessionOutcome::Failed { message } => {
            tracing::error!(%message, "Image generation failed");
            std::process::exit(1);
        }
        SessionOutcome::TimedOut { task_id } => {
            tracing::warn!(
                %task_id,
                "Generation timed out after 10 minutes; the task may still be running server-side",
            );
            std::process::exit(2);
        }
        SessionOutcome::Cancelled => {
            // Single-run binary; nothing else can cancel this session.
            tracing::warn!("Generation cancelled");
            std::process::exit(2);
        }
    }
}
