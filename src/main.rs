use anyhow::Result;
use betaface_client::models::Config;
use betaface_client::FaceServiceClient;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "betaface")]
#[command(about = "Upload, tag, and recognize faces via the BetaFace API")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload an image and tag the detected face with a person id
    Upload {
        file: PathBuf,
        /// Alphanumeric person id, dots allowed (e.g. john.doe)
        person_id: String,
    },
    /// Upload an image and recognize the face within a namespace
    Recognize {
        file: PathBuf,
        /// Bare namespaces are scoped as all@<namespace>
        namespace: String,
    },
    /// Poll the processing state of an uploaded image
    Info { image_uid: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "betaface_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;
    let client = FaceServiceClient::from_config(&config)?;

    match args.command {
        Command::Upload { file, person_id } => {
            match client.upload_face(&file, &person_id).await {
                Ok(Some(result)) => info!("Face tagged (ready: {})", result.ready),
                Ok(None) => info!("No face found in {}", file.display()),
                Err(e) => {
                    error!("Upload failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Recognize { file, namespace } => {
            let matches = client.recognize_faces(&file, &namespace).await?;
            if matches.is_empty() {
                info!("No matching persons found");
            }
            for (name, confidence) in &matches {
                println!("{}\t{:.4}", name, confidence);
            }
        }
        Command::Info { image_uid } => {
            let info = client.get_image_info(&image_uid).await?;
            match info.face_uid {
                Some(uid) => println!("face_uid: {}", uid),
                None => println!("no face detected"),
            }
        }
    }

    Ok(())
}
