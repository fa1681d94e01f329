//! editor-prepare - session descriptor gateway

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use editor_prepare::{
    config::{Args, LogFormat},
    document::LocaleResolver,
    prepare::{PrepareDeps, PrepareService, TokenSigner},
    server,
    services::{
        BundleCatalog, ContentStore, EditorUrls, FsContentStore, FsTemplateSource,
        StaticDirectory,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize tracing/logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("editor_prepare={},info", args.log_level).into());
    match args.log_format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  editor-prepare");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Public URL: {}", args.public_url);
    info!("Editor service: {}", args.editor_service_url);
    info!("Callback endpoint: {}", args.callback_endpoint());
    info!("Content root: {}", args.content_root.display());
    info!("Templates: {}", args.templates_dir.display());
    info!("Signing: {}", if args.jwt_enabled { "enabled" } else { "disabled" });
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("======================================");

    if !args.content_root.is_dir() {
        warn!(
            "Content root {} does not exist, creating it",
            args.content_root.display()
        );
        std::fs::create_dir_all(&args.content_root)?;
    }
    if !args.templates_dir.is_dir() {
        warn!(
            "Templates directory {} is missing; new documents cannot be created",
            args.templates_dir.display()
        );
    }

    let directory = match &args.users_file {
        Some(path) => {
            let directory = StaticDirectory::from_json_file(path)?;
            info!("Loaded {} directory entries", directory.len());
            directory
        }
        None => StaticDirectory::default(),
    };

    let mut catalog = BundleCatalog::builtin();
    if let Some(path) = &args.messages_file {
        catalog.merge_json_file(path)?;
        info!("Merged message bundles from {}", path.display());
    }

    let locales = LocaleResolver::new(&args.default_locale);
    let store: Arc<dyn ContentStore> =
        Arc::new(FsContentStore::new(&args.content_root, &args.public_url));
    let signer = TokenSigner::from_settings(args.jwt_enabled, args.jwt_secret.clone())?;

    let service = PrepareService::new(PrepareDeps {
        store: Arc::clone(&store),
        directory: Arc::new(directory),
        catalog: Arc::new(catalog),
        templates: Arc::new(FsTemplateSource::new(
            &args.templates_dir,
            locales.default_locale(),
        )),
        urls: EditorUrls::new(args.callback_endpoint(), &args.editor_service_url),
        locales,
        signer,
        max_name_attempts: args.max_name_attempts,
    });

    let state = Arc::new(server::AppState::new(args, service, store));
    server::run(state).await?;

    Ok(())
}
