//! Command dispatch and handlers.

pub mod inspect;
pub mod links;
pub mod sync;

use crate::adapters::live::LiveFileSystem;
use crate::auth::Authenticator;
use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::Config;
use crate::context::ServiceContext;

/// Dispatch a parsed command to its handler.
///
/// When `SYLLABI_REPLAY` is set, ports are served from the cassettes in
/// that directory instead of the live services. When `SYLLABI_RECORD` is
/// set, every port interaction is recorded to per-port cassette files in
/// that directory.
///
/// # Errors
///
/// Returns an error string if setup or the selected command handler fails.
pub fn dispatch(command: &Command, config: &Config) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    runtime.block_on(dispatch_async(command, config))
}

async fn dispatch_async(command: &Command, config: &Config) -> Result<(), String> {
    let session = config.record_dir.as_deref().map(RecordingSession::new).transpose()?;

    let ctx = build_context(command, config).await?;
    let ctx = match &session {
        Some(session) => ctx.recording(session),
        None => ctx,
    };

    let result = dispatch_with_context(command, &ctx).await;

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release the recorder references
        drop(ctx);
        let output_dir = session.finish()?;
        eprintln!("Recording saved to: {}", output_dir.display());
    }

    result
}

/// Builds the context a command needs, authenticating only when storage is used.
async fn build_context(command: &Command, config: &Config) -> Result<ServiceContext, String> {
    if let Some(dir) = &config.replay_dir {
        return ServiceContext::replaying_from(&CassetteConfig::from_dir(dir));
    }

    match command {
        Command::Links { .. } | Command::Inspect { .. } => {
            let fs = LiveFileSystem;
            let token = Authenticator::new(&fs, &config.credentials_path, &config.token_path)
                .access_token()
                .await?;
            Ok(ServiceContext::live(Some(token), None))
        }
        Command::Sync { .. } => {
            let backend = config.backend()?;
            Ok(ServiceContext::live(None, Some(&backend)))
        }
    }
}

/// Dispatch a command with the given service context.
async fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Links { output } => links::run_with_context(ctx, output).await,
        Command::Sync { input, dry_run } => sync::run_with_context(ctx, input, *dry_run).await,
        Command::Inspect { folder_id } => inspect::run_with_context(ctx, folder_id).await,
    }
}
