use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use watchtrack_service::{ImportMode, MigrationService};

use super::{Context, user_facing};
use crate::Credentials;

pub(crate) async fn export(ctx: &Context, creds: &Credentials, output: &Path) -> Result<()> {
    let document = ctx.dispatcher(creds).await?.export().await.map_err(user_facing)?;
    if output == Path::new("-") {
        println!("{document}");
        return Ok(());
    }
    std::fs::write(output, document)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Exported to {}", output.display());
    Ok(())
}

pub(crate) async fn import(ctx: &Context, creds: &Credentials, file: &Path, append: bool) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let mode = if append { ImportMode::Append } else { ImportMode::Merge };
    let summary = ctx.dispatcher(creds).await?.bulk_import(&text, mode).await.map_err(user_facing)?;
    println!(
        "Imported {} (added {}, updated {}, skipped {})",
        summary.written(),
        summary.added,
        summary.updated,
        summary.skipped
    );
    Ok(())
}

pub(crate) async fn migrate(ctx: &Context, from: &str, to: &str) -> Result<()> {
    let outcome = MigrationService::new(Arc::clone(&ctx.storage))
        .migrate_owner(from, to)
        .await
        .map_err(user_facing)?;
    println!("Copied {} shows from {} to {}", outcome.copied, from.trim(), to.trim());
    Ok(())
}
