use std::sync::Arc;

use anyhow::Result;
use watchtrack_core::FeatureFlags;
use watchtrack_service::ConfigService;

use super::{Context, user_facing};
use crate::FlagsAction;

pub(crate) async fn run(ctx: &Context, action: FlagsAction) -> Result<()> {
    let config = ConfigService::new(Arc::clone(&ctx.storage));
    let flags = match action {
        FlagsAction::Show => config.load().await.map_err(user_facing)?,
        FlagsAction::Set { delete_all } => {
            let flags = FeatureFlags { is_delete_all_enabled: delete_all };
            config.save(flags).await.map_err(user_facing)?;
            flags
        },
    };
    println!("{}", serde_json::to_string_pretty(&flags)?);
    Ok(())
}
