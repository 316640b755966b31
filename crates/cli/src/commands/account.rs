use anyhow::Result;

use super::{Context, user_facing};
use crate::Credentials;

pub(crate) async fn signup(ctx: &Context, creds: &Credentials) -> Result<()> {
    let identity = ctx.accounts().sign_up(&creds.phone, &creds.password).await.map_err(user_facing)?;
    println!("Registered {} ({})", identity.identifier, identity.uid);
    Ok(())
}

pub(crate) async fn passwd(ctx: &Context, creds: &Credentials, new: &str, confirm: &str) -> Result<()> {
    let identity = ctx.sign_in(creds).await?;
    ctx.accounts().change_password(&identity, new, confirm).await.map_err(user_facing)?;
    ctx.accounts().sign_out(&identity).await.map_err(user_facing)?;
    println!("Password changed.");
    Ok(())
}
