use anyhow::{Result, bail};
use watchtrack_core::FilteredVideos;
use watchtrack_service::{AddOutcome, CollectionViewModel};

use super::{Context, drain_failures, find_by_name, print_videos, user_facing};
use crate::Credentials;

pub(crate) async fn add(ctx: &Context, creds: &Credentials, name: &str, episode: u32) -> Result<()> {
    let dispatcher = ctx.dispatcher(creds).await?;
    match dispatcher.add_or_update(name, episode).await.map_err(user_facing)? {
        AddOutcome::Created(video) => println!("Now tracking {} at episode {}", video.name, video.episode),
        AddOutcome::Updated { episode, .. } => println!("{} moved to episode {episode}", name.trim()),
    }
    Ok(())
}

pub(crate) async fn list(ctx: &Context, creds: &Credentials, search: &str, json: bool) -> Result<()> {
    let view = CollectionViewModel::new(ctx.dispatcher(creds).await?);
    view.wait_until_loaded().await;
    match view.filtered(search) {
        FilteredVideos::NoVideos => println!("No videos yet. Add one with `watchtrack add`."),
        FilteredVideos::NoMatches => println!("Nothing matches \"{search}\"."),
        FilteredVideos::Matches(videos) if json => {
            println!("{}", serde_json::to_string_pretty(&videos)?);
        },
        FilteredVideos::Matches(videos) => print_videos(&videos),
    }
    Ok(())
}

/// Increment or decrement through the view model, like the list buttons do.
pub(crate) async fn step(ctx: &Context, creds: &Credentials, name: &str, forward: bool) -> Result<()> {
    let mut events = ctx.errors.subscribe();
    let view = CollectionViewModel::new(ctx.dispatcher(creds).await?);
    let snapshot = view.wait_until_loaded().await;
    let video = find_by_name(&snapshot.videos, name)?;

    let write = if forward { view.increment(&video.id) } else { view.decrement(&video.id) };
    let Some(write) = write else {
        println!("{} is already at episode 0", video.name);
        return Ok(());
    };
    write.await?;
    drain_failures(&mut events)?;

    let episode = view.videos().iter().find(|v| v.id == video.id).map_or(0, |v| v.episode);
    println!("{} is now at episode {episode}", video.name);
    Ok(())
}

pub(crate) async fn set(ctx: &Context, creds: &Credentials, name: &str, episode: u32) -> Result<()> {
    let dispatcher = ctx.dispatcher(creds).await?;
    let video = find_by_name(&dispatcher.list().await.map_err(user_facing)?, name)?;
    dispatcher.update_episode(&video.id, episode).await.map_err(user_facing)?;
    println!("{} is now at episode {episode}", video.name);
    Ok(())
}

pub(crate) async fn remove(ctx: &Context, creds: &Credentials, name: &str) -> Result<()> {
    let dispatcher = ctx.dispatcher(creds).await?;
    let video = find_by_name(&dispatcher.list().await.map_err(user_facing)?, name)?;
    dispatcher.delete(&video.id).await.map_err(user_facing)?;
    println!("Stopped tracking {}", video.name);
    Ok(())
}

pub(crate) async fn clear(ctx: &Context, creds: &Credentials, yes: bool) -> Result<()> {
    if !yes {
        bail!("This removes every tracked show. Re-run with --yes to confirm.");
    }
    let removed = ctx.dispatcher(creds).await?.delete_all().await.map_err(user_facing)?;
    println!("Removed {removed} shows");
    Ok(())
}
