//! Follow the collection until interrupted.

use anyhow::Result;
use watchtrack_core::FilteredVideos;
use watchtrack_service::{CollectionSnapshot, CollectionViewModel};

use super::{Context, print_videos};
use crate::Credentials;

fn render(snapshot: &CollectionSnapshot, search: &str) {
    println!("---");
    match watchtrack_core::filter_videos(&snapshot.videos, search) {
        FilteredVideos::NoVideos => println!("No videos yet."),
        FilteredVideos::NoMatches => println!("Nothing matches \"{search}\"."),
        FilteredVideos::Matches(videos) => print_videos(&videos),
    }
}

pub(crate) async fn run(ctx: &Context, creds: &Credentials, search: &str) -> Result<()> {
    let mut events = ctx.errors.subscribe();
    let view = CollectionViewModel::new(ctx.dispatcher(creds).await?);
    let mut snapshots = view.subscribe();
    render(&view.wait_until_loaded().await, search);
    drop(snapshots.borrow_and_update());

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot, search);
            }
            event = events.recv() => {
                if let Ok(event) = event {
                    eprintln!("{}", event.message());
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
