//! Terminal renderer for presentation events.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use showrunner_engine::PresentationEvent;

fn progress_bar(shown: usize, total: usize) -> String {
    let filled = "#".repeat(shown);
    let rest = ".".repeat(total.saturating_sub(shown));
    format!("[{filled}{rest}] {shown} / {total}")
}

/// Spawns a task that prints every presentation event to stdout.
pub fn spawn_renderer(mut events: broadcast::Receiver<PresentationEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(PresentationEvent::BeatChanged {
                    text,
                    media,
                    shown,
                    total,
                    ..
                }) => {
                    println!();
                    println!("{text}");
                    if let Some(media) = media {
                        println!("  >> now showing: {media}");
                    }
                    println!("{}", progress_bar(shown, total));
                }
                Ok(PresentationEvent::Finished) => {
                    println!("\npresentation complete. type `restart` to run it again");
                }
                Ok(PresentationEvent::Reset) => {
                    println!("\nrewound to the intro. type `start` to begin");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "renderer lagged behind the event stream");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
