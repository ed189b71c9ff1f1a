use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use log::info;

use story_progress_core::{
    ChannelBridge, MediaItem, MediaList, ProgressError, SaveKind, StoryUpdateProgress, Transition,
    TransitionHooks, UploadKind,
};

mod script;
mod terminal_observer;
use terminal_observer::TerminalProgressObserver;

#[derive(Parser)]
#[command(name = "story-progress", about = "Replay story upload/save events through a progress tracker")]
struct Args {
    /// JSON-lines file of `{"family": "upload"|"save", "mediaId", "state", ...}` events
    #[arg(short, long)]
    script: PathBuf,

    /// Media ids that belong to the story (comma separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    media: Vec<String>,

    /// Bridge channel capacity
    #[arg(short, long, default_value = "256")]
    capacity: usize,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = replay(args).await {
        eprintln!("Replay failed: {}", e);
        std::process::exit(1);
    }
}

async fn replay(args: Args) -> Result<(), ProgressError> {
    let events = script::load_script(&args.script)?;
    let media = MediaList::new(args.media.iter().map(|id| MediaItem::new(id.as_str())).collect());

    let hooks = TransitionHooks::new()
        .on(Transition::Upload(UploadKind::Failed), |ev| {
            info!("upload failed for {:?}", ev.media_id);
        })
        .on(Transition::Save(SaveKind::Result), |ev| {
            info!("save result for {:?}: success={:?}", ev.media_id, ev.success);
        })
        .on(Transition::Save(SaveKind::ModelCreated), |ev| {
            info!("media model created for {:?}", ev.media_id);
        });

    let observer = TerminalProgressObserver::new();
    let tracker = StoryUpdateProgress::builder(media)
        .with_hooks(hooks)
        .with_observer(Box::new(observer.clone()))
        .build();

    let (bridge, sender, pump) = ChannelBridge::builder().with_capacity(args.capacity).build();
    tracker.mount(&bridge);
    let pump_handle = tokio::spawn(pump.run());

    println!("Replaying {} events from {}", events.len(), args.script.display());
    let start = Instant::now();
    for (family, event) in events {
        sender.send(family, event).await?;
    }
    // Closing the last sender lets the pump drain and return.
    drop(sender);
    let delivered = pump_handle.await.unwrap_or(0);

    let state = tracker.state();
    tracker.unmount();
    observer.finish(&state);

    println!(
        "Delivered {} events in {:.2}s",
        delivered,
        start.elapsed().as_secs_f64()
    );
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
