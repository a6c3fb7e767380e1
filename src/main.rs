//! lector - read a document aloud with live word highlighting
//!
//! Command-line harness for the reading synchronization engine. Drives the
//! engine with a paced simulated narrator and a console display surface so
//! the whole play/highlight/finish cycle can be exercised without a speech
//! backend; `--html-out` renders the decorated document instead.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lector::config::{default_config_path, LectorConfig};
use lector::display::DisplaySurface;
use lector::events::{EventBus, LectorEvent};
use lector::index::SpanIndex;
use lector::narration::{EventSink, NarrationHandle, NarrationRequest, Narrator};
use lector::playback::PlaybackEngine;
use lector::render::render_document;

/// Command-line arguments for lector
#[derive(Parser, Debug)]
#[command(name = "lector")]
#[command(about = "Read a document aloud with live word highlighting")]
#[command(version)]
struct Args {
    /// Document to read
    file: PathBuf,

    /// Speech rate multiplier (overrides config)
    #[arg(long)]
    rate: Option<f64>,

    /// Voice name (overrides config)
    #[arg(long)]
    voice: Option<String>,

    /// Volume 0-100 (overrides config)
    #[arg(long)]
    volume: Option<u8>,

    /// Configuration file path
    #[arg(long, env = "LECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Render the document to HTML with unit markup and exit
    #[arg(long)]
    html_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lector=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config_path = match args.config.clone() {
        Some(path) => path,
        None => default_config_path().context("resolving config path")?,
    };
    let config = LectorConfig::load(&config_path);
    debug!("loaded config from {}", config_path.display());

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;

    if let Some(out) = args.html_out {
        let html = render_document(&text, &config.highlight);
        std::fs::write(&out, html).with_context(|| format!("writing {}", out.display()))?;
        info!("rendered {} -> {}", args.file.display(), out.display());
        return Ok(());
    }

    let mut options = config.narration_options();
    if let Some(rate) = args.rate {
        options.rate = rate;
    }
    if let Some(voice) = args.voice {
        options.voice = voice;
    }
    if let Some(volume) = args.volume {
        options.volume = volume;
    }

    // The console display needs unit texts; it reads its own index over the
    // same snapshot the engine indexes.
    let index = Arc::new(SpanIndex::build(&text));
    info!(
        "indexed {}: {} sentences, {} words",
        args.file.display(),
        index.sentences().len(),
        index.words().len()
    );

    let event_bus = Arc::new(EventBus::new(256));
    let engine = Arc::new(PlaybackEngine::new(
        Arc::new(PacedNarrator::default()),
        Arc::new(ConsoleDisplay::new(Arc::clone(&index))),
        Arc::clone(&event_bus),
    ));
    engine.start().await;

    let mut events = BroadcastStream::new(event_bus.subscribe());
    engine.play(&text, options).await?;

    while let Some(event) = events.next().await {
        match event {
            Ok(LectorEvent::PlaybackFinished { .. }) => {
                info!("finished reading");
                break;
            }
            Ok(LectorEvent::PlaybackError { detail, .. }) => {
                error!("narration failed: {detail}");
                break;
            }
            Ok(_) => {}
            Err(_) => {} // lagged; keep draining
        }
    }

    Ok(())
}

/// Simulated narration capability
///
/// Walks the words of the submitted text on a timer scaled by the requested
/// rate, emitting word boundaries the way a speech backend would. Honors
/// cancellation between words.
#[derive(Default)]
struct PacedNarrator {
    cancels: Mutex<HashMap<NarrationHandle, Arc<AtomicBool>>>,
}

impl Narrator for PacedNarrator {
    fn is_configured(&self) -> bool {
        true
    }

    fn submit(&self, request: NarrationRequest, sink: EventSink) -> lector::Result<NarrationHandle> {
        let handle = NarrationHandle::new();
        let canceled = Arc::new(AtomicBool::new(false));
        if let Ok(mut cancels) = self.cancels.lock() {
            cancels.insert(handle, Arc::clone(&canceled));
        }

        let words: Vec<(usize, usize)> = SpanIndex::build(&request.text)
            .words()
            .iter()
            .map(|w| (w.start, w.end - w.start))
            .collect();
        let rate = request.rate;

        tokio::spawn(async move {
            for (offset, length) in words {
                if canceled.load(Ordering::SeqCst) {
                    sink.canceled();
                    return;
                }
                sink.word_boundary(offset, length);
                let ms = (120.0 + 45.0 * length as f64) / rate;
                tokio::time::sleep(Duration::from_millis(ms as u64)).await;
            }
            if canceled.load(Ordering::SeqCst) {
                sink.canceled();
            } else {
                sink.completed();
            }
        });

        Ok(handle)
    }

    fn cancel(&self, handle: NarrationHandle) {
        if let Ok(cancels) = self.cancels.lock() {
            if let Some(flag) = cancels.get(&handle) {
                flag.store(true, Ordering::SeqCst);
            }
        }
    }
}

const NO_SENTENCE: usize = usize::MAX;

/// Console display surface: prints each sentence once and its words as the
/// narrator reaches them
struct ConsoleDisplay {
    index: Arc<SpanIndex>,
    current_sentence: AtomicUsize,
    auto_scroll: AtomicBool,
}

impl ConsoleDisplay {
    fn new(index: Arc<SpanIndex>) -> Self {
        Self {
            index,
            current_sentence: AtomicUsize::new(NO_SENTENCE),
            auto_scroll: AtomicBool::new(true),
        }
    }
}

impl DisplaySurface for ConsoleDisplay {
    fn mark_current(&self, sentence_id: usize, word_id: Option<usize>) {
        let previous = self.current_sentence.swap(sentence_id, Ordering::SeqCst);
        if previous != sentence_id {
            println!();
        }
        if let Some(word) = word_id.and_then(|id| self.index.word(id)) {
            print!("{} ", word.text);
            let _ = std::io::stdout().flush();
        }
    }

    fn clear_all(&self) {
        self.current_sentence.store(NO_SENTENCE, Ordering::SeqCst);
        println!();
    }

    fn scroll_into_view(&self, sentence_id: usize) {
        debug!(sentence_id, "scroll into view");
    }

    fn is_auto_scroll_enabled(&self) -> bool {
        self.auto_scroll.load(Ordering::SeqCst)
    }

    fn set_auto_scroll_enabled(&self, enabled: bool) {
        self.auto_scroll.store(enabled, Ordering::SeqCst);
    }
}
