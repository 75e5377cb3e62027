//! Two-phase playback notification ("now playing", then "played").
//!
//! Architecture:
//! - The "now playing" signal goes out as soon as a track's URL is handed out
//! - The "played" submission is deferred to half the track (capped at 4 minutes)
//! - At most one deferred submission exists process-wide; a new playback
//!   replaces and aborts the previous one under a single lock
//! - Backend failures are logged and never reach the caller

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::AbortHandle;

use crate::models::Candidate;
use crate::providers::CatalogSession;

/// Tracks longer than this are submitted after a fixed delay.
const LONG_TRACK_SECS: u64 = 480;
const LONG_TRACK_DELAY_SECS: u64 = 240;

struct PendingPlayback {
    generation: u64,
    track_id: String,
    handle: AbortHandle,
}

#[derive(Default)]
struct Slot {
    scheduled: Option<PendingPlayback>,
    /// Submissions that left the slot and are still talking to the server.
    in_flight: usize,
}

#[derive(Default)]
struct Shared {
    slot: Mutex<Slot>,
    idle: Notify,
}

impl Shared {
    fn is_busy(&self) -> bool {
        let slot = self.slot.lock();
        slot.scheduled.is_some() || slot.in_flight > 0
    }
}

pub struct PlaybackNotifier {
    shared: Arc<Shared>,
    generation: AtomicU64,
}

impl Default for PlaybackNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Delay before the "played" submission for a track of `duration_secs`.
pub fn submission_delay(duration_secs: u64) -> Duration {
    if duration_secs > LONG_TRACK_SECS {
        Duration::from_secs(LONG_TRACK_DELAY_SECS)
    } else {
        Duration::from_secs(duration_secs / 2)
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl PlaybackNotifier {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Signal playback of `candidate` and schedule its submission.
    ///
    /// The most recent call wins: a call that is overtaken by a newer one while
    /// its "now playing" signal is out schedules nothing. Must be called from
    /// within a tokio runtime. Returns the candidate unchanged.
    pub async fn notify_playback(
        &self,
        session: Arc<dyn CatalogSession>,
        candidate: Candidate,
    ) -> Candidate {
        if candidate.duration == 0 {
            log::debug!("[PlaybackNotifier] '{}' has no duration, not scrobbling", candidate.title);
            return candidate;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_pending();

        let track_id = candidate.track_id().to_string();
        log::info!(
            "[PlaybackNotifier] Now playing: '{}' by '{}' on {}",
            candidate.title,
            candidate.artist,
            session.id()
        );
        if let Err(e) = session.signal_play_started(&track_id, now_ms()).await {
            log::warn!("[PlaybackNotifier] Now-playing signal for {} failed: {}", track_id, e);
        }

        self.schedule_submission(session, track_id, generation, submission_delay(candidate.duration));
        candidate
    }

    fn schedule_submission(
        &self,
        session: Arc<dyn CatalogSession>,
        track_id: String,
        generation: u64,
        delay: Duration,
    ) {
        // Hold the slot while spawning so the task cannot finish before it is registered.
        let mut slot = self.shared.slot.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            log::debug!("[PlaybackNotifier] {} superseded before scheduling", track_id);
            return;
        }

        let shared = self.shared.clone();
        let task_track_id = track_id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            {
                let mut current = shared.slot.lock();
                if current.scheduled.as_ref().map(|p| p.generation) != Some(generation) {
                    return;
                }
                current.scheduled = None;
                current.in_flight += 1;
            }

            match session.signal_play_finished(&task_track_id, now_ms()).await {
                Ok(()) => log::info!("[PlaybackNotifier] Submitted {}", task_track_id),
                Err(e) => log::warn!(
                    "[PlaybackNotifier] Submission for {} failed: {}",
                    task_track_id,
                    e
                ),
            }

            shared.slot.lock().in_flight -= 1;
            shared.idle.notify_waiters();
        });

        let previous = slot.scheduled.replace(PendingPlayback {
            generation,
            track_id,
            handle: task.abort_handle(),
        });
        if let Some(previous) = previous {
            log::debug!("[PlaybackNotifier] Replacing pending submission for {}", previous.track_id);
            previous.handle.abort();
        }
    }

    /// Abort the scheduled submission, if any. Safe to call repeatedly.
    ///
    /// A submission already being sent is left to finish.
    pub fn cancel_pending(&self) {
        let previous = self.shared.slot.lock().scheduled.take();
        if let Some(previous) = previous {
            log::debug!("[PlaybackNotifier] Cancelled pending submission for {}", previous.track_id);
            previous.handle.abort();
            self.shared.idle.notify_waiters();
        }
    }

    /// Whether a submission is scheduled or still being sent.
    pub fn has_pending(&self) -> bool {
        self.shared.is_busy()
    }

    /// Track id of the scheduled submission.
    pub fn pending_track(&self) -> Option<String> {
        self.shared
            .slot
            .lock()
            .scheduled
            .as_ref()
            .map(|p| p.track_id.clone())
    }

    /// Resolve once nothing is scheduled and no submission is in flight.
    pub async fn wait_idle(&self) {
        loop {
            let mut notified = std::pin::pin!(self.shared.idle.notified());
            notified.as_mut().enable();
            if !self.shared.is_busy() {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for PlaybackNotifier {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
