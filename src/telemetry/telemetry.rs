/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::warn;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::SchedulerSnapshot;

/// One snapshot request: the requester hands the controller a reply
/// channel and blocks on it.
pub type SnapshotRequest = cbc::Sender<SchedulerSnapshot>;

/**
 * Client handle for pulling scheduler snapshots out of the decision
 * loop. Requests are served by the controller between event
 * applications, so every snapshot reflects a single instant; freshness
 * is "most recent completed event application", nothing more.
 *
 * Cloneable and safe to use from any thread; it never blocks the
 * decision loop, only the requester.
 */
#[derive(Clone)]
pub struct TelemetryPublisher {
    request_tx: cbc::Sender<SnapshotRequest>,
}

impl TelemetryPublisher {
    pub fn new(request_tx: cbc::Sender<SnapshotRequest>) -> TelemetryPublisher {
        TelemetryPublisher { request_tx }
    }

    /// Consistent snapshot of all cars and calls, or `None` if the
    /// controller has shut down.
    pub fn snapshot(&self) -> Option<SchedulerSnapshot> {
        let (reply_tx, reply_rx) = cbc::bounded::<SchedulerSnapshot>(1);
        if self.request_tx.send(reply_tx).is_err() {
            warn!("snapshot request failed: controller gone");
            return None;
        }
        reply_rx.recv().ok()
    }

    /// Snapshot serialized for the visualization sink.
    pub fn snapshot_json(&self) -> Option<String> {
        let snapshot = self.snapshot()?;
        match serde_json::to_string(&snapshot) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!("failed to serialize snapshot: {}", e);
                None
            }
        }
    }
}
