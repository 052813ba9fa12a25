use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::tracking::library::ReferenceImageLibrary;
use crate::tracking::tracked_image::{TrackedImage, TrackedImagesChanged, TrackingState};

#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Consecutive frames an image may be missing before it is reported
    /// removed. Zero keeps missing images around forever.
    pub frames_until_removed: u32,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            frames_until_removed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Trackable {
    image: TrackedImage,
    missed_frames: u32,
}

/// Event source for tracked image changes.
///
/// Every subscriber has its own queue: a batch published while a
/// subscription exists is delivered to it exactly once through
/// [`TrackedImageManager::receive`], in publish order.
pub struct TrackedImageManager {
    library: ReferenceImageLibrary,
    config: TrackingConfig,
    trackables: BTreeMap<String, Trackable>,
    subscribers: HashMap<SubscriptionId, VecDeque<Rc<TrackedImagesChanged>>>,
    next_subscription: u64,
    reported_unknown: HashSet<String>,
}

impl TrackedImageManager {
    pub fn new(library: ReferenceImageLibrary, config: TrackingConfig) -> Self {
        Self {
            library,
            config,
            trackables: BTreeMap::new(),
            subscribers: HashMap::new(),
            next_subscription: 0,
            reported_unknown: HashSet::new(),
        }
    }

    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.insert(id, VecDeque::new());
        log::debug!("Subscribed {:?}", id);
        id
    }

    /// Stops delivery to `id`. Batches it has not received yet are dropped.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match self.subscribers.remove(&id) {
            Some(pending) => {
                if !pending.is_empty() {
                    log::debug!(
                        "Unsubscribed {:?} with {} undelivered batches",
                        id,
                        pending.len()
                    );
                }
                true
            }
            None => false,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn publish(&mut self, batch: TrackedImagesChanged) -> Option<Rc<TrackedImagesChanged>> {
        if batch.is_empty() {
            return None;
        }

        log::debug!(
            "Publishing batch: {} added, {} updated, {} removed",
            batch.added.len(),
            batch.updated.len(),
            batch.removed.len()
        );

        let batch = Rc::new(batch);
        for queue in self.subscribers.values_mut() {
            queue.push_back(Rc::clone(&batch));
        }

        Some(batch)
    }

    /// Drains the batches pending for `id`, oldest first.
    pub fn receive(&mut self, id: SubscriptionId) -> Vec<Rc<TrackedImagesChanged>> {
        self.subscribers
            .get_mut(&id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn trackable(&self, name: &str) -> Option<&TrackedImage> {
        self.trackables.get(name).map(|trackable| &trackable.image)
    }

    pub fn trackables(&self) -> impl Iterator<Item = &TrackedImage> {
        self.trackables.values().map(|trackable| &trackable.image)
    }

    /// Turns the images a backend observed on one frame into a change batch
    /// and publishes it.
    ///
    /// First sightings are `added` and later ones `updated`. An image that
    /// disappears from the observations is reported `updated` with
    /// [`TrackingState::None`] once, then `removed` after
    /// [`TrackingConfig::frames_until_removed`] consecutive missing frames.
    pub fn process_frame(
        &mut self,
        observations: &[TrackedImage],
    ) -> Option<Rc<TrackedImagesChanged>> {
        let mut seen: BTreeMap<&str, &TrackedImage> = BTreeMap::new();

        for observation in observations {
            if self.library.contains(&observation.name) {
                seen.insert(observation.name.as_str(), observation);
            } else if self.reported_unknown.insert(observation.name.clone()) {
                log::warn!(
                    "Ignoring observation of '{}', which is not in the reference library",
                    observation.name
                );
            }
        }

        let mut batch = TrackedImagesChanged::default();

        for (&name, &observation) in &seen {
            match self.trackables.get_mut(name) {
                Some(trackable) => {
                    trackable.image = observation.clone();
                    trackable.missed_frames = 0;
                    batch.updated.push(observation.clone());
                }
                None => {
                    self.trackables.insert(
                        name.to_string(),
                        Trackable {
                            image: observation.clone(),
                            missed_frames: 0,
                        },
                    );
                    batch.added.push(observation.clone());
                }
            }
        }

        let frames_until_removed = self.config.frames_until_removed;
        let mut expired = Vec::new();

        for (name, trackable) in self.trackables.iter_mut() {
            if seen.contains_key(name.as_str()) {
                continue;
            }

            trackable.missed_frames = trackable.missed_frames.saturating_add(1);

            if frames_until_removed > 0 && trackable.missed_frames >= frames_until_removed {
                expired.push(name.clone());
            } else if trackable.image.tracking_state != TrackingState::None {
                trackable.image.tracking_state = TrackingState::None;
                batch.updated.push(trackable.image.clone());
            }
        }

        for name in expired {
            if let Some(mut trackable) = self.trackables.remove(&name) {
                log::debug!("Image '{}' lost, removing", name);
                trackable.image.tracking_state = TrackingState::None;
                batch.removed.push(trackable.image);
            }
        }

        self.publish(batch)
    }
}
