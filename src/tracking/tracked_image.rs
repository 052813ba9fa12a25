use crate::tracking::pose::Pose;

/// Confidence the AR backend has in an image's pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// Pose is being actively tracked
    Tracking,
    /// Pose is known but degraded, e.g. the image is partly out of view
    Limited,
    /// Not tracked at all
    #[default]
    None,
}

/// A reference image as seen by the AR backend on one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedImage {
    /// Name of the reference image, stable across frames.
    pub name: String,
    pub pose: Pose,
    pub tracking_state: TrackingState,
}

impl TrackedImage {
    pub fn new(name: impl Into<String>, pose: Pose, tracking_state: TrackingState) -> Self {
        Self {
            name: name.into(),
            pose,
            tracking_state,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking_state == TrackingState::Tracking
    }
}

/// One batch of tracked image changes. Within a batch, a name appears in at
/// most one of the three lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedImagesChanged {
    pub added: Vec<TrackedImage>,
    pub updated: Vec<TrackedImage>,
    pub removed: Vec<TrackedImage>,
}

impl TrackedImagesChanged {
    pub fn added(images: impl IntoIterator<Item = TrackedImage>) -> Self {
        Self {
            added: images.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn updated(images: impl IntoIterator<Item = TrackedImage>) -> Self {
        Self {
            updated: images.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn removed(images: impl IntoIterator<Item = TrackedImage>) -> Self {
        Self {
            removed: images.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}
