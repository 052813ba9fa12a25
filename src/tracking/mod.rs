//! Interface to the AR tracking backend: tracked image records, change
//! batches and the manager that publishes them to subscribers.

mod library;
mod manager;
mod pose;
mod tracked_image;

pub use library::ReferenceImageLibrary;
pub use manager::{SubscriptionId, TrackedImageManager, TrackingConfig};
pub use pose::Pose;
pub use tracked_image::{TrackedImage, TrackedImagesChanged, TrackingState};
