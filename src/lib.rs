//! Keeps virtual objects attached to physical images found by an AR
//! tracking backend.
//!
//! [`sync::ImageTrackingSynchronizer`] subscribes to a
//! [`tracking::TrackedImageManager`] and mirrors every tracked image as a
//! clone of a prototype object in a [`scene_graph::Scene`].

pub mod scene_graph;
pub mod sync;
pub mod tracking;
