use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use imagesync::tracking::{Pose, TrackedImage, TrackingState};

/// Scripted appearance of one reference image in front of the camera.
struct Cue {
    name: &'static str,
    position: Vec3,
    visible: std::ops::Range<u32>,
    limited: std::ops::Range<u32>,
}

/// Stands in for an AR backend: produces per-frame image observations for a
/// fixed script, with some noise on the poses.
pub struct SimulatedSession {
    cues: Vec<Cue>,
    rng: StdRng,
    frame: u32,
}

impl SimulatedSession {
    pub fn new(seed: u64) -> Self {
        let cues = vec![
            Cue {
                name: "cardA",
                position: Vec3::new(-0.1, 0.0, -0.4),
                visible: 5..60,
                limited: 25..35,
            },
            Cue {
                name: "cardB",
                position: Vec3::new(0.15, -0.05, -0.5),
                visible: 20..45,
                limited: 0..0,
            },
            Cue {
                name: "poster",
                position: Vec3::new(0.0, 0.3, -1.2),
                visible: 10..15,
                limited: 0..0,
            },
        ];

        Self {
            cues,
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
        }
    }

    pub fn reference_images(&self) -> impl Iterator<Item = &'static str> + '_ {
        // The poster is deliberately left out of the library.
        self.cues
            .iter()
            .map(|cue| cue.name)
            .filter(|&name| name != "poster")
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn next_frame(&mut self) -> Vec<TrackedImage> {
        let frame = self.frame;
        self.frame += 1;

        let mut observations = Vec::new();

        for cue in &self.cues {
            if !cue.visible.contains(&frame) {
                continue;
            }

            let jitter = Vec3::new(
                self.rng.gen_range(-0.002..0.002),
                self.rng.gen_range(-0.002..0.002),
                self.rng.gen_range(-0.002..0.002),
            );
            let sway = Quat::from_rotation_y((frame as f32 * 0.05).sin() * 0.1);

            let tracking_state = if cue.limited.contains(&frame) {
                TrackingState::Limited
            } else {
                TrackingState::Tracking
            };

            observations.push(TrackedImage::new(
                cue.name,
                Pose::new(cue.position + jitter, sway),
                tracking_state,
            ));
        }

        observations
    }
}
