use std::collections::VecDeque;

use super::LandmarkFilter;
use crate::landmarks::{Frame, Landmark};
use log::debug;

/// Per-session moving average over the last `window_size` frames
///
/// The first accepted frame fixes the landmark count; frames with a different
/// count are discarded until the history is reset.
pub struct LandmarkSmoother {
    window_size: usize,
    buffer: VecDeque<Frame>,
}

impl LandmarkSmoother {
    /// Smoother averaging the last `window_size` frames
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is 0; use [`super::create_moving_average`]
    /// for a fallible constructor.
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size),
        }
    }

    /// Frames currently buffered
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Landmark count established by the buffered frames
    pub fn landmark_count(&self) -> Option<usize> {
        self.buffer.front().map(Frame::len)
    }

    fn average(&self) -> Frame {
        let count = self.landmark_count().unwrap_or_default();
        let n = self.buffer.len() as f64;

        let mut sums = vec![Landmark::default(); count];
        for frame in &self.buffer {
            for (sum, lm) in sums.iter_mut().zip(frame.landmarks()) {
                sum.x += lm.x;
                sum.y += lm.y;
                sum.score += lm.score;
            }
        }

        sums.into_iter()
            .map(|sum| Landmark::new(sum.x / n, sum.y / n, sum.score / n))
            .collect::<Vec<_>>()
            .into()
    }
}

impl LandmarkFilter for LandmarkSmoother {
    fn apply(&mut self, frame: &Frame) -> Option<Frame> {
        if frame.is_empty() {
            debug!("Discarding empty frame");
            return None;
        }
        if let Some(expected) = self.landmark_count() {
            if expected != frame.len() {
                debug!("Discarding frame with {} landmarks, expected {}", frame.len(), expected);
                return None;
            }
        }

        if self.buffer.len() >= self.window_size {
            self.buffer.pop_front();
        }
        self.buffer.push_back(frame.clone());

        Some(self.average())
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn name(&self) -> &str {
        "LandmarkSmoother"
    }
}
