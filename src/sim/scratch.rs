//! Scratch-card reveal
//!
//! An opaque fog covers the final picture. Each pointer sample taken while
//! pressed punches a round hole in the coverage buffer; once enough of the
//! sampled buffer is clear the card is revealed for good.

use serde::Serialize;

use crate::consts::*;

/// One pointer/touch sample in surface coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    /// Button held / finger down
    pub pressed: bool,
}

impl PointerSample {
    pub fn pressed(x: f32, y: f32) -> Self {
        Self { x, y, pressed: true }
    }
}

/// Per-pixel opacity of the fog layer (255 = fully covered)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageBuffer {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl CoverageBuffer {
    /// Fully opaque buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![u8::MAX; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.alpha[(y * self.width + x) as usize])
    }

    /// Clear every pixel whose centre lies within `radius` of (cx, cy)
    pub fn erase_circle(&mut self, cx: f32, cy: f32, radius: f32) {
        if self.alpha.is_empty() || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let x0 = (cx - radius).floor().max(0.0) as u32;
        let y0 = (cy - radius).floor().max(0.0) as u32;
        let x1 = ((cx + radius).ceil().max(0.0) as u32).min(self.width);
        let y1 = ((cy + radius).ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            let dy = y as f32 + 0.5 - cy;
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    self.alpha[row + x as usize] = 0;
                }
            }
        }
    }

    /// Share of every `stride`-th pixel (row-major) below `threshold`
    pub fn erased_fraction(&self, stride: usize, threshold: u8) -> f32 {
        let stride = stride.max(1);
        let mut sampled = 0u32;
        let mut erased = 0u32;
        for &a in self.alpha.iter().step_by(stride) {
            sampled += 1;
            if a < threshold {
                erased += 1;
            }
        }
        if sampled == 0 {
            return 0.0;
        }
        erased as f32 / sampled as f32
    }
}

/// Scratch-card state for the finale
#[derive(Debug, Clone)]
pub struct ScratchCard {
    coverage: CoverageBuffer,
    erased_fraction: f32,
    revealed: bool,
}

/// View data for the finale
#[derive(Debug, Clone, Serialize)]
pub struct ScratchSnapshot {
    pub width: u32,
    pub height: u32,
    pub erased_percent: f32,
    pub revealed: bool,
}

impl ScratchCard {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            coverage: CoverageBuffer::new(width, height),
            erased_fraction: 0.0,
            revealed: false,
        }
    }

    pub fn coverage(&self) -> &CoverageBuffer {
        &self.coverage
    }

    pub fn erased_fraction(&self) -> f32 {
        self.erased_fraction
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Surface resized: start over with a fresh, fully opaque fog.
    /// A card that is already revealed stays revealed.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("Scratch surface resized to {}x{}", width, height);
        self.coverage = CoverageBuffer::new(width, height);
        self.erased_fraction = 0.0;
    }

    /// Apply one pointer sample. Returns true on the sample that reveals.
    pub fn scratch(&mut self, sample: PointerSample) -> bool {
        if !sample.pressed {
            return false;
        }
        self.coverage.erase_circle(sample.x, sample.y, ERASE_RADIUS);
        self.erased_fraction = self
            .coverage
            .erased_fraction(SAMPLE_STRIDE, ERASED_ALPHA_THRESHOLD);

        if !self.revealed && self.erased_fraction > REVEAL_FRACTION {
            self.revealed = true;
            log::info!(
                "Scratch card revealed at {:.1}% erased",
                self.erased_fraction * 100.0
            );
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> ScratchSnapshot {
        ScratchSnapshot {
            width: self.coverage.width(),
            height: self.coverage.height(),
            erased_percent: self.erased_fraction * 100.0,
            revealed: self.revealed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Erase the top 65 rows of a 100x100 card with brush-sized strokes
    fn scratch_top_rows(card: &mut ScratchCard) {
        for y in (0..=35).step_by(5) {
            for x in (0..=100).step_by(5) {
                card.scratch(PointerSample::pressed(x as f32, y as f32));
            }
        }
    }

    #[test]
    fn test_new_buffer_is_opaque() {
        let card = ScratchCard::new(100, 100);
        assert_eq!(card.coverage().alpha_at(0, 0), Some(255));
        assert_eq!(card.coverage().alpha_at(99, 99), Some(255));
        assert_eq!(card.coverage().alpha_at(100, 0), None);
        assert!(!card.is_revealed());
    }

    #[test]
    fn test_erase_circle_radius() {
        let mut buf = CoverageBuffer::new(100, 100);
        buf.erase_circle(50.0, 50.0, ERASE_RADIUS);
        assert_eq!(buf.alpha_at(50, 50), Some(0));
        assert_eq!(buf.alpha_at(50, 79), Some(0));
        assert_eq!(buf.alpha_at(50, 81), Some(255));
        assert_eq!(buf.alpha_at(5, 5), Some(255));
    }

    #[test]
    fn test_erase_clips_at_edges() {
        let mut buf = CoverageBuffer::new(40, 40);
        buf.erase_circle(-10.0, -10.0, ERASE_RADIUS);
        assert_eq!(buf.alpha_at(0, 0), Some(0));
        buf.erase_circle(500.0, 500.0, ERASE_RADIUS);
        assert_eq!(buf.alpha_at(39, 39), Some(255));
    }

    #[test]
    fn test_unpressed_samples_ignored() {
        let mut card = ScratchCard::new(100, 100);
        card.scratch(PointerSample {
            x: 50.0,
            y: 50.0,
            pressed: false,
        });
        assert_eq!(card.coverage().alpha_at(50, 50), Some(255));
        assert_eq!(card.erased_fraction(), 0.0);
    }

    #[test]
    fn test_reveal_at_65_percent_and_stays() {
        let mut card = ScratchCard::new(100, 100);
        scratch_top_rows(&mut card);
        let fraction = card.erased_fraction();
        assert!(fraction > 0.6 && fraction < 0.7, "fraction was {fraction}");
        assert!(card.is_revealed());

        assert!(!card.scratch(PointerSample::pressed(50.0, 90.0)));
        assert!(card.is_revealed());
    }

    #[test]
    fn test_below_threshold_not_revealed() {
        let mut card = ScratchCard::new(100, 100);
        for x in (0..=100).step_by(5) {
            card.scratch(PointerSample::pressed(x as f32, 25.0));
        }
        assert!(card.erased_fraction() <= 0.6);
        assert!(!card.is_revealed());
    }

    #[test]
    fn test_reveal_reported_once() {
        let mut card = ScratchCard::new(100, 100);
        let mut reveals = 0;
        for y in (0..=100).step_by(10) {
            for x in (0..=100).step_by(10) {
                if card.scratch(PointerSample::pressed(x as f32, y as f32)) {
                    reveals += 1;
                }
            }
        }
        assert_eq!(reveals, 1);
    }

    #[test]
    fn test_resize_reopaques() {
        let mut card = ScratchCard::new(100, 100);
        card.scratch(PointerSample::pressed(50.0, 50.0));
        assert!(card.erased_fraction() > 0.0);

        card.resize(200, 150);
        assert_eq!(card.coverage().width(), 200);
        assert_eq!(card.coverage().alpha_at(50, 50), Some(255));
        assert_eq!(card.erased_fraction(), 0.0);
    }

    #[test]
    fn test_resize_keeps_reveal() {
        let mut card = ScratchCard::new(100, 100);
        scratch_top_rows(&mut card);
        card.resize(120, 120);
        assert!(card.is_revealed());
    }

    #[test]
    fn test_zero_area_never_reveals() {
        let mut card = ScratchCard::new(0, 0);
        assert!(!card.scratch(PointerSample::pressed(0.0, 0.0)));
        assert_eq!(card.erased_fraction(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_erase_idempotent(points in proptest::collection::vec((0.0f32..120.0, 0.0f32..120.0), 1..12)) {
            let mut once = CoverageBuffer::new(100, 100);
            let mut twice = CoverageBuffer::new(100, 100);
            for &(x, y) in &points {
                once.erase_circle(x, y, ERASE_RADIUS);
                twice.erase_circle(x, y, ERASE_RADIUS);
                twice.erase_circle(x, y, ERASE_RADIUS);
            }
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_reveal_monotonic(points in proptest::collection::vec((0.0f32..100.0, 0.0f32..100.0), 1..80)) {
            let mut card = ScratchCard::new(100, 100);
            let mut seen_revealed = false;
            let mut last_fraction = 0.0;
            for (x, y) in points {
                card.scratch(PointerSample::pressed(x, y));
                prop_assert!(card.erased_fraction() >= last_fraction);
                last_fraction = card.erased_fraction();
                if seen_revealed {
                    prop_assert!(card.is_revealed());
                }
                seen_revealed = card.is_revealed();
            }
        }
    }
}
