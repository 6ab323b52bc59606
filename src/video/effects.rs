use clap::ValueEnum;
use image::{Rgb, RgbImage};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{config::MotionConfig, video::types::Frame};

/// Direction of the pan across the zoom headroom.
///
/// Coordinates are fractions of the headroom: (0, 0) keeps the top-left
/// corner anchored, (1, 1) the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanPath {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

impl PanPath {
    pub const CENTERED: PanPath = PanPath {
        from: (0.5, 0.5),
        to: (0.5, 0.5),
    };

    /// Corner-to-opposite-corner drift picked from a seed
    pub fn seeded(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let start_x = if rng.gen_bool(0.5) { 0.0 } else { 1.0 };
        let start_y = if rng.gen_bool(0.5) { 0.0 } else { 1.0 };

        Self {
            from: (start_x, start_y),
            to: (1.0 - start_x, 1.0 - start_y),
        }
    }

    fn at(&self, progress: f32) -> (f32, f32) {
        (
            self.from.0 + (self.to.0 - self.from.0) * progress,
            self.from.1 + (self.to.1 - self.from.1) * progress,
        )
    }
}

/// Slow zoom with an optional pan over a still image
#[derive(Debug, Clone)]
pub struct KenBurns {
    zoom_start: f32,
    zoom_end: f32,
    pan: bool,
    duration: f64,
}

impl KenBurns {
    pub fn new(motion: &MotionConfig, duration: f64) -> Self {
        Self {
            zoom_start: motion.zoom_start,
            zoom_end: motion.zoom_end,
            pan: motion.pan,
            duration,
        }
    }

    /// Pan path for the image at `order_index`; identical on every run
    pub fn path_for(&self, order_index: usize) -> PanPath {
        if self.pan {
            PanPath::seeded(order_index as u64)
        } else {
            PanPath::CENTERED
        }
    }

    /// Scale applied at `local_time` seconds into the clip
    pub fn zoom_at(&self, local_time: f64) -> f32 {
        let progress = self.progress(local_time);
        self.zoom_start + (self.zoom_end - self.zoom_start) * progress
    }

    fn progress(&self, local_time: f64) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (local_time / self.duration).clamp(0.0, 1.0) as f32
    }

    /// Render the frame seen `local_time` seconds into the clip.
    ///
    /// The visible window shrinks by the zoom factor and is resampled
    /// bilinearly back to full size, so motion stays smooth at sub-pixel
    /// offsets.
    pub fn render(&self, source: &Frame, path: PanPath, local_time: f64) -> Frame {
        let progress = self.progress(local_time);
        resample(source, self.zoom_at(local_time), path.at(progress))
    }
}

/// Extra scale the zoom transitions travel through
const TRANSITION_ZOOM: f32 = 1.1;

/// Keeps the per-image transition picks independent of the pan corners
const TRANSITION_SEED: u64 = 0x7472_616e_7369_7469;

/// How one image hands over to the next during the overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionStyle {
    /// Linear blend of the two images
    Crossfade,
    /// Fade out to black, then fade the next image up
    FadeThroughBlack,
    /// The outgoing image pushes in while it fades out
    ZoomIn,
    /// The incoming image settles from a close-up while it fades in
    ZoomOut,
    /// A different style for every image, picked from its order index
    Mixed,
}

impl TransitionStyle {
    const CONCRETE: [TransitionStyle; 4] = [
        TransitionStyle::Crossfade,
        TransitionStyle::FadeThroughBlack,
        TransitionStyle::ZoomIn,
        TransitionStyle::ZoomOut,
    ];

    /// Style used for the transition into the image at `order_index`
    pub fn for_clip(self, order_index: usize) -> TransitionStyle {
        match self {
            TransitionStyle::Mixed => {
                let mut rng = SmallRng::seed_from_u64(order_index as u64 ^ TRANSITION_SEED);
                Self::CONCRETE[rng.gen_range(0..Self::CONCRETE.len())]
            }
            style => style,
        }
    }

    /// Combine both frames `alpha` of the way through the transition.
    ///
    /// Every style returns `outgoing` at 0.0 and `incoming` at 1.0.
    pub fn apply(self, outgoing: &Frame, incoming: &Frame, alpha: f32) -> Frame {
        let alpha = alpha.clamp(0.0, 1.0);

        match self {
            TransitionStyle::Crossfade | TransitionStyle::Mixed => outgoing.blend(incoming, alpha),
            TransitionStyle::FadeThroughBlack => {
                if alpha < 0.5 {
                    outgoing.fade(1.0 - 2.0 * alpha)
                } else {
                    incoming.fade(2.0 * alpha - 1.0)
                }
            }
            TransitionStyle::ZoomIn => {
                let zoom = 1.0 + (TRANSITION_ZOOM - 1.0) * alpha;
                resample(outgoing, zoom, (0.5, 0.5)).blend(incoming, alpha)
            }
            TransitionStyle::ZoomOut => {
                let zoom = TRANSITION_ZOOM - (TRANSITION_ZOOM - 1.0) * alpha;
                outgoing.blend(&resample(incoming, zoom, (0.5, 0.5)), alpha)
            }
        }
    }
}

/// Magnify `source` by `zoom`, keeping the point at `anchor` (fractions of
/// the headroom) in place. A zoom of 1.0 returns an identical frame.
fn resample(source: &Frame, zoom: f32, anchor: (f32, f32)) -> Frame {
    let (width, height) = source.dimensions();

    let scale = 1.0 / zoom.max(1.0);
    let offset_x = width as f32 * (1.0 - scale) * anchor.0;
    let offset_y = height as f32 * (1.0 - scale) * anchor.1;

    let image = source.as_image();
    let output = RgbImage::from_fn(width, height, |x, y| {
        let sx = offset_x + (x as f32 + 0.5) * scale - 0.5;
        let sy = offset_y + (y as f32 + 0.5) * scale - 0.5;
        sample_bilinear(image, sx, sy)
    });

    Frame::new(output)
}

fn sample_bilinear(image: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let max_x = (image.width() - 1) as f32;
    let max_y = (image.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width() - 1);
    let y1 = (y0 + 1).min(image.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut out = [0u8; 3];
    for c in 0..3 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Frame {
        Frame::new(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / (width - 1)) as u8, (y * 255 / (height - 1)) as u8, 90])
        }))
    }

    #[test]
    fn test_first_frame_is_untouched_at_unit_zoom() {
        let source = gradient(32, 18);
        let effect = KenBurns::new(&MotionConfig::default(), 2.0);

        let frame = effect.render(&source, effect.path_for(0), 0.0);
        assert_eq!(frame, source);
    }

    #[test]
    fn test_zoom_is_linear_over_the_clip() {
        let effect = KenBurns::new(&MotionConfig::default(), 2.0);
        assert!((effect.zoom_at(0.0) - 1.0).abs() < 1e-6);
        assert!((effect.zoom_at(1.0) - 1.025).abs() < 1e-6);
        assert!((effect.zoom_at(2.0) - 1.05).abs() < 1e-6);
        assert!((effect.zoom_at(10.0) - 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_render_keeps_dimensions_and_moves() {
        let source = gradient(40, 24);
        let effect = KenBurns::new(&MotionConfig { zoom_end: 1.5, ..MotionConfig::default() }, 1.0);

        let frame = effect.render(&source, PanPath::CENTERED, 1.0);
        assert_eq!(frame.dimensions(), source.dimensions());
        assert_ne!(frame, source);
    }

    #[test]
    fn test_pan_paths_are_deterministic_and_cross_the_frame() {
        let effect = KenBurns::new(&MotionConfig::default(), 2.0);
        for index in 0..16 {
            let path = effect.path_for(index);
            assert_eq!(path, effect.path_for(index));
            assert_eq!(path.from.0 + path.to.0, 1.0);
            assert_eq!(path.from.1 + path.to.1, 1.0);
        }
    }

    #[test]
    fn test_every_transition_starts_and_ends_on_its_frames() {
        let outgoing = gradient(32, 18);
        let incoming = Frame::new(RgbImage::from_fn(32, 18, |x, y| Rgb([90, (x * 7) as u8, (y * 11) as u8])));

        for style in TransitionStyle::CONCRETE {
            assert_eq!(style.apply(&outgoing, &incoming, 0.0), outgoing, "{:?} at start", style);
            assert_eq!(style.apply(&outgoing, &incoming, 1.0), incoming, "{:?} at end", style);
        }
    }

    #[test]
    fn test_fade_through_black_passes_black_midway() {
        let outgoing = Frame::new_filled(8, 8, [200, 100, 0]);
        let incoming = Frame::new_filled(8, 8, [0, 100, 200]);
        let style = TransitionStyle::FadeThroughBlack;

        assert_eq!(style.apply(&outgoing, &incoming, 0.5), Frame::new_black(8, 8));
        assert_eq!(style.apply(&outgoing, &incoming, 0.25).get_pixel(0, 0), [100, 50, 0]);
        assert_eq!(style.apply(&outgoing, &incoming, 0.75).get_pixel(0, 0), [0, 50, 100]);
    }

    #[test]
    fn test_zoom_transitions_differ_from_a_plain_crossfade() {
        let outgoing = gradient(32, 18);
        let incoming = Frame::new(RgbImage::from_fn(32, 18, |x, _| Rgb([0, (x * 8) as u8, 200])));

        let plain = TransitionStyle::Crossfade.apply(&outgoing, &incoming, 0.5);
        assert_ne!(TransitionStyle::ZoomIn.apply(&outgoing, &incoming, 0.5), plain);
        assert_ne!(TransitionStyle::ZoomOut.apply(&outgoing, &incoming, 0.5), plain);
    }

    #[test]
    fn test_mixed_picks_are_seeded_per_image() {
        let mut picked = Vec::new();
        for index in 0..64 {
            let style = TransitionStyle::Mixed.for_clip(index);
            assert_ne!(style, TransitionStyle::Mixed);
            assert_eq!(style, TransitionStyle::Mixed.for_clip(index));
            if !picked.contains(&style) {
                picked.push(style);
            }
        }
        assert!(picked.len() > 1, "expected variety, got {:?}", picked);

        assert_eq!(TransitionStyle::ZoomIn.for_clip(7), TransitionStyle::ZoomIn);
    }

    #[test]
    fn test_pan_disabled_stays_centered() {
        let motion = MotionConfig { pan: false, ..MotionConfig::default() };
        let effect = KenBurns::new(&motion, 2.0);
        assert_eq!(effect.path_for(3), PanPath::CENTERED);
    }
}
