use crate::error::{RenderError, Result};

/// Slack for comparing frame timestamps against clip boundaries
const TIME_EPSILON: f64 = 1e-9;

/// One image's slot on the timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clip {
    /// Position of the image in the assembled sequence
    pub index: usize,
    pub start_time: f64,
    pub duration: f64,
    /// Crossfade shared with the previous clip
    pub transition_in: f64,
    /// Crossfade shared with the next clip
    pub transition_out: f64,
}

impl Clip {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Time from this clip's start until the next clip starts fading in
    pub fn visible_duration(&self) -> f64 {
        self.duration - self.transition_out
    }
}

/// What a single output frame is made of
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSample {
    /// One clip fully opaque
    Single { clip: usize, local_time: f64 },
    /// Two adjacent clips mid-crossfade; `alpha` is the weight of `to`
    Crossfade {
        from: usize,
        from_time: f64,
        to: usize,
        to_time: f64,
        alpha: f32,
    },
}

/// Clip layout for a slideshow.
///
/// Clips start every `image_duration - transition` seconds so that adjacent
/// clips overlap by exactly the transition. The layout is derived from the
/// clip count and the timing settings alone.
#[derive(Debug, Clone)]
pub struct Timeline {
    clips: Vec<Clip>,
    image_duration: f64,
    transition: f64,
    fps: f64,
}

impl Timeline {
    pub fn new(clip_count: usize, image_duration: f64, transition: f64, fps: f64) -> Result<Self> {
        if clip_count == 0 {
            return Err(RenderError::NoFrames.into());
        }

        if !(image_duration.is_finite() && image_duration > 0.0) || !(fps.is_finite() && fps > 0.0) {
            return Err(RenderError::InvalidParameters {
                details: format!("image duration {}s at {} fps", image_duration, fps),
            }
            .into());
        }

        let transition = effective_transition(clip_count, image_duration, transition, fps);
        let stride = image_duration - transition;

        let clips = (0..clip_count)
            .map(|index| Clip {
                index,
                start_time: index as f64 * stride,
                duration: image_duration,
                transition_in: if index > 0 { transition } else { 0.0 },
                transition_out: if index + 1 < clip_count { transition } else { 0.0 },
            })
            .collect();

        Ok(Self {
            clips,
            image_duration,
            transition,
            fps,
        })
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Transition actually applied after clamping
    pub fn transition(&self) -> f64 {
        self.transition
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Total length: every clip minus the overlap of each transition
    pub fn total_duration(&self) -> f64 {
        let n = self.clips.len() as f64;
        n * self.image_duration - (n - 1.0) * self.transition
    }

    /// Number of frames needed to cover the whole timeline
    pub fn frame_count(&self) -> usize {
        ((self.total_duration() * self.fps).round() as usize).max(1)
    }

    pub fn frame_time(&self, frame_index: usize) -> f64 {
        frame_index as f64 / self.fps
    }

    /// Resolve which clip(s) are on screen at `time`.
    ///
    /// When transitions are longer than half a clip more than two clips can
    /// overlap; the most recently started clip and its predecessor win.
    pub fn sample(&self, time: f64) -> FrameSample {
        let last = self.clips.len() - 1;
        let stride = self.image_duration - self.transition;
        let current = (((time + TIME_EPSILON) / stride).floor().max(0.0) as usize).min(last);

        let clip = &self.clips[current];
        let local_time = (time - clip.start_time).max(0.0);

        if current > 0 && local_time + TIME_EPSILON < clip.transition_in {
            let previous = &self.clips[current - 1];
            return FrameSample::Crossfade {
                from: previous.index,
                from_time: time - previous.start_time,
                to: clip.index,
                to_time: local_time,
                alpha: (local_time / clip.transition_in) as f32,
            };
        }

        FrameSample::Single {
            clip: clip.index,
            local_time: local_time.min(self.image_duration),
        }
    }
}

/// Transition length after clamping.
///
/// A single clip has nothing to fade into. A transition that would swallow
/// the whole clip is cut back to one frame short of the clip duration.
pub fn effective_transition(clip_count: usize, image_duration: f64, transition: f64, fps: f64) -> f64 {
    if clip_count < 2 || !transition.is_finite() || transition <= 0.0 {
        return 0.0;
    }

    if transition >= image_duration {
        (image_duration - 1.0 / fps).max(0.0)
    } else {
        transition
    }
}
