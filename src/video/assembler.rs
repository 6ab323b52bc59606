// src/video/assembler.rs - Ken Burns clips joined by transitions

use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::MotionConfig;
use crate::error::{RenderError, Result};
use crate::video::effects::{KenBurns, PanPath, TransitionStyle};
use crate::video::encoder::{FfmpegEncoder, FrameSink};
use crate::video::timeline::{FrameSample, Timeline};
use crate::video::types::{Frame, RenderedVideo, VideoParams};

/// A normalized image ready to become a clip
#[derive(Debug, Clone)]
pub struct Slide {
    pub order_index: usize,
    pub frame: Frame,
}

/// Frame totals of a render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    pub frame_count: usize,
    pub clip_count: usize,
    pub duration: f64,
    pub transition: f64,
}

/// Turns an ordered set of slides into a continuous video
#[derive(Debug, Clone)]
pub struct VideoAssembler {
    params: VideoParams,
    motion: MotionConfig,
}

impl VideoAssembler {
    pub fn new(params: VideoParams, motion: MotionConfig) -> Self {
        Self { params, motion }
    }

    pub fn params(&self) -> &VideoParams {
        &self.params
    }

    /// Render `slides` and encode them into `output_path` with `ffmpeg_binary`.
    ///
    /// An existing file at `output_path` is overwritten. If anything fails
    /// after the encoder started, the partial file is removed.
    pub fn assemble<P: AsRef<Path>>(
        &self,
        slides: Vec<Slide>,
        image_duration: f64,
        transition: f64,
        ffmpeg_binary: &str,
        output_path: P,
    ) -> Result<RenderedVideo> {
        let output_path = output_path.as_ref();

        if slides.is_empty() {
            return Err(RenderError::NoFrames.into());
        }

        let mut encoder = FfmpegEncoder::spawn(ffmpeg_binary, &self.params, output_path)?;
        let summary = self.render(slides, image_duration, transition, &mut encoder)?;
        encoder.finish()?;

        let file_size = std::fs::metadata(output_path)?.len();

        Ok(RenderedVideo {
            path: output_path.to_path_buf(),
            duration: summary.duration,
            frame_count: summary.frame_count,
            clip_count: summary.clip_count,
            file_size,
        })
    }

    /// Render every frame of the slideshow into `sink`.
    ///
    /// Slides are placed in `order_index` order. The sink is not finished.
    pub fn render<S: FrameSink + ?Sized>(
        &self,
        mut slides: Vec<Slide>,
        image_duration: f64,
        transition: f64,
        sink: &mut S,
    ) -> Result<RenderSummary> {
        slides.sort_by_key(|slide| slide.order_index);
        self.check_dimensions(&slides)?;

        let timeline = Timeline::new(slides.len(), image_duration, transition, self.params.fps)?;
        if slides.len() > 1 && timeline.transition() < transition {
            warn!("Transition of {:.2}s does not fit {:.2}s clips, using {:.3}s",
                  transition, image_duration, timeline.transition());
        }

        let effect = KenBurns::new(&self.motion, image_duration);
        let paths: Vec<PanPath> = slides.iter().map(|s| effect.path_for(s.order_index)).collect();
        let styles: Vec<TransitionStyle> = slides
            .iter()
            .map(|s| self.motion.transition_style.for_clip(s.order_index))
            .collect();

        let frame_count = timeline.frame_count();
        info!("Rendering {} clips into {} frames ({:.2}s, {:.2}s {:?} transitions)",
              timeline.len(), frame_count, timeline.total_duration(), timeline.transition(),
              self.motion.transition_style);

        let mut current_clip = None;
        for frame_index in 0..frame_count {
            let sample = timeline.sample(timeline.frame_time(frame_index));

            let frame = match sample {
                FrameSample::Single { clip, local_time } => {
                    effect.render(&slides[clip].frame, paths[clip], local_time)
                }
                FrameSample::Crossfade { from, from_time, to, to_time, alpha } => {
                    let outgoing = effect.render(&slides[from].frame, paths[from], from_time);
                    let incoming = effect.render(&slides[to].frame, paths[to], to_time);
                    styles[to].apply(&outgoing, &incoming, alpha)
                }
            };

            let newest = match sample {
                FrameSample::Single { clip, .. } => clip,
                FrameSample::Crossfade { to, .. } => to,
            };
            if current_clip != Some(newest) {
                debug!("Clip {} starts at frame {} ({:?})", newest + 1, frame_index, styles[newest]);
                current_clip = Some(newest);
            }

            sink.write_frame(&frame)?;
        }

        Ok(RenderSummary {
            frame_count,
            clip_count: timeline.len(),
            duration: frame_count as f64 / self.params.fps,
            transition: timeline.transition(),
        })
    }

    fn check_dimensions(&self, slides: &[Slide]) -> Result<()> {
        if slides.is_empty() {
            return Err(RenderError::NoFrames.into());
        }

        for slide in slides {
            if slide.frame.dimensions() != self.params.resolution {
                return Err(RenderError::InvalidParameters {
                    details: format!(
                        "slide {} is {}x{}, canvas is {}x{}",
                        slide.order_index,
                        slide.frame.width(),
                        slide.frame.height(),
                        self.params.resolution.0,
                        self.params.resolution.1
                    ),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneratorError;
    use crate::video::encoder::CollectingSink;
    use tempfile::tempdir;

    fn params() -> VideoParams {
        VideoParams {
            fps: 10.0,
            resolution: (32, 18),
            codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            crf: 30,
            threads: 1,
        }
    }

    fn slides(colors: &[[u8; 3]]) -> Vec<Slide> {
        colors
            .iter()
            .enumerate()
            .map(|(order_index, &color)| Slide {
                order_index,
                frame: Frame::new_filled(32, 18, color),
            })
            .collect()
    }

    fn assembler() -> VideoAssembler {
        VideoAssembler::new(params(), MotionConfig::default())
    }

    #[test]
    fn test_frame_count_matches_timeline() {
        let mut sink = CollectingSink::default();
        let summary = assembler()
            .render(slides(&[[255, 0, 0], [0, 255, 0], [0, 0, 255]]), 2.0, 0.5, &mut sink)
            .unwrap();

        // 3 * 2.0 - 2 * 0.5 = 5.0 seconds at 10 fps
        assert_eq!(summary.frame_count, 50);
        assert_eq!(summary.clip_count, 3);
        assert_eq!(sink.frames.len(), 50);
        assert!((summary.duration - 5.0).abs() <= 0.1);
        assert!(sink.frames.iter().all(|f| f.dimensions() == (32, 18)));
        assert!(!sink.finished);
    }

    #[test]
    fn test_crossfade_mixes_neighbouring_slides() {
        let mut sink = CollectingSink::default();
        assembler()
            .render(slides(&[[200, 0, 0], [0, 0, 200]]), 2.0, 1.0, &mut sink)
            .unwrap();

        // Solid colours are unaffected by zoom, so only the fade changes pixels
        assert_eq!(sink.frames[0].get_pixel(5, 5), [200, 0, 0]);
        let middle = sink.frames[15].get_pixel(5, 5);
        assert!(middle[0] > 0 && middle[2] > 0, "expected a blend, got {:?}", middle);
        assert_eq!(sink.frames.last().unwrap().get_pixel(5, 5), [0, 0, 200]);
    }

    #[test]
    fn test_fade_through_black_darkens_between_slides() {
        let motion = MotionConfig {
            transition_style: TransitionStyle::FadeThroughBlack,
            ..MotionConfig::default()
        };
        let mut sink = CollectingSink::default();
        VideoAssembler::new(params(), motion)
            .render(slides(&[[200, 0, 0], [0, 0, 200]]), 2.0, 1.0, &mut sink)
            .unwrap();

        assert_eq!(sink.frames.len(), 30);
        assert_eq!(sink.frames[10].get_pixel(5, 5), [200, 0, 0]);
        assert_eq!(sink.frames[14].get_pixel(5, 5), [40, 0, 0]);
        assert_eq!(sink.frames[15].get_pixel(5, 5), [0, 0, 0]);
        assert_eq!(sink.frames[29].get_pixel(5, 5), [0, 0, 200]);
    }

    #[test]
    fn test_mixed_transitions_render_deterministically() {
        let motion = MotionConfig {
            transition_style: TransitionStyle::Mixed,
            ..MotionConfig::default()
        };
        let input = slides(&[[250, 0, 0], [0, 250, 0], [0, 0, 250], [250, 250, 0], [0, 250, 250]]);

        let mut first = CollectingSink::default();
        let mut second = CollectingSink::default();
        VideoAssembler::new(params(), motion.clone()).render(input.clone(), 1.0, 0.5, &mut first).unwrap();
        VideoAssembler::new(params(), motion).render(input, 1.0, 0.5, &mut second).unwrap();

        assert_eq!(first.frames.len(), 30);
        assert_eq!(first.frames, second.frames);
    }

    #[test]
    fn test_single_slide_plays_for_full_duration() {
        let mut sink = CollectingSink::default();
        let summary = assembler()
            .render(slides(&[[9, 9, 9]]), 3.0, 1.0, &mut sink)
            .unwrap();

        assert_eq!(summary.frame_count, 30);
        assert_eq!(summary.transition, 0.0);
    }

    #[test]
    fn test_overlong_transition_still_shows_every_slide() {
        let mut sink = CollectingSink::default();
        let summary = assembler()
            .render(slides(&[[255, 0, 0], [0, 255, 0], [0, 0, 255]]), 1.0, 5.0, &mut sink)
            .unwrap();

        assert!(summary.transition < 1.0);
        assert!(summary.frame_count >= 3);
        assert_eq!(sink.frames.last().unwrap().get_pixel(0, 0), [0, 0, 255]);
    }

    #[test]
    fn test_slides_follow_order_index() {
        let mut shuffled = slides(&[[1, 1, 1], [2, 2, 2]]);
        shuffled.reverse();

        let mut sink = CollectingSink::default();
        assembler().render(shuffled, 1.0, 0.0, &mut sink).unwrap();
        assert_eq!(sink.frames[0].get_pixel(0, 0), [1, 1, 1]);
        assert_eq!(sink.frames.last().unwrap().get_pixel(0, 0), [2, 2, 2]);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let gradient = Frame::new(image::RgbImage::from_fn(32, 18, |x, y| image::Rgb([x as u8 * 7, y as u8 * 13, 40])));
        let input = vec![
            Slide { order_index: 0, frame: gradient.clone() },
            Slide { order_index: 1, frame: gradient },
        ];

        let mut first = CollectingSink::default();
        let mut second = CollectingSink::default();
        assembler().render(input.clone(), 1.0, 0.3, &mut first).unwrap();
        assembler().render(input, 1.0, 0.3, &mut second).unwrap();
        assert_eq!(first.frames, second.frames);
    }

    #[test]
    fn test_wrong_slide_size_is_rejected() {
        let input = vec![Slide { order_index: 0, frame: Frame::new_black(10, 10) }];
        let mut sink = CollectingSink::default();
        let result = assembler().render(input, 1.0, 0.0, &mut sink);
        assert!(matches!(
            result,
            Err(GeneratorError::Render(RenderError::InvalidParameters { .. }))
        ));
    }

    #[test]
    fn test_no_slides_is_an_error() {
        let dir = tempdir().unwrap();
        let result = assembler().assemble(Vec::new(), 1.0, 0.0, "ffmpeg", dir.path().join("x.mp4"));
        assert!(matches!(result, Err(GeneratorError::Render(RenderError::NoFrames))));
    }

    #[test]
    fn test_assemble_writes_file_when_ffmpeg_is_installed() {
        if !FfmpegEncoder::is_available("ffmpeg") {
            return;
        }

        let dir = tempdir().unwrap();
        let output = dir.path().join("slideshow.mp4");
        let video = assembler()
            .assemble(slides(&[[255, 0, 0], [0, 255, 0]]), 1.0, 0.5, "ffmpeg", &output)
            .unwrap();

        assert_eq!(video.frame_count, 15);
        assert_eq!(video.clip_count, 2);
        assert!(video.file_size > 0);
        assert!(output.exists());
    }
}
