use tracing::{debug, info, warn};

use crate::{
    config::{Config, RunConfig},
    error::{FetchError, GeneratorError, Result},
    extensions::Extensions,
    images::{ImageAsset, ImageNormalizer, ImageProvider},
    video::{FrameSink, RenderSummary, RenderedVideo, Slide, VideoAssembler, VideoParams},
};

/// Main engine that turns keywords into a finished slideshow video
///
/// The engine runs a strictly sequential pipeline; each step finishes before
/// the next one starts:
/// 1. Script & Voiceover - Optional extension stages
/// 2. Image Fetching - Ask the provider for up to `max_images` images
/// 3. Normalization - Fit every image to the canvas, skipping unreadable ones
/// 4. Assembly - Animate, join with transitions and encode to the output file
/// 5. Upload - Optional extension stage
pub struct VideoGenerator {
    run: RunConfig,
    config: Config,
    provider: Box<dyn ImageProvider>,
    extensions: Extensions,
}

impl VideoGenerator {
    /// Create a generator; both configurations are validated up front
    pub fn new(run: RunConfig, config: Config, provider: Box<dyn ImageProvider>) -> Result<Self> {
        run.validate()?;
        config.validate()?;

        Ok(Self {
            run,
            config,
            provider,
            extensions: Extensions::default(),
        })
    }

    /// Swap in extension backends
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn run_config(&self) -> &RunConfig {
        &self.run
    }

    /// Canvas parameters for this run's format
    pub fn video_params(&self) -> VideoParams {
        VideoParams::from_render_config(&self.config.render, self.run.format)
    }

    /// Run the whole pipeline
    pub async fn run(&self) -> Result<RenderedVideo> {
        info!("🎬 Starting slideshow generation");
        info!("   Mode: {}", self.run.mode);
        info!("   Format: {}", self.run.format);
        info!("   Keywords: {}", self.run.keywords);
        info!("   Output: {:?}", self.run.output_path);

        // Pipeline Steps 1-3: Narration, Fetching, Normalization
        let slides = self.prepare().await?;

        // Pipeline Step 4: Assembly
        let video = self.render(slides).await?;

        // Pipeline Step 5: Publishing
        self.upload_video(&video).await?;

        info!("🎉 Video created successfully at: {:?}", video.path);
        Ok(video)
    }

    /// Everything before encoding: optional narration, then the fetched and
    /// normalized slides in order.
    pub async fn prepare(&self) -> Result<Vec<Slide>> {
        // Pipeline Step 1: Optional narration
        self.prepare_narration().await?;

        // Pipeline Step 2: Image Fetching
        let assets = self.fetch_images().await?;

        // Pipeline Step 3: Normalization
        self.normalize_images(assets).await
    }

    // ==========================================
    // PIPELINE STEP 1: NARRATION
    // ==========================================

    async fn prepare_narration(&self) -> Result<()> {
        let Some(script) = self.generate_script(&self.run.keywords).await? else {
            debug!("Script generation disabled ({})", self.extensions.script.name());
            return Ok(());
        };

        info!("📝 Generated a {} character script", script.len());
        if let Some(audio) = self.generate_voiceover(&script).await? {
            info!("🎙️  Voiceover written to {:?}", audio);
        }
        Ok(())
    }

    pub async fn generate_script(&self, prompt: &str) -> Result<Option<String>> {
        self.extensions.script.generate_script(prompt).await
    }

    pub async fn generate_voiceover(&self, script: &str) -> Result<Option<std::path::PathBuf>> {
        self.extensions.voiceover.generate_voiceover(script).await
    }

    // ==========================================
    // PIPELINE STEP 2: IMAGE FETCHING
    // ==========================================

    /// Ask the provider for images
    pub async fn fetch_images(&self) -> Result<Vec<ImageAsset>> {
        info!("🖼️  Step 1: Fetching images from {}...", self.provider.name());

        let mut assets = self
            .provider
            .fetch(&self.run.keywords, self.run.max_images)
            .await?;

        if assets.len() > self.run.max_images {
            warn!("Provider returned {} images, keeping the first {}", assets.len(), self.run.max_images);
            assets.truncate(self.run.max_images);
        }

        info!("   ✅ {} images retrieved", assets.len());
        Ok(assets)
    }

    // ==========================================
    // PIPELINE STEP 3: NORMALIZATION
    // ==========================================

    /// Fit every asset to the canvas. Undecodable images are skipped; if none
    /// survive the run fails.
    pub async fn normalize_images(&self, assets: Vec<ImageAsset>) -> Result<Vec<Slide>> {
        let normalizer = ImageNormalizer::new(self.video_params().resolution);
        let (width, height) = normalizer.target();
        info!("📐 Step 2: Normalizing {} images to {}x{}...", assets.len(), width, height);

        let attempted = assets.len();
        let slides = tokio::task::spawn_blocking(move || normalize_all(&normalizer, &assets))
            .await
            .map_err(|e| GeneratorError::generic(format!("normalization task failed: {}", e)))??;

        if slides.is_empty() {
            return Err(FetchError::EmptyResult { query: self.run.keywords.clone() }.into());
        }

        info!("   ✅ {} of {} images usable", slides.len(), attempted);
        Ok(slides)
    }

    // ==========================================
    // PIPELINE STEP 4: ASSEMBLY
    // ==========================================

    /// Encode `slides` into the configured output file
    pub async fn render(&self, slides: Vec<Slide>) -> Result<RenderedVideo> {
        info!("🎞️  Step 3: Assembling {} clips...", slides.len());

        let output_path = self.run.output_path.clone();
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let assembler = self.assembler();
        let ffmpeg = self.config.render.ffmpeg_binary.clone();
        let image_duration = self.run.image_duration;
        let transition = self.run.transition_duration;

        let video = tokio::task::spawn_blocking(move || {
            assembler.assemble(slides, image_duration, transition, &ffmpeg, &output_path)
        })
        .await
        .map_err(|e| GeneratorError::generic(format!("render task failed: {}", e)))??;

        info!("   ✅ {} frames, {:.2}s, {} KB",
              video.frame_count, video.duration, video.file_size / 1024);
        Ok(video)
    }

    /// Render `slides` into any frame sink instead of the output file.
    ///
    /// Runs on the calling thread; the sink is not finished.
    pub fn render_into<S: FrameSink + ?Sized>(&self, slides: Vec<Slide>, sink: &mut S) -> Result<RenderSummary> {
        self.assembler()
            .render(slides, self.run.image_duration, self.run.transition_duration, sink)
    }

    fn assembler(&self) -> VideoAssembler {
        VideoAssembler::new(self.video_params(), self.config.motion.clone())
    }

    // ==========================================
    // PIPELINE STEP 5: PUBLISHING
    // ==========================================

    pub async fn upload_video(&self, video: &RenderedVideo) -> Result<Option<String>> {
        let location = self.extensions.uploader.upload_video(video).await?;
        match &location {
            Some(url) => info!("📤 Uploaded via {}: {}", self.extensions.uploader.name(), url),
            None => debug!("Upload disabled ({})", self.extensions.uploader.name()),
        }
        Ok(location)
    }
}

fn normalize_all(normalizer: &ImageNormalizer, assets: &[ImageAsset]) -> Result<Vec<Slide>> {
    let mut slides = Vec::with_capacity(assets.len());

    for asset in assets {
        match normalizer.normalize(asset) {
            Ok(frame) => slides.push(Slide {
                order_index: asset.order_index,
                frame,
            }),
            Err(e) if e.is_recoverable() => {
                warn!("Skipping image {}: {}", asset.label, e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(slides)
}
