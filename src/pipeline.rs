//! Sequence drivers: feed frames through an engine and hand the results to a [`FrameSink`].
//!
//! Drivers are synchronous. A caller that wants to stop early stops yielding input frames;
//! any error, including one from the sink, ends the run immediately.

use crate::{
    background::vibe::BackgroundModel,
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::PixelBuffer,
        error::{FxError, FxResult},
    },
    morph::engine::ParticleMorphEngine,
    mosaic::composer::MosaicComposer,
};

/// Run background subtraction over `frames`.
///
/// The first frame seeds the model and produces no output. Every following frame is classified
/// with an index counting from 0 and its segmentation map is pushed to `sink`. Returns the number
/// of maps pushed. An empty input leaves the sink untouched.
#[tracing::instrument(level = "info", skip_all)]
pub fn segment_frames<I>(
    model: &mut BackgroundModel,
    frames: I,
    sink: &mut dyn FrameSink,
) -> FxResult<u64>
where
    I: IntoIterator<Item = FxResult<PixelBuffer>>,
{
    let mut frames = frames.into_iter();
    let Some(first) = frames.next() else {
        return Ok(0);
    };
    let first = first?;
    model.initialize(&first)?;
    sink.begin(SinkConfig {
        width: first.width(),
        height: first.height(),
        frame_delay_ms: None,
    })?;

    let mut pushed = 0u64;
    for frame in frames {
        let segmap = model.classify(&frame?, pushed)?;
        sink.push_frame(pushed, &segmap)?;
        pushed += 1;
    }
    sink.end()?;
    tracing::info!(frames = pushed, "segmentation finished");
    Ok(pushed)
}

/// Compose a mosaic for every frame and push it. Returns the number of frames pushed.
#[tracing::instrument(level = "info", skip_all)]
pub fn mosaic_frames<I>(
    composer: &MosaicComposer,
    frames: I,
    sink: &mut dyn FrameSink,
) -> FxResult<u64>
where
    I: IntoIterator<Item = FxResult<PixelBuffer>>,
{
    let mut pushed = 0u64;
    for frame in frames {
        let frame = frame?;
        if pushed == 0 {
            sink.begin(SinkConfig {
                width: frame.width(),
                height: frame.height(),
                frame_delay_ms: None,
            })?;
        }
        let mosaic = composer.compose(&frame)?;
        sink.push_frame(pushed, &mosaic)?;
        pushed += 1;
    }
    if pushed > 0 {
        sink.end()?;
    }
    tracing::info!(frames = pushed, "mosaic finished");
    Ok(pushed)
}

/// Render the whole transition of an initialized engine. Returns `total_steps`.
#[tracing::instrument(level = "info", skip_all)]
pub fn morph_frames(engine: &ParticleMorphEngine, sink: &mut dyn FrameSink) -> FxResult<u64> {
    let Some((width, height)) = engine.dimensions() else {
        return Err(FxError::precondition(
            "morph_frames called before initialize on morph engine",
        ));
    };
    sink.begin(SinkConfig {
        width,
        height,
        frame_delay_ms: Some(engine.frame_delay_ms()),
    })?;

    let mut pushed = 0u64;
    for frame in engine.frames() {
        sink.push_frame(pushed, &frame?)?;
        pushed += 1;
    }
    sink.end()?;
    tracing::info!(frames = pushed, "morph finished");
    Ok(pushed)
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
