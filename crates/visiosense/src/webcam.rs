//! V4L2 camera capture.
//!
//! Only `VIDEO_CAPTURE` devices that deliver JFIF JPEG or Motion JPEG frames are supported.

use std::env;

use anyhow::{bail, Context};
use linuxvideo::{
    format::{FrameIntervals, FrameSizes, PixFormat, PixelFormat},
    stream::ReadStream,
    BufType, CapabilityFlags, Device, Fract,
};
use visiosense_image::{Image, Resolution};

use crate::timer::Timer;

/// Forces the camera used when [`WebcamOptions::name`] is not set.
pub const ENV_VAR_WEBCAM_NAME: &str = "VISIOSENSE_WEBCAM_NAME";

/// Camera selection and format negotiation options.
#[derive(Debug, Clone)]
pub struct WebcamOptions {
    name: Option<String>,
    resolution: Resolution,
    fps: u32,
}

impl Default for WebcamOptions {
    fn default() -> Self {
        Self {
            name: None,
            resolution: Resolution::RES_VGA,
            fps: 30,
        }
    }
}

impl WebcamOptions {
    /// Sets the name of the camera to open.
    ///
    /// If no camera with the given name can be found, opening fails.
    #[inline]
    pub fn name(self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the preferred frame resolution. Defaults to 640x480.
    #[inline]
    pub fn resolution(self, resolution: Resolution) -> Self {
        Self { resolution, ..self }
    }

    /// Sets the preferred frame rate. Defaults to 30.
    #[inline]
    pub fn fps(self, fps: u32) -> Self {
        Self { fps, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct FrameFormat {
    resolution: Resolution,
    frame_interval: Fract,
}

impl FrameFormat {
    fn fps(&self) -> f32 {
        1.0 / self.frame_interval.as_f32()
    }
}

fn supported_formats(device: &Device) -> anyhow::Result<(PixelFormat, Vec<FrameFormat>)> {
    let mut pixel_format = None;
    for format in device.formats(BufType::VIDEO_CAPTURE) {
        let format = format?;
        if format.pixel_format() == PixelFormat::JPEG || format.pixel_format() == PixelFormat::MJPG {
            pixel_format = Some(format.pixel_format());
            break;
        }
    }
    let Some(pixel_format) = pixel_format else {
        bail!("no JPEG or MJPEG pixel format offered");
    };

    let FrameSizes::Discrete(sizes) = device.frame_sizes(pixel_format)? else {
        bail!("stepwise or continuous resolutions are not supported");
    };
    let mut formats = Vec::new();
    for size in sizes {
        let FrameIntervals::Discrete(intervals) =
            device.frame_intervals(pixel_format, size.width(), size.height())?
        else {
            bail!("stepwise or continuous frame rates are not supported");
        };
        for rate in intervals {
            formats.push(FrameFormat {
                resolution: Resolution::new(size.width(), size.height()),
                frame_interval: *rate.fract(),
            });
        }
    }
    Ok((pixel_format, formats))
}

/// Picks the format closest to the preferred resolution, then closest to the preferred frame
/// rate. On ties, the larger resolution and the faster rate win.
fn closest_format(formats: &[FrameFormat], resolution: Resolution, fps: u32) -> Option<FrameFormat> {
    let want_pixels = resolution.num_pixels() as i64;
    formats.iter().copied().min_by(|a, b| {
        let key = |f: &FrameFormat| {
            let pixels = f.resolution.num_pixels() as i64;
            (
                (pixels - want_pixels).abs(),
                (f.fps() - fps as f32).abs(),
                -pixels,
                -f.fps(),
            )
        };
        let (a, b) = (key(a), key(b));
        a.0.cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.cmp(&b.2))
            .then(a.3.total_cmp(&b.3))
    })
}

/// A camera yielding decoded [`Image`]s.
pub struct Webcam {
    stream: ReadStream,
    resolution: Resolution,
    t_dequeue: Timer,
    t_decode: Timer,
}

impl Webcam {
    /// Opens the first suitable camera.
    ///
    /// This can block for a few hundred milliseconds while the camera initializes. Fails if no
    /// camera is connected or none of them can deliver JPEG frames.
    pub fn open(options: WebcamOptions) -> anyhow::Result<Self> {
        let env_name = env::var(ENV_VAR_WEBCAM_NAME).ok();
        if let Some(name) = &env_name {
            log::debug!("webcam override: `{ENV_VAR_WEBCAM_NAME}` is set to '{name}'");
        }
        let name = options.name.as_deref().or(env_name.as_deref());

        let devices = linuxvideo::list().context("failed to enumerate video devices")?;
        for res in devices {
            match res {
                Ok(dev) => match Self::open_device(dev, name, &options) {
                    Ok(Some(webcam)) => return Ok(webcam),
                    Ok(None) => {}
                    Err(e) => log::debug!("{e:#}"),
                },
                Err(e) => log::warn!("{e}"),
            }
        }

        match name {
            Some(name) => bail!("camera not found: no usable device named '{name}'"),
            None => bail!("camera not found: no usable video capture device"),
        }
    }

    fn open_device(
        dev: Device,
        name: Option<&str>,
        options: &WebcamOptions,
    ) -> anyhow::Result<Option<Self>> {
        let caps = dev.capabilities()?;
        if name.map_or(false, |name| caps.card() != name) {
            return Ok(None);
        }

        let cap_flags = caps.device_capabilities();
        let path = dev.path()?;
        log::debug!(
            "device {} ({}) capabilities: {:?}",
            caps.card(),
            path.display(),
            cap_flags,
        );
        if !cap_flags.contains(CapabilityFlags::VIDEO_CAPTURE) {
            return Ok(None);
        }

        let (pixel_format, formats) = supported_formats(&dev)?;
        let Some(format) = closest_format(&formats, options.resolution, options.fps) else {
            bail!("{} offers no frame formats", caps.card());
        };

        let capture = dev.video_capture(PixFormat::new(
            format.resolution.width(),
            format.resolution.height(),
            pixel_format,
        ))?;
        let actual = capture.format();
        let resolution = Resolution::new(actual.width(), actual.height());
        let interval = capture.set_frame_interval(format.frame_interval)?;

        log::info!(
            "opened {} ({}), {} @ {:.1}Hz",
            caps.card(),
            path.display(),
            resolution,
            1.0 / interval.as_f32(),
        );

        Ok(Some(Self {
            stream: capture.into_stream()?,
            resolution,
            t_dequeue: Timer::new("dequeue"),
            t_decode: Timer::new("decode"),
        }))
    }

    /// Reads the next frame, blocking until one is available.
    ///
    /// Corrupted frames (which even good cameras occasionally deliver) are replaced with a blank
    /// image of the stream's resolution.
    pub fn read(&mut self) -> anyhow::Result<Image> {
        let dequeue_guard = self.t_dequeue.start();
        let res = self.resolution;
        let t_decode = &self.t_decode;
        let image = self.stream.dequeue(|buf| {
            drop(dequeue_guard);
            let image = match t_decode.time(|| Image::decode_jpeg(&buf)) {
                Ok(image) => image,
                Err(e) => {
                    log::error!("webcam decode error: {e}");
                    Image::new(res.width(), res.height())
                }
            };
            Ok(image)
        })?;
        Ok(image)
    }

    /// Returns profiling timers for frame capture and decoding.
    pub fn timers(&self) -> impl Iterator<Item = &Timer> + '_ {
        [&self.t_dequeue, &self.t_decode].into_iter()
    }
}
