use anyhow::{bail, Context};
use clap::Parser;
use visiosense::{
    app::App,
    config::Thresholds,
    image::Resolution,
    perception::SubprocessPerceiver,
    pointer::{EnigoPointer, NullPointer, Pointer},
    preview::Preview,
    voice::{SystemOpener, VoiceListener},
    webcam::{Webcam, WebcamOptions},
};

/// Screen size assumed when the system pointer is not controlled.
const DRY_RUN_SCREEN: Resolution = Resolution::new(1920, 1080);

/// Control the mouse pointer and draw on a whiteboard with hand gestures.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Landmark estimation helper to run, with arguments (e.g. "python3 perceive.py").
    #[arg(long, value_name = "COMMAND")]
    perceiver: String,

    /// Speech recognizer to run, with arguments. It must print one phrase per line.
    #[arg(long, value_name = "COMMAND")]
    voice: Option<String>,

    /// Name of the camera to open.
    #[arg(long)]
    camera: Option<String>,

    /// Preferred camera resolution, as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_resolution, default_value = "640x480")]
    resolution: Resolution,

    /// Preferred camera frame rate.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Minimum detection score a hand needs to be tracked.
    #[arg(long, value_name = "SCORE")]
    min_hand_score: Option<f32>,

    /// Do not open the preview window.
    #[arg(long)]
    no_preview: bool,

    /// Only log pointer actions instead of performing them.
    #[arg(long)]
    no_pointer: bool,

    /// Thumb to index fingertip distance that counts as a pinch (normalized).
    #[arg(long)]
    pinch_distance: Option<f32>,

    /// Cursor smoothing factor; 1.0 disables smoothing.
    #[arg(long)]
    smoothing: Option<f32>,

    /// Dead zone at each frame edge that maps to the screen edge (normalized).
    #[arg(long)]
    margin: Option<f32>,
}

impl Args {
    fn thresholds(&self) -> anyhow::Result<Thresholds> {
        let mut t = Thresholds::default();
        if let Some(pinch) = self.pinch_distance {
            if pinch <= 0.0 {
                bail!("pinch distance must be positive");
            }
            t.pinch_distance = pinch;
        }
        if let Some(smoothing) = self.smoothing {
            if !(smoothing > 0.0 && smoothing <= 1.0) {
                bail!("smoothing factor must be in (0, 1]");
            }
            t.cursor_smoothing = smoothing;
        }
        if let Some(margin) = self.margin {
            if !(0.0..0.5).contains(&margin) {
                bail!("margin must be in [0, 0.5)");
            }
            t.screen_margin = margin;
        }
        Ok(t)
    }
}

fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let parse = |v: &str| v.trim().parse::<u32>().map_err(|e| format!("{v:?}: {e}"));
    match (parse(w)?, parse(h)?) {
        (0, _) | (_, 0) => Err(format!("resolution {s:?} is empty")),
        (w, h) => Ok(Resolution::new(w, h)),
    }
}

fn split_command(cmd: &str) -> anyhow::Result<(&str, Vec<&str>)> {
    let mut parts = cmd.split_whitespace();
    let program = parts.next().context("empty command")?;
    Ok((program, parts.collect()))
}

fn main() -> anyhow::Result<()> {
    visiosense::init_logger!();

    let args = Args::parse();
    let thresholds = args.thresholds()?;

    let mut options = WebcamOptions::default()
        .resolution(args.resolution)
        .fps(args.fps);
    if let Some(camera) = &args.camera {
        options = options.name(camera);
    }
    let mut webcam = Webcam::open(options)?;

    let (program, program_args) = split_command(&args.perceiver)?;
    let mut perceiver = SubprocessPerceiver::spawn(program, program_args)?;
    if let Some(score) = args.min_hand_score {
        if !(0.0..=1.0).contains(&score) {
            bail!("minimum hand score must be in [0, 1]");
        }
        perceiver.set_min_score(score);
    }

    // Kept alive for the duration of the loop.
    let _voice = match &args.voice {
        Some(cmd) => {
            let (program, program_args) = split_command(cmd)?;
            match VoiceListener::spawn(program, program_args, SystemOpener) {
                Ok(listener) => Some(listener),
                Err(e) => {
                    log::warn!("voice recognition disabled: {e:#}");
                    None
                }
            }
        }
        None => {
            log::info!("voice recognition disabled");
            None
        }
    };

    let pointer: Box<dyn Pointer> = if args.no_pointer {
        Box::new(NullPointer::new(DRY_RUN_SCREEN))
    } else {
        Box::new(EnigoPointer::new()?)
    };

    let mut app = App::new(thresholds, Box::new(perceiver), pointer);
    if !args.no_preview {
        app = app.with_preview(Preview::new());
    }
    app.run(&mut webcam)
}
