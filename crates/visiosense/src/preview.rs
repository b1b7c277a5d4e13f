//! The preview window.

use anyhow::anyhow;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use visiosense_image::{Image, Resolution};

pub const TITLE: &str = "VisioSense - Hand Gesture Control";

/// An always-on-top window that shows annotated frames.
///
/// The window is opened with the size of the first frame shown in it.
pub struct Preview {
    window: Option<Window>,
    buf: Vec<u32>,
    closed: bool,
}

impl Preview {
    pub fn new() -> Self {
        Self {
            window: None,
            buf: Vec::new(),
            closed: false,
        }
    }

    fn open(res: Resolution) -> anyhow::Result<Window> {
        log::debug!("opening {res} preview window");
        let mut window = Window::new(
            TITLE,
            res.width() as usize,
            res.height() as usize,
            WindowOptions {
                topmost: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| anyhow!("failed to open preview window: {e}"))?;
        window.set_target_fps(0);
        Ok(window)
    }

    /// Displays `image` and processes window events.
    pub fn show(&mut self, image: &Image) -> anyhow::Result<()> {
        if self.closed {
            return Ok(());
        }
        let window = match &mut self.window {
            Some(window) => window,
            window @ None => window.insert(Self::open(image.resolution())?),
        };

        image.write_0rgb(&mut self.buf);
        window
            .update_with_buffer(&self.buf, image.width() as usize, image.height() as usize)
            .map_err(|e| anyhow!("failed to update preview window: {e}"))?;

        if !window.is_open()
            || window.is_key_pressed(Key::Q, KeyRepeat::No)
            || window.is_key_pressed(Key::Escape, KeyRepeat::No)
        {
            log::info!("preview window closed");
            self.closed = true;
        }
        Ok(())
    }

    /// Returns whether the user asked to quit, by key or by closing the window.
    pub fn should_close(&self) -> bool {
        self.closed
    }
}

impl Default for Preview {
    fn default() -> Self {
        Self::new()
    }
}
