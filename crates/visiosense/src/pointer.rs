//! System pointer backends driven by the [`GestureController`].
//!
//! [`GestureController`]: crate::controller::GestureController

use anyhow::bail;
use enigo::{Enigo, MouseButton, MouseControllable};
use visiosense_image::Resolution;

/// A pointing device that can be moved, clicked and scrolled.
///
/// All coordinates are in screen pixels.
pub trait Pointer {
    /// Returns the size of the screen the pointer moves on.
    fn screen_size(&self) -> Resolution;

    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()>;

    /// Presses and releases the primary button.
    fn click(&mut self) -> anyhow::Result<()>;

    /// Presses and holds the primary button.
    fn press(&mut self) -> anyhow::Result<()>;

    /// Releases the primary button.
    fn release(&mut self) -> anyhow::Result<()>;

    /// Scrolls vertically by `clicks` wheel units. Positive values scroll up.
    fn scroll(&mut self, clicks: i32) -> anyhow::Result<()>;
}

/// Controls the real system pointer through `enigo`.
pub struct EnigoPointer {
    enigo: Enigo,
    screen: Resolution,
}

impl EnigoPointer {
    pub fn new() -> anyhow::Result<Self> {
        let enigo = Enigo::new();
        let (width, height) = enigo.main_display_size();
        if width <= 0 || height <= 0 {
            bail!("could not determine screen size (got {width}x{height})");
        }

        let screen = Resolution::new(width as u32, height as u32);
        log::debug!("controlling system pointer on a {screen} screen");
        Ok(Self { enigo, screen })
    }
}

impl Pointer for EnigoPointer {
    fn screen_size(&self) -> Resolution {
        self.screen
    }

    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        self.enigo.mouse_move_to(x, y);
        Ok(())
    }

    fn click(&mut self) -> anyhow::Result<()> {
        self.enigo.mouse_click(MouseButton::Left);
        Ok(())
    }

    fn press(&mut self) -> anyhow::Result<()> {
        self.enigo.mouse_down(MouseButton::Left);
        Ok(())
    }

    fn release(&mut self) -> anyhow::Result<()> {
        self.enigo.mouse_up(MouseButton::Left);
        Ok(())
    }

    fn scroll(&mut self, clicks: i32) -> anyhow::Result<()> {
        // enigo scrolls down for positive values
        self.enigo.mouse_scroll_y(-clicks);
        Ok(())
    }
}

/// A pointer that only logs what it would do.
#[derive(Debug, Clone, Copy)]
pub struct NullPointer {
    screen: Resolution,
}

impl NullPointer {
    pub fn new(screen: Resolution) -> Self {
        Self { screen }
    }
}

impl Pointer for NullPointer {
    fn screen_size(&self) -> Resolution {
        self.screen
    }

    fn move_to(&mut self, x: i32, y: i32) -> anyhow::Result<()> {
        log::trace!("move to {x},{y}");
        Ok(())
    }

    fn click(&mut self) -> anyhow::Result<()> {
        log::debug!("click");
        Ok(())
    }

    fn press(&mut self) -> anyhow::Result<()> {
        log::debug!("press");
        Ok(())
    }

    fn release(&mut self) -> anyhow::Result<()> {
        log::debug!("release");
        Ok(())
    }

    fn scroll(&mut self, clicks: i32) -> anyhow::Result<()> {
        log::debug!("scroll {clicks}");
        Ok(())
    }
}
