use std::cell::Cell;

/// Longest edge of the drawn frame, in pixels
pub const LONG_EDGE: u32 = 640;

/// Display capabilities the layout depends on
pub trait Viewport {
    fn is_fullscreen(&self) -> bool;

    /// Visible area as (width, height)
    fn viewport_size(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawSize {
    pub width: u32,
    pub height: u32,
}

impl DrawSize {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Size to paint a frame at
///
/// Windowed, the frame's own size is scaled; fullscreen, the viewport's. Either
/// way the aspect ratio is kept and the longer edge becomes [`LONG_EDGE`].
pub fn compute_draw_size(
    source_width: u32,
    source_height: u32,
    viewport_width: u32,
    viewport_height: u32,
    is_fullscreen: bool,
) -> DrawSize {
    let (current_width, current_height) = if is_fullscreen {
        (viewport_width, viewport_height)
    } else {
        (source_width, source_height)
    };

    let max_side = current_width.max(current_height);
    if max_side == 0 {
        return DrawSize { width: 0, height: 0 };
    }

    let scale = |side: u32| {
        let scaled = f64::from(side) * f64::from(LONG_EDGE) / f64::from(max_side);
        (scaled + 0.5).floor() as u32
    };
    DrawSize {
        width: scale(current_width),
        height: scale(current_height),
    }
}

/// Draw size for a frame as seen through `viewport` right now
pub fn draw_size_for<V: Viewport + ?Sized>(viewport: &V, source_width: u32, source_height: u32) -> DrawSize {
    let (viewport_width, viewport_height) = viewport.viewport_size();
    compute_draw_size(
        source_width,
        source_height,
        viewport_width,
        viewport_height,
        viewport.is_fullscreen(),
    )
}

/// Viewport whose fullscreen flag and size can be changed between frames
#[derive(Debug)]
pub struct ViewportState {
    fullscreen: Cell<bool>,
    size: Cell<(u32, u32)>,
}

impl ViewportState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            fullscreen: Cell::new(false),
            size: Cell::new((width, height)),
        }
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        self.fullscreen.set(fullscreen);
    }

    /// Enter fullscreen if windowed, leave it otherwise; returns the new state
    pub fn toggle_fullscreen(&self) -> bool {
        let fullscreen = !self.fullscreen.get();
        tracing::debug!("Fullscreen {}", if fullscreen { "requested" } else { "exited" });
        self.fullscreen.set(fullscreen);
        fullscreen
    }

    pub fn set_size(&self, width: u32, height: u32) {
        self.size.set((width, height));
    }
}

impl Viewport for ViewportState {
    fn is_fullscreen(&self) -> bool {
        self.fullscreen.get()
    }

    fn viewport_size(&self) -> (u32, u32) {
        self.size.get()
    }
}
