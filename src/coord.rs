use num::{traits::NumOps, Num, One};

use crate::complex::{c, C};
use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};

trait Two {
    fn two() -> Self;
}

impl<T> Two for T
where
    T: One + NumOps,
{
    fn two() -> Self {
        T::one() + T::one()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axis<T> {
    pub min: T,
    pub max: T,
}

impl<T> Axis<T>
where
    T: Num + Copy,
{
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn length(&self) -> T {
        self.max - self.min
    }

    pub fn center(&self) -> T {
        (self.max + self.min) / T::two()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame<T> {
    pub x: Axis<T>,
    pub y: Axis<T>,
}

impl<T> Frame<T>
where
    T: Num + Copy,
{
    pub fn new(x: Axis<T>, y: Axis<T>) -> Self {
        Self { x, y }
    }

    pub fn from_box(center_x: T, center_y: T, width: T, height: T) -> Self {
        let x1 = center_x - (width / T::two());
        let x2 = center_x + (width / T::two());
        let y1 = center_y - (height / T::two());
        let y2 = center_y + (height / T::two());
        Self::new(Axis::new(x1, x2), Axis::new(y1, y2))
    }
}

/// One step of the focus protocol. Digits pick a quadrant, `wasd` pan,
/// `r` resets the step size and `z` zooms in by two.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusCommand {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
    Up,
    Down,
    Left,
    Right,
    Reset,
    Zoom,
}

impl TryFrom<char> for FocusCommand {
    type Error = char;

    fn try_from(ch: char) -> Result<Self, char> {
        Ok(match ch {
            '1' => Self::UpperLeft,
            '2' => Self::UpperRight,
            '3' => Self::LowerLeft,
            '4' => Self::LowerRight,
            'w' => Self::Up,
            's' => Self::Down,
            'a' => Self::Left,
            'd' => Self::Right,
            'r' => Self::Reset,
            'z' => Self::Zoom,
            other => return Err(other),
        })
    }
}

impl FocusCommand {
    /// Pan direction in units of the current step, imaginary axis up.
    fn direction(self) -> (f64, f64) {
        match self {
            Self::UpperLeft => (-1.0, 1.0),
            Self::UpperRight => (1.0, 1.0),
            Self::LowerLeft => (-1.0, -1.0),
            Self::LowerRight => (1.0, -1.0),
            Self::Up => (0.0, 1.0),
            Self::Down => (0.0, -1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::Reset | Self::Zoom => (0.0, 0.0),
        }
    }
}

pub fn parse_focus(commands: &str) -> RenderResult<Vec<FocusCommand>> {
    commands
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            FocusCommand::try_from(ch)
                .map_err(|command| RenderError::DegenerateFocus { command, position })
        })
        .collect()
}

/// Cursor state while walking a focus sequence.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cursor {
    center: (f64, f64),
    radius: (f64, f64),
    step: (f64, f64),
}

impl Cursor {
    fn new(center: (f64, f64), radius: f64, y_radius: f64) -> Self {
        Self {
            center,
            radius: (radius, y_radius),
            step: (radius / 4.0, y_radius / 4.0),
        }
    }

    fn apply(&mut self, command: FocusCommand) {
        match command {
            FocusCommand::Reset => {
                self.step = (self.radius.0 / 4.0, self.radius.1 / 4.0);
            }
            FocusCommand::Zoom => {
                self.radius = (self.radius.0 / 2.0, self.radius.1 / 2.0);
                self.step = (self.radius.0 / 4.0, self.radius.1 / 4.0);
            }
            pan => {
                let (dx, dy) = pan.direction();
                self.center.0 += dx * self.step.0;
                self.center.1 += dy * self.step.1;
            }
        }
        self.step = (self.step.0 / 2.0, self.step.1 / 2.0);
    }
}

/// A rectangle of the complex plane laid over a `width` x `height` pixel
/// grid. Pixel rows grow downward while the imaginary axis grows upward.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub frame: Frame<f64>,
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(frame: Frame<f64>, width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    /// Resolves the supersampled grid and the focus sequence of `config`.
    pub fn build(config: &RenderConfig) -> RenderResult<Self> {
        let (width, height) = config.supersampled_size()?;
        let aspect_ratio = height as f64 / width as f64;
        let y_radius = config.radius * aspect_ratio;

        let mut cursor = Cursor::new(
            (config.center_real, config.center_imag),
            config.radius,
            y_radius,
        );
        for command in parse_focus(&config.focus_commands)? {
            cursor.apply(command);
        }

        let frame = Frame::from_box(
            cursor.center.0,
            cursor.center.1,
            cursor.radius.0,
            cursor.radius.1,
        );
        Ok(Self::new(frame, width as usize, height as usize))
    }

    pub fn center(&self) -> C<f64> {
        c(self.frame.x.center(), self.frame.y.center())
    }

    pub fn radius(&self) -> f64 {
        self.frame.x.length()
    }

    pub fn pixel_to_point(&self, px: usize, py: usize) -> C<f64> {
        let x = &self.frame.x;
        let y = &self.frame.y;
        c(
            x.min + (px as f64 / self.width as f64) * (x.max - x.min),
            y.max + (py as f64 / self.height as f64) * (y.min - y.max),
        )
    }
}
