//! Output surfaces: the seam between data shaping and whatever draws pixels.
//!
//! One logical surface per chart mount point. The JSON surface makes a
//! headless run observable on disk; the recording surface lets tests assert
//! on draw-call counts.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::figure::Figure;

pub trait Surface {
    fn draw(&mut self, figure: &Figure) -> Result<()>;
}

/// Writes each draw call as pretty JSON to `<dir>/<name>.json`, replacing the
/// previous payload the way a redraw replaces a plot.
pub struct JsonDirSurface {
    path: PathBuf,
}

impl JsonDirSurface {
    pub fn new(dir: impl Into<PathBuf>, name: &str) -> Self {
        let mut path = dir.into();
        path.push(format!("{}.json", name));
        Self { path }
    }
}

impl Surface for JsonDirSurface {
    fn draw(&mut self, figure: &Figure) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating surface dir {}", parent.display()))?;
        }
        let payload = serde_json::to_string_pretty(figure)?;
        fs::write(&self.path, payload)
            .with_context(|| format!("writing figure to {}", self.path.display()))?;
        Ok(())
    }
}

/// Test double: remembers every figure it was asked to draw.
#[derive(Default)]
pub struct RecordingSurface {
    pub figures: Vec<Figure>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_count(&self) -> usize {
        self.figures.len()
    }

    pub fn last(&self) -> Option<&Figure> {
        self.figures.last()
    }
}

impl Surface for RecordingSurface {
    fn draw(&mut self, figure: &Figure) -> Result<()> {
        self.figures.push(figure.clone());
        Ok(())
    }
}

/// Shared handle so a caller can keep inspecting a surface after handing it
/// to the renderer.
impl Surface for std::rc::Rc<std::cell::RefCell<RecordingSurface>> {
    fn draw(&mut self, figure: &Figure) -> Result<()> {
        self.borrow_mut().draw(figure)
    }
}
