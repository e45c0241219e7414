//! Turns population snapshots into drawable frames.
//!
//! A frame is the background plus every square that overlaps the canvas, in
//! population order. Frames are written as JSON lines for an external viewer.

use chroma_core::{Color, Millis};
use chroma_world::{OrganismView, PopulationSnapshot};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub frame: u64,
    pub now_ms: Millis,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub squares: Vec<OrganismView>,
    /// Live organisms lying entirely off the canvas
    pub offscreen: usize,
}

pub struct FrameRenderer {
    width: u32,
    height: u32,
    frames: u64,
}

impl FrameRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: 0,
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    fn is_visible(&self, view: &OrganismView) -> bool {
        let (x, y) = (view.x as i64, view.y as i64);
        x < self.width as i64
            && y < self.height as i64
            && x + view.width as i64 > 0
            && y + view.height as i64 > 0
    }

    pub fn render(
        &mut self,
        snapshot: &PopulationSnapshot,
        background: Color,
        now_ms: Millis,
    ) -> Frame {
        let squares: Vec<OrganismView> = snapshot
            .organisms
            .iter()
            .filter(|view| self.is_visible(view))
            .copied()
            .collect();
        let offscreen = snapshot.len() - squares.len();

        self.frames += 1;
        Frame {
            frame: self.frames,
            now_ms,
            width: self.width,
            height: self.height,
            background,
            squares,
            offscreen,
        }
    }

    pub fn write_frame<W: Write>(&self, frame: &Frame, out: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer(&mut *out, frame)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_core::OrganismId;

    fn view(id: u64, x: i32, y: i32) -> OrganismView {
        OrganismView {
            id: OrganismId(id),
            x,
            y,
            width: 50,
            height: 50,
            color: Color::BLACK,
        }
    }

    #[test]
    fn test_clips_to_canvas() {
        let snapshot = PopulationSnapshot {
            organisms: vec![
                view(0, 0, 0),
                view(1, -49, 10),  // one column visible
                view(2, -50, 10),  // fully left
                view(3, 799, 599), // corner pixel visible
                view(4, 800, 0),   // fully right
                view(5, 400, 1500),
            ],
        };
        let mut renderer = FrameRenderer::new(800, 600);
        let frame = renderer.render(&snapshot, Color::WHITE, 16);

        let ids: Vec<u64> = frame.squares.iter().map(|v| v.id.0).collect();
        assert_eq!(ids, vec![0, 1, 3]);
        assert_eq!(frame.offscreen, 3);
        assert_eq!(frame.frame, 1);
        assert_eq!(renderer.frames_rendered(), 1);
    }

    #[test]
    fn test_write_frame_as_json_line() {
        let snapshot = PopulationSnapshot {
            organisms: vec![view(7, 10, 20)],
        };
        let mut renderer = FrameRenderer::new(800, 600);
        let frame = renderer.render(&snapshot, Color::new(1, 2, 3), 100);

        let mut out = Vec::new();
        renderer.write_frame(&frame, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));

        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(value["now_ms"], 100);
        assert_eq!(value["background"]["g"], 2);
        assert_eq!(value["squares"][0]["x"], 10);
    }
}
