use crate::core::input::{Glyph, Lane};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NoteId(pub u64);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub lane: Lane,
    pub glyph: Glyph,
    /// Distance travelled from the spawn point; the judgement line sits at
    /// `line_distance`. Only ever increases.
    pub fall_progress: f32,
}

impl Note {
    #[inline(always)]
    pub fn distance_to_line(&self, line_distance: f32) -> f32 {
        (self.fall_progress - line_distance).abs()
    }
}
