use crate::core::input::Lane;
use crate::game::note::{Note, NoteId};

/// Owns every live note and its fall progress.
#[derive(Debug, Clone)]
pub struct NoteField {
    notes: Vec<Note>,
    next_id: u64,
    line_distance: f32,
    despawn_margin: f32,
}

impl NoteField {
    pub fn new(line_distance: f32, despawn_margin: f32) -> Self {
        Self {
            notes: Vec::new(),
            next_id: 0,
            line_distance,
            despawn_margin,
        }
    }

    #[inline(always)]
    pub fn line_distance(&self) -> f32 {
        self.line_distance
    }

    #[inline(always)]
    pub fn despawn_threshold(&self) -> f32 {
        self.line_distance + self.despawn_margin
    }

    pub fn spawn(&mut self, lane: Lane) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.notes.push(Note {
            id,
            lane,
            glyph: lane.glyph(),
            fall_progress: 0.0,
        });
        id
    }

    /// Moves every note down by `distance`, then drops the ones past the
    /// despawn threshold. Returns how many were dropped unjudged.
    ///
    /// `distance` must already be validated as finite and non-negative.
    pub fn advance(&mut self, distance: f32) -> usize {
        for note in &mut self.notes {
            note.fall_progress += distance;
        }
        let threshold = self.despawn_threshold();
        let before = self.notes.len();
        self.notes.retain(|n| n.fall_progress <= threshold);
        before - self.notes.len()
    }

    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let pos = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(pos))
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Live notes in spawn order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, lane: Lane, fall_progress: f32) -> NoteId {
        let id = self.spawn(lane);
        if let Some(note) = self.notes.last_mut() {
            note.fall_progress = fall_progress;
        }
        id
    }
}
