use crate::core::input::{Glyph, Lane};
use crate::game::note::NoteId;
use crate::game::notefield::NoteField;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Hit(NoteId),
    Miss,
}

/// The best candidate for a tap, whether or not it lands inside the window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Candidate {
    pub id: NoteId,
    pub distance: f32,
}

/// Closest live note to the judgement line matching both lane and glyph.
/// Ties go to the note spawned first.
pub fn closest_candidate(field: &NoteField, lane: Lane, glyph: Glyph) -> Option<Candidate> {
    let line = field.line_distance();
    field
        .notes()
        .iter()
        .filter(|n| n.lane == lane && n.glyph == glyph)
        .map(|n| Candidate {
            id: n.id,
            distance: n.distance_to_line(line),
        })
        .fold(None, |best: Option<Candidate>, c| match best {
            Some(b) if b.distance <= c.distance => Some(b),
            _ => Some(c),
        })
}

/// Read-only verdict against the current field snapshot.
pub fn judge(field: &NoteField, lane: Lane, glyph: Glyph, hit_window: f32) -> Verdict {
    match closest_candidate(field, lane, glyph) {
        Some(c) if c.distance < hit_window => Verdict::Hit(c.id),
        _ => Verdict::Miss,
    }
}

/// Judges and, on a hit, removes the note in the same step so no later tap
/// can claim it. A miss never touches the field.
pub fn judge_and_claim(field: &mut NoteField, lane: Lane, glyph: Glyph, hit_window: f32) -> Verdict {
    match judge(field, lane, glyph, hit_window) {
        Verdict::Hit(id) => match field.remove(id) {
            Some(_) => Verdict::Hit(id),
            None => Verdict::Miss,
        },
        Verdict::Miss => Verdict::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: f32 = 60.0;

    fn field() -> NoteField {
        NoteField::new(400.0, 80.0)
    }

    #[test]
    fn picks_the_note_closest_to_the_line() {
        let mut f = field();
        f.place(Lane::Left, 330.0);
        let best = f.place(Lane::Left, 420.0);
        f.place(Lane::Left, 100.0);
        assert_eq!(judge(&f, Lane::Left, Glyph::Left, WINDOW), Verdict::Hit(best));
    }

    #[test]
    fn window_is_exclusive() {
        let mut f = field();
        f.place(Lane::Up, 340.0);
        assert_eq!(judge(&f, Lane::Up, Glyph::Up, WINDOW), Verdict::Miss);
        let inside = f.place(Lane::Up, 340.5);
        assert_eq!(judge(&f, Lane::Up, Glyph::Up, WINDOW), Verdict::Hit(inside));
    }

    #[test]
    fn lane_and_glyph_must_both_match() {
        let mut f = field();
        f.place(Lane::Down, 400.0);
        assert_eq!(judge(&f, Lane::Up, Glyph::Down, WINDOW), Verdict::Miss);
        assert_eq!(judge(&f, Lane::Down, Glyph::Up, WINDOW), Verdict::Miss);
    }

    #[test]
    fn empty_field_is_a_miss() {
        assert_eq!(judge(&field(), Lane::Right, Glyph::Right, WINDOW), Verdict::Miss);
    }

    #[test]
    fn a_claimed_note_cannot_be_hit_twice() {
        let mut f = field();
        let id = f.place(Lane::Down, 398.0);
        assert_eq!(judge_and_claim(&mut f, Lane::Down, Glyph::Down, WINDOW), Verdict::Hit(id));
        assert_eq!(judge_and_claim(&mut f, Lane::Down, Glyph::Down, WINDOW), Verdict::Miss);
        assert!(f.is_empty());
    }

    #[test]
    fn a_miss_leaves_the_field_alone() {
        let mut f = field();
        f.place(Lane::Left, 10.0);
        assert_eq!(judge_and_claim(&mut f, Lane::Left, Glyph::Left, WINDOW), Verdict::Miss);
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn equal_distance_prefers_the_older_note() {
        let mut f = field();
        let early = f.place(Lane::Right, 390.0);
        f.place(Lane::Right, 410.0);
        assert_eq!(closest_candidate(&f, Lane::Right, Glyph::Right).map(|c| c.id), Some(early));
    }
}
