use serde::Serialize;

pub const LANE_COUNT: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Lane {
    Left = 0,
    Down = 1,
    Up = 2,
    Right = 3,
}

pub const ALL_LANES: [Lane; LANE_COUNT] = [Lane::Left, Lane::Down, Lane::Up, Lane::Right];

impl Lane {
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Out-of-range indices come from collaborators as-is; they map to `None`
    /// and the tap is dropped.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Lane::Left),
            1 => Some(Lane::Down),
            2 => Some(Lane::Up),
            3 => Some(Lane::Right),
            _ => None,
        }
    }

    /// Every lane is bound to exactly one arrow glyph.
    #[inline(always)]
    pub const fn glyph(self) -> Glyph {
        match self {
            Lane::Left => Glyph::Left,
            Lane::Down => Glyph::Down,
            Lane::Up => Glyph::Up,
            Lane::Right => Glyph::Right,
        }
    }
}

/// The arrow symbol printed on a note and carried by a tap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Glyph {
    Left,
    Down,
    Up,
    Right,
}

impl Glyph {
    pub const fn as_char(self) -> char {
        match self {
            Glyph::Left => '←',
            Glyph::Down => '↓',
            Glyph::Up => '↑',
            Glyph::Right => '→',
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TapEvent {
    pub lane: i64,
    pub glyph: Glyph,
}

impl TapEvent {
    /// A well-formed tap on `lane` carrying that lane's own glyph.
    pub fn on(lane: Lane) -> Self {
        Self {
            lane: lane.index() as i64,
            glyph: lane.glyph(),
        }
    }
}
