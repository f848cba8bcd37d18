//! Orientation debouncer.
//!
//! The accelerometer is sampled every few seconds and each sample is
//! classified into a dice face by an external classifier.  A node lying
//! still produces the same face forever; only changes are worth a radio
//! message.

/// Face label produced by the orientation classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Face {
    #[default]
    Unknown = 0,
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
}

impl Face {
    /// Integer code published on the `orientation` topic.
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// One raw accelerometer sample in g.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Acceleration {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Edge detector over the classified face.
#[derive(Debug, Default)]
pub struct OrientationDebouncer {
    last_face: Face,
}

impl OrientationDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the face if it differs from the previous classification.
    pub fn update(&mut self, face: Face) -> Option<Face> {
        if face == self.last_face {
            return None;
        }
        self.last_face = face;
        Some(face)
    }

    pub fn last_face(&self) -> Face {
        self.last_face
    }
}
