use std::fmt::{Display, Formatter};

/// Classes the detection model is known to emit, everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Person,
    Cat,
    Dog,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Blue,
    Green,
    Purple,
    Red,
}

impl ObjectKind {
    pub fn from_class_id(class_id: u32) -> Self {
        match class_id {
            1 => Self::Person,
            2 => Self::Cat,
            3 => Self::Dog,
            _ => Self::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Cat => "cat",
            Self::Dog => "dog",
            Self::Other => "other",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Person => Color::Blue,
            Self::Cat => Color::Green,
            Self::Dog => Color::Purple,
            Self::Other => Color::Red,
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Blue => (0, 0, 255),
            Self::Green => (0, 128, 0),
            Self::Purple => (128, 0, 128),
            Self::Red => (255, 0, 0),
        }
    }
}
