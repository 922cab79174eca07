use folio_types::Pt;
use lopdf::Object;

/// A PDF transformation matrix `[a b c d e f]`.
///
/// Points are row vectors, so `p' = p × M`; `first.then(second)` applies
/// `first` before `second`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(x: Pt, y: Pt) -> Self {
        Self {
            e: x.value(),
            f: y.value(),
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    pub fn then(self, next: Transform) -> Transform {
        Transform {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    pub fn apply(&self, x: Pt, y: Pt) -> (Pt, Pt) {
        let (x, y) = (x.value(), y.value());
        (
            Pt(self.a * x + self.c * y + self.e),
            Pt(self.b * x + self.d * y + self.f),
        )
    }

    /// Operands for a `cm` operator.
    pub fn operands(&self) -> Vec<Object> {
        [self.a, self.b, self.c, self.d, self.e, self.f]
            .into_iter()
            .map(|v| Object::Real(v as f32))
            .collect()
    }
}

/// Converts a distance measured down from the top edge into PDF's bottom-up y.
pub fn flip_y(from_top: Pt, page_height: Pt) -> Pt {
    page_height - from_top
}
