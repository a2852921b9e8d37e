//! Runtime values for the Resin evaluator.

use std::fmt;

use resin_syntax::ast::RetType;

/// The numeric payload of a value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Num {
    I32(i32),
    F32(f32),
}

/// A value together with the three status flags the partial evaluator
/// tracks.
///
/// - `literal`: computed from literals only, with no I/O and no untaken
///   branches; intersects across operands.
/// - `sidefx`: evaluating the producing sub-tree had an observable effect;
///   unions across operands.
/// - `incoh`: the static type of the producing sub-tree is not determinable;
///   unions across operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Value {
    pub num: Num,
    pub literal: bool,
    pub sidefx: bool,
    pub incoh: bool,
}

impl Value {
    /// A value freshly decoded from a literal node.
    pub fn lit_i32(v: i32) -> Self {
        Self {
            num: Num::I32(v),
            literal: true,
            sidefx: false,
            incoh: false,
        }
    }

    /// A value freshly decoded from a literal node.
    pub fn lit_f32(v: f32) -> Self {
        Self {
            num: Num::F32(v),
            literal: true,
            sidefx: false,
            incoh: false,
        }
    }

    /// A value produced by a read: observable, and never foldable.
    pub fn read_i32(v: i32) -> Self {
        Self {
            num: Num::I32(v),
            literal: false,
            sidefx: true,
            incoh: false,
        }
    }

    /// A value produced by a read: observable, and never foldable.
    pub fn read_f32(v: f32) -> Self {
        Self {
            num: Num::F32(v),
            literal: false,
            sidefx: true,
            incoh: false,
        }
    }

    /// The concrete type of the payload.
    pub fn rtype(&self) -> RetType {
        match self.num {
            Num::I32(_) => RetType::I32,
            Num::F32(_) => RetType::F32,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.num {
            Num::I32(v) => write!(f, "i32 {}", v),
            Num::F32(v) => write!(f, "f32 {:.6}", v),
        }
    }
}
