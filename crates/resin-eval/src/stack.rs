//! The variable stack: the evaluator's transient binding environment.

use resin_syntax::ast::NodeId;

use crate::value::Value;

/// One runtime binding. Frames are pushed anonymous while a binding group
/// initialises and receive their binding handle only once the whole group
/// has run, so an initialiser can never observe a sibling of its own group.
#[derive(Debug, Clone, Copy)]
struct Frame {
    binding: Option<NodeId>,
    value: Value,
}

/// An ordered sequence of `(binding, value)` frames, scanned top-down.
///
/// The stack is a side-effect and incoherence terminator: once a value is
/// named, re-using it is a reference, not a re-evaluation, so the stored
/// copy drops its `sidefx` and `incoh` flags.
#[derive(Debug, Default)]
pub struct VarStack {
    frames: Vec<Frame>,
}

impl VarStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Push one anonymous frame holding a cleansed copy of `value`.
    pub fn push_anonymous(&mut self, value: Value) {
        let mut value = value;
        value.sidefx = false;
        value.incoh = false;
        self.frames.push(Frame {
            binding: None,
            value,
        });
    }

    /// De-anonymise the frames pushed since `from`, assigning each its
    /// binding handle in push order.
    pub fn publish(&mut self, from: usize, bindings: &[NodeId]) {
        for (frame, &binding) in self.frames[from..].iter_mut().zip(bindings) {
            frame.binding = Some(binding);
        }
    }

    /// Top-down scan for the innermost frame published under `binding`;
    /// the scan order implements lexical shadowing.
    pub fn lookup(&self, binding: NodeId) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find(|f| f.binding == Some(binding))
            .map(|f| f.value)
    }

    /// Pop every frame above the saved height.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }
}
