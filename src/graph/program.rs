use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Process-unique program identity, used as a pipeline cache key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(u64);

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// A user-authored shader program ("material").
///
/// `source` is WGSL defining any subset of the slot functions of the output
/// schemas it is used with, plus whatever helpers those need. Constants and
/// flags override slot defaults and are keyed as `"<schema>.<slot>"` and
/// `"<schema>.<flag>"` respectively.
#[derive(Debug)]
pub struct EffectProgram {
    id: ProgramId,
    name: String,
    source: String,
    constants: BTreeMap<String, f32>,
    flags: BTreeMap<String, bool>,
}

pub type ProgramRef = Arc<EffectProgram>;

impl EffectProgram {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: ProgramId(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            source: source.into(),
            constants: BTreeMap::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Override the constant default of an optional slot, e.g. `"simulate1.threshold_too_many"`.
    pub fn with_constant(mut self, key: impl Into<String>, value: f32) -> Self {
        self.constants.insert(key.into(), value);
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn into_ref(self) -> ProgramRef {
        Arc::new(self)
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn constant(&self, key: &str) -> Option<f32> {
        self.constants.get(key).copied()
    }

    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }
}
