use std::collections::HashMap;
use std::sync::Arc;

use super::program::ProgramId;
use crate::error::ProgramError;
use crate::scene::MeshBlendMode;

/// Which pass template a program was compiled into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    Init,
    Simulate,
    Display,
    Mesh,
    BonusMesh,
}

/// Everything a compiled pipeline depends on besides the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramKey {
    pub program: ProgramId,
    pub pass: PassKind,
    pub blend: Option<MeshBlendMode>,
    /// Vertex layout name, for passes that draw meshes
    pub layout: Option<&'static str>,
    /// Color target format, for passes that draw into scene targets
    pub target: Option<wgpu::TextureFormat>,
}

impl ProgramKey {
    pub fn new(program: ProgramId, pass: PassKind) -> Self {
        Self {
            program,
            pass,
            blend: None,
            layout: None,
            target: None,
        }
    }

    pub fn with_blend(mut self, blend: MeshBlendMode) -> Self {
        self.blend = Some(blend);
        self
    }

    pub fn with_layout(mut self, layout: &'static str) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_target(mut self, format: wgpu::TextureFormat) -> Self {
        self.target = Some(format);
        self
    }
}

/// Memoizes pipeline builds, failures included.
///
/// A failed build is reported once and then remembered, so a broken program
/// costs one warning instead of one compile per frame.
pub struct ProgramCache<P> {
    entries: HashMap<ProgramKey, Option<Arc<P>>>,
}

impl<P> Default for ProgramCache<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<P> ProgramCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the pipeline for `key`, building it on first use.
    pub fn resolve(
        &mut self,
        key: ProgramKey,
        build: impl FnOnce() -> Result<P, ProgramError>,
    ) -> Option<Arc<P>> {
        self.entries
            .entry(key)
            .or_insert_with(|| match build() {
                Ok(pipeline) => {
                    log::debug!("Compiled {:?} pipeline for {:?}", key.pass, key.program);
                    Some(Arc::new(pipeline))
                }
                Err(e) => {
                    log::warn!("{}; skipping it", e);
                    None
                }
            })
            .clone()
    }

    /// Drop every variant compiled from `program`.
    pub fn evict_program(&mut self, program: ProgramId) {
        self.entries.retain(|key, _| key.program != program);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EffectProgram;

    #[test]
    fn test_builds_once() {
        let program = EffectProgram::new("p", "");
        let key = ProgramKey::new(program.id(), PassKind::Init);
        let mut cache = ProgramCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            let got = cache.resolve(key, || {
                builds += 1;
                Ok(7u32)
            });
            assert_eq!(got.as_deref(), Some(&7));
        }
        assert_eq!(builds, 1);
    }

    #[test]
    fn test_failures_are_remembered() {
        let program = EffectProgram::new("broken", "");
        let key = ProgramKey::new(program.id(), PassKind::Display);
        let mut cache: ProgramCache<u32> = ProgramCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            let got = cache.resolve(key, || {
                builds += 1;
                Err(ProgramError::Compile {
                    program: "broken".into(),
                    pass: "display".into(),
                    message: "bad".into(),
                })
            });
            assert!(got.is_none());
        }
        assert_eq!(builds, 1);
    }

    #[test]
    fn test_variants_are_distinct() {
        let program = EffectProgram::new("mesh", "");
        let mut cache = ProgramCache::new();
        for (i, mode) in MeshBlendMode::ALL.into_iter().enumerate() {
            let key = ProgramKey::new(program.id(), PassKind::Mesh)
                .with_blend(mode)
                .with_layout("pnu");
            cache.resolve(key, || Ok(i));
        }
        let display = ProgramKey::new(program.id(), PassKind::Display);
        cache.resolve(display.with_target(wgpu::TextureFormat::Bgra8UnormSrgb), || Ok(10));
        cache.resolve(display.with_target(wgpu::TextureFormat::Rgba8Unorm), || Ok(11));
        assert_eq!(cache.len(), 5);
        cache.evict_program(program.id());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicting_retired_program_keeps_successor() {
        let old = EffectProgram::new("old", "");
        let new = EffectProgram::new("new", "");
        let mut cache = ProgramCache::new();
        for pass in [PassKind::Init, PassKind::Simulate, PassKind::Display] {
            cache.resolve(ProgramKey::new(old.id(), pass), || Ok(1u32));
        }
        for pass in [PassKind::Simulate, PassKind::Display] {
            cache.resolve(ProgramKey::new(new.id(), pass), || Ok(2u32));
        }
        assert_eq!(cache.len(), 5);

        cache.evict_program(old.id());
        assert_eq!(cache.len(), 2);
        let mut rebuilt = false;
        let got = cache.resolve(ProgramKey::new(new.id(), PassKind::Simulate), || {
            rebuilt = true;
            Ok(3)
        });
        assert_eq!(got.as_deref(), Some(&2));
        assert!(!rebuilt);
    }
}
