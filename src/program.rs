//! Program variants and their cache.
//!
//! Every pass over a field runs through a [`Program`]. Some programs have
//! compile-time variants selected by [`Keyword`]s; a variant is identified by
//! its kind plus the canonical (sorted, deduplicated) set of keywords, so the
//! order in which callers list keywords never produces a second compile.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use glam::Vec2;

use crate::error::{Result, SplashError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Keyword {
    Shading,
    ManualFiltering,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Keyword::Shading => f.write_str("SHADING"),
            Keyword::ManualFiltering => f.write_str("MANUAL_FILTERING"),
        }
    }
}

pub type KeywordSet = BTreeSet<Keyword>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Copy,
    Clear,
    Splat,
    Advection,
    Divergence,
    Curl,
    Vorticity,
    Pressure,
    GradientSubtract,
    Display,
}

impl ProgramKind {
    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::Copy => "copy",
            ProgramKind::Clear => "clear",
            ProgramKind::Splat => "splat",
            ProgramKind::Advection => "advection",
            ProgramKind::Divergence => "divergence",
            ProgramKind::Curl => "curl",
            ProgramKind::Vorticity => "vorticity",
            ProgramKind::Pressure => "pressure",
            ProgramKind::GradientSubtract => "gradient subtract",
            ProgramKind::Display => "display",
        }
    }

    fn supported_keywords(self) -> &'static [Keyword] {
        match self {
            ProgramKind::Advection => &[Keyword::ManualFiltering],
            ProgramKind::Display => &[Keyword::Shading],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    kind: ProgramKind,
    keywords: KeywordSet,
}

impl Program {
    pub fn compile(kind: ProgramKind, keywords: &KeywordSet) -> Result<Program> {
        if let Some(unknown) = keywords
            .iter()
            .find(|keyword| !kind.supported_keywords().contains(keyword))
        {
            return Err(SplashError::ProgramCompile {
                program: kind.name(),
                reason: format!("unknown keyword {unknown}"),
            });
        }

        Ok(Program {
            kind,
            keywords: keywords.clone(),
        })
    }

    pub fn kind(&self) -> ProgramKind {
        self.kind
    }

    pub fn has(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }
}

/// Compiled programs keyed by kind and keyword set.
///
/// A failed compile is cached too: the variant stays unbound and is never
/// recompiled for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct ProgramCache {
    programs: HashMap<(ProgramKind, KeywordSet), Option<Program>>,
    rejected: HashSet<ProgramKind>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache whose context refuses to compile any variant of `kinds`.
    pub fn rejecting(kinds: impl IntoIterator<Item = ProgramKind>) -> Self {
        Self {
            programs: HashMap::new(),
            rejected: kinds.into_iter().collect(),
        }
    }

    pub fn get(
        &mut self,
        kind: ProgramKind,
        keywords: impl IntoIterator<Item = Keyword>,
    ) -> Option<&Program> {
        let keywords: KeywordSet = keywords.into_iter().collect();
        let rejected = &self.rejected;
        self.programs
            .entry((kind, keywords))
            .or_insert_with_key(|(kind, keywords)| {
                let compiled = if rejected.contains(kind) {
                    Err(SplashError::ProgramCompile {
                        program: kind.name(),
                        reason: "rejected by the graphics context".into(),
                    })
                } else {
                    Program::compile(*kind, keywords)
                };
                match compiled {
                    Ok(program) => {
                        log::debug!("compiled {} program {:?}", kind.name(), keywords);
                        Some(program)
                    }
                    Err(err) => {
                        log::error!("{err}; passes using it are skipped");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Number of cached variants, failed ones included.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Texture coordinates produced by the vertex stage for one fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbors {
    pub uv: Vec2,
    pub l: Vec2,
    pub r: Vec2,
    pub t: Vec2,
    pub b: Vec2,
}

/// The shared vertex stage: the fragment's uv and its four one-texel neighbors.
pub fn vertex(uv: Vec2, texel_size: Vec2) -> Neighbors {
    Neighbors {
        uv,
        l: uv - Vec2::new(texel_size.x, 0.0),
        r: uv + Vec2::new(texel_size.x, 0.0),
        t: uv + Vec2::new(0.0, texel_size.y),
        b: uv - Vec2::new(0.0, texel_size.y),
    }
}
