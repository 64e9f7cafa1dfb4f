//! The software graphics device the effect renders with.

use crate::canvas::Canvas;
use crate::error::{Result, SplashError};
use crate::field::Filter;
use crate::program::{Keyword, Program, ProgramCache, ProgramKind};

/// Optional features a graphics context may lack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Float fields can be rendered into.
    pub float_textures: bool,
    /// Samplers can interpolate between texels.
    pub linear_filtering: bool,
}

impl Capabilities {
    pub const FULL: Self = Self {
        float_textures: true,
        linear_filtering: true,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug)]
pub struct Device {
    capabilities: Capabilities,
    programs: ProgramCache,
}

impl Device {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            programs: ProgramCache::new(),
        }
    }

    /// A device whose context fails to compile every variant of `kinds`.
    pub fn with_rejected_programs(
        capabilities: Capabilities,
        kinds: impl IntoIterator<Item = ProgramKind>,
    ) -> Self {
        Self {
            capabilities,
            programs: ProgramCache::rejecting(kinds),
        }
    }

    /// Acquires the canvas' graphics context.
    pub fn acquire(canvas: &Canvas) -> Result<Self> {
        let capabilities = canvas
            .capabilities()
            .ok_or(SplashError::ContextUnavailable)?;
        Ok(Self::with_rejected_programs(
            capabilities,
            canvas.rejected_programs().iter().copied(),
        ))
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Filter used by samplers that ask for interpolation.
    pub fn filter(&self) -> Filter {
        if self.capabilities.linear_filtering {
            Filter::Linear
        } else {
            Filter::Nearest
        }
    }

    pub fn advection_keywords(&self) -> Vec<Keyword> {
        if self.capabilities.linear_filtering {
            Vec::new()
        } else {
            vec![Keyword::ManualFiltering]
        }
    }

    /// The compiled variant, or `None` if it failed to compile.
    pub fn program(
        &mut self,
        kind: ProgramKind,
        keywords: impl IntoIterator<Item = Keyword>,
    ) -> Option<Program> {
        self.programs.get(kind, keywords).cloned()
    }

    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }
}
