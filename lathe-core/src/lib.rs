pub mod ast;
pub mod correspond;
pub mod error;
pub mod functorize;
pub mod lower_types;
pub mod markers;
pub mod registry;
pub mod rewrite;
pub mod scope;
pub mod specialize;
pub mod types;
pub mod wrap_entry;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod functorize_tests;

use ast::Suite;
use error::Result;
use functorize::CallCorrespondence;
use log::info;

pub use error::CompilerError;
pub use registry::Registry;

// =============================================================================
// Typestate Pipeline
// =============================================================================
//
// Each struct represents a stage. Methods consume `self` and return the next
// stage, enforcing the pass order:
//
//   Compiler::new(program, &registry, options)    -> Typed
//     -> .lower_types()                           -> TypesLowered
//       -> .functorize()                          -> Functorized
//         -> .wrap_entry()                        -> EntryWrapped
//           -> .specialize()                      -> Specialized
//
// The registry is borrowed by every stage and never mutated. The first failing
// pass aborts the pipeline; there is no partial output.

/// Options for one compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Name of the procedure called from outside the program.
    pub entry_point: String,
}

impl PipelineOptions {
    pub fn new(entry_point: impl Into<String>) -> Self {
        PipelineOptions {
            entry_point: entry_point.into(),
        }
    }
}

/// Entry point for the pipeline. Use `Compiler::new()` to start.
pub struct Compiler;

impl Compiler {
    /// Start from a type-checked program.
    pub fn new(program: Suite, registry: &Registry, options: PipelineOptions) -> Typed<'_> {
        Typed {
            program,
            registry,
            options,
        }
    }

    /// Run every pass in order.
    pub fn run(program: Suite, registry: &Registry, options: PipelineOptions) -> Result<Specialized> {
        Compiler::new(program, registry, options)
            .lower_types()?
            .functorize()?
            .wrap_entry()?
            .specialize()
    }
}

/// Program as delivered by the type checker: implementation types still void
pub struct Typed<'r> {
    pub program: Suite,
    registry: &'r Registry,
    options: PipelineOptions,
}

impl<'r> Typed<'r> {
    /// Attach implementation types to names, literals and procedures
    pub fn lower_types(self) -> Result<TypesLowered<'r>> {
        info!("Lowering types");
        let program = lower_types::lower_types(&self.program)?;
        Ok(TypesLowered {
            program,
            registry: self.registry,
            options: self.options,
        })
    }
}

/// Implementation types have been attached
pub struct TypesLowered<'r> {
    pub program: Suite,
    registry: &'r Registry,
    options: PipelineOptions,
}

impl<'r> TypesLowered<'r> {
    /// Synthesize function objects and instantiate procedures used as values
    pub fn functorize(self) -> Result<Functorized> {
        info!("Functorizing (entry point {})", self.options.entry_point);
        let out = functorize::functorize(&self.program, &self.options.entry_point, self.registry)?;
        Ok(Functorized {
            program: out.program,
            correspondences: out.correspondences,
            options: self.options,
        })
    }
}

/// Top-level procedures have function-object companions
pub struct Functorized {
    pub program: Suite,
    pub correspondences: Vec<CallCorrespondence>,
    options: PipelineOptions,
}

impl Functorized {
    /// Add the container-to-view wrapper around the entry point
    pub fn wrap_entry(self) -> Result<EntryWrapped> {
        info!("Wrapping entry point {}", self.options.entry_point);
        let program = wrap_entry::wrap_entry(&self.program, &self.options.entry_point)?;
        Ok(EntryWrapped {
            program,
            correspondences: self.correspondences,
        })
    }
}

/// The entry point accepts containers
pub struct EntryWrapped {
    pub program: Suite,
    pub correspondences: Vec<CallCorrespondence>,
}

impl EntryWrapped {
    /// Apply backend-specific typing to builtin sequence operations
    pub fn specialize(self) -> Result<Specialized> {
        info!("Specializing builtin calls");
        let program = specialize::specialize(&self.program)?;
        Ok(Specialized {
            program,
            correspondences: self.correspondences,
        })
    }
}

/// Final stage: ready for the serializer
pub struct Specialized {
    pub program: Suite,
    /// Type-variable bindings recovered at polymorphic call sites
    pub correspondences: Vec<CallCorrespondence>,
}
