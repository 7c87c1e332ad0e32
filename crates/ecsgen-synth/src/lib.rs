//! Companion-type synthesis for ECS authoring assemblies.
//!
//! This crate holds the passes that run over a compiled target image:
//!
//! - [`index`]: identity snapshots of the target and their diff
//! - [`fields`]: authoring fields for each bound component shape
//! - [`synthesis`]: nested companion types (drawers, editors, bakers)
//! - [`attributes`]: marker attributes on injected companions
//! - [`post_process`]: the pipeline that runs all of the above in order
//!
//! Host type names live in [`contracts`] and are configurable through
//! [`config`]; each pass records what it did in an [`log::ActivityLog`].

pub mod attributes;
pub mod config;
pub mod contracts;
mod error;
pub mod fields;
pub mod index;
pub mod log;
pub mod post_process;
pub mod synthesis;

pub use config::{PostProcessConfig, load_config, parse_config};
pub use contracts::{ContractRule, FieldStorage, HostContracts, HostType};
pub use error::{PostProcessError, SynthesisError};
pub use index::{AssemblyIndex, TypeDiff};
pub use log::ActivityLog;
pub use post_process::{
    CompiledAssembly, InjectedTypes, PostProcessor, ProcessOutcome, ProcessedAssembly,
};
pub use synthesis::{SynthesisRequest, synthesize};

// Host assembly world shared by the unit tests
#[cfg(test)]
#[path = "../tests/test_fixtures.rs"]
pub(crate) mod test_fixtures;
