//! Build machinery shared by products: the context handed to every
//! lifecycle call, the CMake adapter, SDK lookup, the legacy phase and
//! build events.

pub mod cmake;
pub mod context;
pub mod events;
pub mod legacy;
pub mod sdk;

pub use cmake::{CMakeBuilder, CMakeOptions};
pub use context::BuildContext;
pub use events::{BuildEvent, ConsoleSink, EventSink, MessageFormat, NullSink};
pub use legacy::{LegacyPhase, LegacyRequest, ScriptLegacyPhase};
pub use sdk::{SdkLocator, XcrunSdkLocator};
