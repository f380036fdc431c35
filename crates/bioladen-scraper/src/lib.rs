pub mod address;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod navigate;
pub mod normalize;
pub mod run;
pub mod sink;

pub use address::{parse_address, ParsedAddress};
pub use dedup::{identity_key, DedupIndex, RecordDeduplicator};
pub use error::{NavigationError, PageError, SinkError, TaskError};
pub use extract::{Extraction, ExtractionStats, Extractor};
pub use navigate::{
    BrowserPage, ChromeBrowser, Interaction, NavReport, NavSettings, NavState,
    NavigationController, PageFactory,
};
pub use normalize::normalize_space;
pub use run::{Orchestrator, RunSummary, TaskOutcome};
pub use sink::{MemorySink, RecordSink};
