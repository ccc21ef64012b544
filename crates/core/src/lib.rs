pub mod batch;
pub mod catalog;
pub mod config;
pub mod layout;
pub mod output;
pub mod render;
pub mod symbol;
pub mod testing;

pub use batch::{
    BatchInput, BatchObserver, BatchOptions, BatchOrchestrator, BatchSummary, ExistingLabels,
    FailureKind, LabelError, LabelResult, LabelStatus, RunMode,
};
pub use catalog::{CatalogError, ScryfallClient, SetCatalog, SetCode, SetRecord, SetSummary};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use layout::{compute_layout, CanvasSize, LayoutError, LayoutPlan};
pub use output::{DirectorySink, LabelSink, OutputError};
pub use render::{render_label, RenderError};
pub use symbol::{
    FixedDecision, MissingSymbolDecision, MissingSymbolPrompt, RunContext, SymbolError,
    SymbolImage, SymbolResolver,
};
