//! TeaVision Common Library
//!
//! CLIとWeb(WASM)で共有される型・セッション・ルートガード・表データ

pub mod batch;
pub mod error;
pub mod guard;
pub mod model;
pub mod region;
pub mod report;
pub mod runner;
pub mod session;
pub mod tabular;
pub mod types;

pub use batch::{
    AgreementSummary, BatchEntry, ComparisonRow, ImageBatch, ImageItem, PolyphenolEntry,
    PolyphenolRow, PolyphenolTable,
};
pub use error::{Error, Result};
pub use guard::{guard, resolve, GuardDecision, Route, DEFAULT_AUTHENTICATED_ROUTE};
pub use model::ModelVariant;
pub use region::{probability_bars, region_info, ProbabilityBar};
pub use report::{comparison_table, polyphenol_table, prediction_table, ReportTable};
pub use runner::run_batch;
pub use session::{KeyValueStore, MemoryStore, Role, Session, SessionStore, User};
pub use tabular::parse_polyphenol_csv;
pub use types::{
    format_confidence, ConnectionStatus, CropResponse, HealthStatus, ImageType, ModelIndicator,
    PolyphenolRequest, PolyphenolSample, PredictionResult, RowStatus,
};
