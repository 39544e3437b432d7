//! Editor-kernel collaborators used by the window layer
//!
//! These are the small containers the windowing code reports into or reads
//! from: the report list, the icon registry, system metadata and the asset
//! resolver boundary.

pub mod icons;
pub mod paths;
pub mod report;
pub mod resolver;

pub use icons::{Icon, IconError, IconRegistry};
pub use paths::{BoundedString, SystemPaths, SystemVersion};
pub use report::{Report, ReportList, ReportListFlags, ReportType};
pub use resolver::{AssetResolver, SearchPathResolver};
