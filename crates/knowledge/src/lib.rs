//! Reference knowledge for campaign planning: golden templates, checklist,
//! static guides, and per-request context assembly.

pub mod context;
pub mod knowledge_base;
pub mod loader;
pub mod model;
pub mod seasonality;
pub mod similarity;

pub use context::{Benchmarks, ContextAssembler, ContextBundle};
pub use knowledge_base::KnowledgeBase;
pub use model::{ChecklistItem, Template, ValidationChecklist};
pub use seasonality::Seasonality;
