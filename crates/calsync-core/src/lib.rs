//! Core types: event records, meeting classification, template rendering

pub mod classify;
pub mod event;
pub mod template;
pub mod time;
pub mod tracing;

pub use classify::{classify, email_domain, TemplateCategory};
pub use event::EventRecord;
pub use template::{
    render, resolve, TemplateBindings, TemplateBlock, TemplateError, PLACEHOLDERS,
};
pub use time::{clock_time, day_bounds};
pub use crate::tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
