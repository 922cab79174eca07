// src/pipeline/mod.rs
mod assembler;
mod builder;
mod config;
mod content;
mod session;
mod slot_size;

pub use assembler::{AssembledOutput, Assembler, PageTotals};
pub use builder::AssemblerBuilder;
pub use config::{AssemblyConfig, DEFAULT_TEXT_SLOT_PADDING};
pub use slot_size::text_slot_size;
