//! HTTP surface for the workflow event pipeline.

pub mod app;
