//! # picsqueeze
//!
//! Batch image compressor: every image in a folder is re-encoded as JPEG so
//! its file size lands at or below a target measured in kilobytes.
//!
//! The size/quality relationship of a JPEG encoder isn't invertible, so the
//! encoder simply walks quality downward in fixed steps — encode, measure,
//! step, repeat — until the output fits or quality runs out. When quality is
//! exhausted the last encode is kept even though it misses the target; a
//! too-ambitious target degrades output instead of failing the file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`encoder`] | Size-targeting JPEG encoder — pure in-memory transform |
//! | [`batch`] | Directory orchestration: enumerate, compress, write, with per-file failure isolation |
//! | [`output`] | Log-line formatting for batch progress events |
//!
//! # Design Decisions
//!
//! ## Blocking core, threading at the edge
//!
//! [`batch::run`] is a plain blocking function. The CLI puts it on a worker
//! thread and drains progress from an `mpsc` channel so the foreground stays
//! responsive, but nothing in the core knows about threads. Embedders choose
//! their own scheduling.
//!
//! ## Progress as data, not strings
//!
//! The batch emits typed [`batch::BatchEvent`]s through an injected sender.
//! Formatting lives entirely in [`output`], so the same run can feed a
//! terminal, a log file, or a GUI text widget without touching the core.
//!
//! ## Per-file failure isolation
//!
//! A corrupt or unreadable image costs exactly one outcome line. Batch-fatal
//! conditions are limited to the preconditions (bad target, missing
//! directories, nothing to do) and are checked before any file is processed.

pub mod batch;
pub mod encoder;
pub mod output;
