//! Output sinks.
//!
//! Records are streamed as newline-delimited JSON by [`jsonl::JsonlWriter`]: one object per line,
//! UTF-8 with non-ASCII characters written literally, flushed after every record so a crash
//! mid-run loses at most the record being written.
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── ai-weekly.jsonl
//! ├── hf-papers.jsonl     # {url, title, date, context}
//! └── jiqizhixin.jsonl    # {url, title, date, content}
//! ```

pub mod jsonl;
