//! # docask
//!
//! Ask questions about a PDF, answered from the document's own content.
//!
//! docask is a retrieval-augmented question answering pipeline: a PDF
//! is split into overlapping chunks, each chunk is embedded and indexed,
//! and every question is answered by a generation model that is only
//! allowed to use the chunks retrieved for it. Follow-up questions are
//! rewritten into standalone queries against the conversation history
//! before retrieval, so "what does *it* combine?" matches the document
//! even though the document never says "it".
//!
//! ## Architecture
//!
//! ```text
//! PDF ──▶ loader ──▶ chunk ──▶ embedding ──▶ index ──▶ cache (disk)
//!                                              ▲
//! question ──▶ rewrite ──▶ retrieve ───────────┘
//!                              │
//!                              ▼
//!                          compose ──▶ answer + source chunks
//! ```
//!
//! The first question about a document pays for the full build
//! (extract, chunk, embed, persist); later questions load the persisted
//! index from the cache directory keyed by the document identity.
//!
//! ## Quick Start
//!
//! ```bash
//! docask ask "What is ReAct?" --document ReAct.pdf
//! docask chat --document ReAct.pdf      # multi-turn REPL
//! docask index --document ReAct.pdf     # pre-build the index
//! docask cache clear --all
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`loader`] | PDF page-level text extraction |
//! | [`chunk`] | Overlapping fixed-size chunking |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`generation`] | Generation provider abstraction |
//! | [`index`] | Vector index: build, persist, load, query |
//! | [`cache`] | Index cache key and directory derivation |
//! | [`rewrite`] | History-aware query rewriting |
//! | [`retrieve`] | Top-K retrieval |
//! | [`compose`] | Grounded answer composition |
//! | [`session`] | Conversation turns and history |
//! | [`credential`] | API-key checks before pipeline work |
//! | [`pipeline`] | The ask orchestrator |

pub mod cache;
pub mod chunk;
pub mod compose;
pub mod config;
pub mod credential;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod retrieve;
pub mod rewrite;
pub mod session;
