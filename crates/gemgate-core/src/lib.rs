//! # gemgate Core
//!
//! Core logic behind the gemgate server and terminal chat.
//!
//! ```text
//! gemgate-core/src/
//! ├── modules/config.rs      # gemgate.json + env overrides
//! ├── utils/paths.rs         # data directory resolution
//! └── proxy/
//!     ├── mappers/           # history normalizer, prompt composer
//!     ├── batch.rs           # single / full-set / variation orchestration
//!     ├── upstream/          # Gateway trait + Gemini REST client
//!     ├── common/            # upstream error rewriting, http client builder
//!     ├── session.rs         # explicit chat session (conversation + credential)
//!     ├── handlers/          # /api/login, /api/gemini, /api/nanobanana
//!     ├── middleware/        # cookie gate, CORS
//!     └── server.rs          # AppState + API router
//! ```

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod modules;
pub mod proxy;
pub mod utils;

pub use error::{AppError, AppResult};
