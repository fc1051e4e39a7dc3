//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (the marketplace API, durable storage, LLMs, push services).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │        (Poller)         │
//!     ┌──────────────┤  Domain + Port          ├──────────────┐
//!     │              │                         │              │
//!     │              └─────────────────────────┘              │
//!     │                         │                             │
//!     ▼                         ▼                             ▼
//! ┌─────────┐            ┌─────────────┐              ┌───────────┐
//! │ Upwork  │            │   Ledger    │              │ Notifier  │
//! │ Adapter │            │   Adapter   │              │  Adapter  │
//! └─────────┘            └─────────────┘              └───────────┘
//! ```
//!
//! # Available Ports
//!
//! - [`JobSource`] - Marketplace search and posting details
//! - [`HttpTransport`] - HTTP stack underneath the API clients
//! - [`CredentialPersistence`] - Durable storage for rotated tokens
//! - [`SeenLedger`] - Deduplication of handled postings
//! - [`PostingAnalyzer`], [`Llm`] - Optional scoring
//! - [`PostingNotifier`] - Push notifications

pub mod outbound;

pub use outbound::analyzer::PostingAnalyzer;
pub use outbound::credential::CredentialPersistence;
pub use outbound::ledger::SeenLedger;
pub use outbound::llm::Llm;
pub use outbound::marketplace::JobSource;
pub use outbound::notifier::{LogNotifier, PostingNotifier};
pub use outbound::transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody};
