//! member-server - 4nap membership registration backend
//!
//! # Architecture
//!
//! - **Registration** (`registration`): validate → allocate id → QR payload →
//!   card PDF → persist → email, with a soft failure on delivery
//! - **Stores** (`store`): in-memory, JSON file and Firestore record stores
//!   behind one trait
//! - **Notifications** (`notify`): SMTP relay and the welcome email template
//! - **HTTP API** (`api`): registration, lookup, payment webhook, health
//!
//! ```text
//! member-server/src/
//! ├── common/        # logging
//! ├── config.rs      # environment configuration
//! ├── state.rs       # shared application state
//! ├── store/         # record stores
//! ├── registration/  # pipeline, validation, QR, card layout
//! ├── notify/        # mail relay, templates
//! └── api/           # HTTP routes and handlers
//! ```

pub mod api;
pub mod common;
pub mod config;
pub mod notify;
pub mod registration;
pub mod state;
pub mod store;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use config::Config;
pub use registration::{Delivery, RegistrationError, RegistrationOutcome, RegistrationPipeline};
pub use state::AppState;
pub use store::{MemberStore, StoreError};
