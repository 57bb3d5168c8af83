//! Observability for the data layer.
//!
//! Diagnostics go through `tracing`; installing a subscriber is left to the
//! application. The optional [`Logger`] additionally keeps a markdown journal
//! of seeding, fallbacks and sync outcomes.
//!
//! # Example
//!
//! ```no_run
//! use santseva_store::data::{Collection, Mode};
//! use santseva_store::observability::Logger;
//!
//! let logger = Logger::new(None, Some("INFO")).unwrap();
//! logger.log_mode_change(Mode::Local, Mode::GitHub).unwrap();
//! logger.log_seed(Collection::Events, 4).unwrap();
//! ```

pub mod logger;

pub use logger::Logger;
