//! Asynchronous business logic for reflux stores.
//!
//! Logic units are registered against an action type with
//! [`configure_logic`]. Every dispatch of that type then runs through a
//! pipeline: transform and validate before the reducers see the action,
//! process after. Units are ordered by priority, can be canceled by another
//! action type or by a [`PoisonPill`], and batch their own dispatches with a
//! [`MultiDispatcher`].

pub mod cancel;
pub mod config;
pub mod configure;
pub mod context;
pub mod error;
pub mod logic;
pub mod multi_dispatcher;
pub mod pipeline;
pub mod poison_pill;
pub mod unit;
pub mod validation;

pub use cancel::{CancelSignal, Canceled, UnitStatus};
pub use config::{LogicConfig, LongRunningStrategy};
pub use configure::{configure_logic, configure_logic_with};
pub use context::LogicContext;
pub use error::LogicError;
pub use logic::Logic;
pub use multi_dispatcher::MultiDispatcher;
pub use pipeline::{LogicEnhancer, LogicRegistry, UnitHandle};
pub use poison_pill::PoisonPill;
pub use unit::{Binding, LogicHandler, LogicUnit, PreProcessResult, ProcessOutcome};
pub use validation::{LogicFailure, Validation, ValidationDetail, ValidationError};
