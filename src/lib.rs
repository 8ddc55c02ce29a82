//! # parambind-rs
//!
//! `parambind-rs` binds typed, constrained parameters (booleans, bounded
//! numbers, strings, enumerations, colors, lists) to interactive controls,
//! keeping model and view synchronized without ever rendering a pixel
//! itself.
//!
//! The library provides:
//! - A declarative parameter schema with per-field bounds, allowed values
//!   and dependency rules
//! - A dependency engine deriving `visible`/`enabled` flags from other
//!   parameters' live values
//! - A nonlinear value mapper for slider-style numeric input (linear,
//!   logarithmic, power-law and tangent scales)
//! - A binding controller implementing a transactional control-to-parameter
//!   update protocol with rollback
//!
//! ## Basic Usage
//!
//! ```
//! use parambind_rs::engine;
//! use parambind_rs::schema::{DependencySpec, Descriptor, FlagKind, Kind, Value};
//! use parambind_rs::store::ParamSet;
//!
//! let set = ParamSet::new();
//! set.add(
//!     Descriptor::new("shape", Kind::SingleSelect, "circle")
//!         .with_allowed_values(["circle", "polygon", "star"].map(Value::from)),
//! )
//! .unwrap();
//! set.add(
//!     Descriptor::new("n_edge", Kind::Integer, 5)
//!         .with_bounds(3.0, 20.0)
//!         .unwrap()
//!         .with_dependencies(
//!             FlagKind::Visible,
//!             vec![DependencySpec::value_in(
//!                 "shape",
//!                 [Value::from("polygon"), Value::from("star")],
//!             )],
//!         ),
//! )
//! .unwrap();
//!
//! // Wire dependency propagation; flags now track values
//! let _deps = engine::attach(&set).unwrap();
//! assert!(!set.flag("n_edge", FlagKind::Visible).unwrap());
//!
//! set.set("shape", "star").unwrap();
//! assert!(set.flag("n_edge", FlagKind::Visible).unwrap());
//! ```

// Public modules
pub mod error;

// Parameter schema
pub mod schema;

// Runtime: storage, notification, dependency propagation
pub mod engine;
pub mod store;
pub mod watch;

// Control-facing subsystems
pub mod binding;
pub mod mapper;

// Re-exports for convenience
pub use binding::{Binding, Control, HostServices, Indicator};
pub use error::{MessageKind, ParamBindError, Result};
pub use mapper::{Mapping, ModeSpec, SliderMode, CONTROL_MAX};
pub use schema::{Bounds, DependencySpec, Descriptor, FlagKind, FlagSpec, Kind, Value};
pub use store::ParamSet;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
