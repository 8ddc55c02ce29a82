//! # Parameter Schema
//!
//! This module provides the static description of a parameter surface: typed
//! values, numeric bounds, dependency rules and the descriptor record tying
//! them together.
//!
//! ## Core Components
//!
//! - [`Value`] and [`Kind`]: the dynamic value a parameter holds and the
//!   static type its descriptor declares
//! - [`Bounds`]: numeric min/max constraints with optional infinite sides
//! - [`DependencySpec`] and [`FlagSpec`]: declarative rules a descriptor's
//!   `visible`/`enabled` flags are derived from
//! - [`Descriptor`] and [`DescriptorSpec`]: the per-parameter metadata
//!   record and its authored serde form
//!
//! ## Example Usage
//!
//! ```rust
//! use parambind_rs::schema::{DependencySpec, Descriptor, FlagKind, Kind, Value};
//!
//! let shape = Descriptor::new("shape", Kind::SingleSelect, "circle")
//!     .with_allowed_values(["circle", "polygon", "star"].map(Value::from));
//!
//! // n_edge is only visible while shape has edges to count
//! let n_edge = Descriptor::new("n_edge", Kind::Integer, 5)
//!     .with_bounds(3.0, 20.0)
//!     .unwrap()
//!     .with_dependencies(
//!         FlagKind::Visible,
//!         vec![DependencySpec::value_in(
//!             "shape",
//!             [Value::from("polygon"), Value::from("star")],
//!         )],
//!     );
//!
//! assert!(shape.validate().is_ok());
//! assert!(n_edge.validate().is_ok());
//! ```

pub mod bounds;
pub mod dependency;
pub mod descriptor;
pub mod value;

// Re-export key types
pub use bounds::{Bounds, BoundsError};
pub use dependency::{DependencySpec, FlagKind, FlagSpec};
pub use descriptor::{Descriptor, DescriptorSpec, SchemaError};
pub use value::{ColorParseError, Kind, Rgb, Value};
