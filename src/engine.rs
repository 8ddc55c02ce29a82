//! Dependency propagation engine
//!
//! Derives a descriptor's `visible`/`enabled` flags from its dependency
//! lists and keeps them current: attaching a set subscribes a recompute
//! callback for every referenced parameter and performs one immediate
//! evaluation to establish initial state. The evaluator itself is stateless;
//! everything it needs lives on the descriptors and the store.
//!
//! Evaluation terminates because dependency specs reference parameter
//! *values* while only *flags* are written back, and the store skips
//! notifications for unchanged flag writes. Cyclic references between
//! dependency lists are rejected at attach time.

use crate::error::{ParamBindError, Result};
use crate::schema::{FlagKind, FlagSpec};
use crate::store::{ParamSet, WeakParamSet};
use crate::watch::{ChangeKind, WatchId};
use std::collections::HashMap;

/// Evaluate one flag of one parameter against live values
///
/// All specs in the flag's dependency list must be satisfied (logical AND);
/// evaluation short-circuits on the first unsatisfied spec. An empty list
/// and a derived flag with no specs both evaluate to `true`.
///
/// # Examples
///
/// ```
/// use parambind_rs::engine;
/// use parambind_rs::schema::{DependencySpec, Descriptor, FlagKind, Kind, Value};
/// use parambind_rs::store::ParamSet;
///
/// let set = ParamSet::new();
/// set.add(Descriptor::new("use_marker", Kind::Boolean, false)).unwrap();
/// set.add(
///     Descriptor::new("marker_size", Kind::Integer, 4).with_dependencies(
///         FlagKind::Enabled,
///         vec![DependencySpec::truthy("use_marker")],
///     ),
/// )
/// .unwrap();
///
/// assert!(!engine::evaluate(&set, "marker_size", FlagKind::Enabled).unwrap());
/// set.set("use_marker", true).unwrap();
/// assert!(engine::evaluate(&set, "marker_size", FlagKind::Enabled).unwrap());
/// ```
pub fn evaluate(set: &ParamSet, name: &str, flag: FlagKind) -> Result<bool> {
    let descriptor = set.descriptor(name)?;
    match descriptor.flag_spec(flag) {
        FlagSpec::Literal(value) => Ok(*value),
        FlagSpec::DerivedFrom(specs) => {
            for spec in specs {
                let value = set.get(&spec.param)?;
                if !spec.is_satisfied_by(&value) {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

/// Evaluate one flag and write the result onto the descriptor
///
/// Writing a changed flag notifies the watch bus, which in turn drives the
/// bindings watching that flag.
pub fn recompute(set: &ParamSet, name: &str, flag: FlagKind) -> Result<()> {
    let value = evaluate(set, name, flag)?;
    set.set_flag(name, flag, value)
}

/// Owner of the engine's watch subscriptions on one parameter set
///
/// Returned by [`attach`]; dropping it (or calling
/// [`detach`](DependencyHandle::detach)) unsubscribes every recompute
/// callback.
#[derive(Debug)]
pub struct DependencyHandle {
    set: WeakParamSet,
    subscriptions: Vec<WatchId>,
}

impl DependencyHandle {
    /// Number of recompute subscriptions held.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Unsubscribe every recompute callback.
    pub fn detach(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(set) = self.set.upgrade() {
            for id in self.subscriptions.drain(..) {
                set.unwatch(id);
            }
        }
        self.subscriptions.clear();
    }
}

impl Drop for DependencyHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Wire dependency propagation for every descriptor of a set
///
/// Validates the dependency graph (referenced parameters must exist, no
/// cycles), subscribes a recompute callback for each (dependent flag,
/// referenced parameter) pair, then performs one immediate evaluation per
/// derived flag to establish initial state.
///
/// # Returns
///
/// A [`DependencyHandle`] owning the subscriptions, or a configuration
/// error for a malformed graph.
pub fn attach(set: &ParamSet) -> Result<DependencyHandle> {
    check_dependency_graph(set)?;

    let mut subscriptions = Vec::new();
    for name in set.names() {
        let descriptor = set.descriptor(&name)?;
        for flag in FlagKind::ALL {
            let spec = descriptor.flag_spec(flag);
            if !spec.is_derived() {
                continue;
            }
            let mut referenced: Vec<String> =
                spec.referenced_params().map(str::to_string).collect();
            referenced.sort();
            referenced.dedup();

            for reference in referenced {
                let weak = set.downgrade();
                let dependent = name.clone();
                let id = set.watch(&reference, ChangeKind::Value, move |_| {
                    match weak.upgrade() {
                        Some(set) => recompute(&set, &dependent, flag),
                        None => Ok(()),
                    }
                })?;
                subscriptions.push(id);
            }
        }
    }

    // Establish initial flag state
    for name in set.names() {
        let descriptor = set.descriptor(&name)?;
        for flag in FlagKind::ALL {
            if descriptor.flag_spec(flag).is_derived() {
                recompute(set, &name, flag)?;
            }
        }
    }

    tracing::debug!(
        subscriptions = subscriptions.len(),
        "dependency engine attached"
    );
    Ok(DependencyHandle {
        set: set.downgrade(),
        subscriptions,
    })
}

/// Reject unknown references and reference cycles between dependency lists.
fn check_dependency_graph(set: &ParamSet) -> Result<()> {
    let mut edges: HashMap<String, Vec<String>> = HashMap::new();
    for name in set.names() {
        let descriptor = set.descriptor(&name)?;
        let mut references = Vec::new();
        for flag in FlagKind::ALL {
            for reference in descriptor.flag_spec(flag).referenced_params() {
                if !set.contains(reference) {
                    return Err(ParamBindError::Configuration(format!(
                        "parameter '{}' depends on unknown parameter '{}'",
                        name, reference
                    )));
                }
                references.push(reference.to_string());
            }
        }
        edges.insert(name, references);
    }

    // Three-color depth-first search over the reference graph
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;

    fn visit(
        node: &str,
        edges: &HashMap<String, Vec<String>>,
        marks: &mut HashMap<String, u8>,
    ) -> std::result::Result<(), String> {
        match marks.get(node).copied().unwrap_or(WHITE) {
            GRAY => return Err(node.to_string()),
            BLACK => return Ok(()),
            _ => {}
        }
        marks.insert(node.to_string(), GRAY);
        if let Some(references) = edges.get(node) {
            for reference in references {
                visit(reference, edges, marks)?;
            }
        }
        marks.insert(node.to_string(), BLACK);
        Ok(())
    }

    let mut marks = HashMap::new();
    for node in edges.keys() {
        if let Err(cycle_node) = visit(node, &edges, &mut marks) {
            return Err(ParamBindError::Configuration(format!(
                "dependency cycle involving parameter '{}'",
                cycle_node
            )));
        }
    }
    Ok(())
}
