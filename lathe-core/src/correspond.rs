//! Type correspondence: recover type-variable bindings at a call site.
//!
//! Given a concrete type (usually the tuple of actual argument types) and a
//! skeleton of the same shape whose monotype leaves name type variables, walk
//! both trees in lockstep and record which concrete subtree sits under each
//! variable. Shapes are guaranteed to agree by type checking, so the walk never
//! backtracks; a disagreement is a type-shape violation.
//!
//! Example:
//!   skeleton: ([a], (a, b) -> b)
//!   concrete: ([Float32], (Float32, Int32) -> Int32)
//!   result:   { a: Float32, b: Int32 }

use crate::error::Result;
use crate::types::Type;
use crate::bail_type_shape;
use indexmap::IndexMap;
use log::{debug, warn};

/// Variable name to concrete type, in order of first occurrence.
pub type TypeMap = IndexMap<String, Type>;

/// Match `concrete` against `skeleton` and return the variable bindings.
///
/// When a variable occurs more than once the last occurrence wins.
pub fn correspond(concrete: &Type, skeleton: &Type) -> Result<TypeMap> {
    let mut bindings = TypeMap::new();
    correspond_into(concrete, skeleton, &mut bindings)?;
    Ok(bindings)
}

/// Like [`correspond`], accumulating into an existing map.
pub fn correspond_into(concrete: &Type, skeleton: &Type, bindings: &mut TypeMap) -> Result<()> {
    match skeleton {
        Type::Monotype(var) => {
            debug!("Correspondence found {}: {}", var, concrete);
            if let Some(previous) = bindings.get(var) {
                if previous != concrete {
                    warn!(
                        "Type variable {} bound to both {} and {}; keeping {}",
                        var, previous, concrete, concrete
                    );
                }
            }
            bindings.insert(var.clone(), concrete.clone());
            Ok(())
        }
        Type::Polytype { .. } => {
            bail_type_shape!("Polytype {} may not appear nested inside a type", skeleton)
        }
        Type::Sequence(skeleton_elem) => match concrete {
            Type::Sequence(concrete_elem) => correspond_into(concrete_elem, skeleton_elem, bindings),
            _ => bail_type_shape!("Expected a sequence matching {}, found {}", skeleton, concrete),
        },
        Type::Tuple(skeleton_elems) => match concrete {
            Type::Tuple(concrete_elems) => correspond_all(concrete_elems, skeleton_elems, bindings),
            _ => bail_type_shape!("Expected a tuple matching {}, found {}", skeleton, concrete),
        },
        Type::Fn { args, result } => {
            // A polymorphic function passed as an argument is matched through
            // its body.
            let concrete = match concrete {
                Type::Polytype { body, .. } => body.as_ref(),
                other => other,
            };
            match concrete {
                Type::Fn {
                    args: concrete_args,
                    result: concrete_result,
                } => {
                    correspond_all(concrete_args, args, bindings)?;
                    correspond_into(concrete_result, result, bindings)
                }
                _ => bail_type_shape!("Expected a function matching {}, found {}", skeleton, concrete),
            }
        }
    }
}

fn correspond_all(concrete: &[Type], skeleton: &[Type], bindings: &mut TypeMap) -> Result<()> {
    if concrete.len() != skeleton.len() {
        bail_type_shape!(
            "Tuple length mismatch: skeleton has {} elements, concrete type has {}",
            skeleton.len(),
            concrete.len()
        );
    }
    for (c, s) in concrete.iter().zip(skeleton) {
        correspond_into(c, s, bindings)?;
    }
    Ok(())
}
