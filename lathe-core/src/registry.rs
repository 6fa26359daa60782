//! Declared procedure signatures, built once upstream and read-only afterwards.

use crate::types::Type;
use indexmap::IndexMap;

/// Registry key: a procedure name plus its arity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FnKey {
    pub name: String,
    pub arity: usize,
}

impl FnKey {
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        FnKey {
            name: name.into(),
            arity,
        }
    }
}

/// Declared type of a registered procedure: a `Fn`, possibly under a polytype.
#[derive(Debug, Clone, PartialEq)]
pub struct FnInfo {
    pub ty: Type,
}

/// Procedure registry.
///
/// Iteration follows insertion order so every pass that walks it behaves
/// deterministically.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    fns: IndexMap<FnKey, FnInfo>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &FnKey) -> Option<&FnInfo> {
        self.fns.get(key)
    }

    pub fn lookup(&self, name: &str, arity: usize) -> Option<&FnInfo> {
        self.fns.get(&FnKey::new(name, arity))
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.fns.keys().any(|k| k.name == name)
    }

    /// Registered names, first occurrence order, without duplicates across arities.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let mut seen = indexmap::IndexSet::new();
        for key in self.fns.keys() {
            seen.insert(key.name.as_str());
        }
        seen.into_iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FnKey, &FnInfo)> {
        self.fns.iter()
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}

impl FromIterator<(FnKey, FnInfo)> for Registry {
    fn from_iter<T: IntoIterator<Item = (FnKey, FnInfo)>>(iter: T) -> Self {
        Registry {
            fns: iter.into_iter().collect(),
        }
    }
}

/// Build a registry from `(name, type)` pairs, deriving each arity from the
/// declared function type. Non-function types register with arity zero.
impl<S: Into<String>> FromIterator<(S, Type)> for Registry {
    fn from_iter<T: IntoIterator<Item = (S, Type)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(name, ty)| {
                let arity = ty.as_fn().map(|(args, _)| args.len()).unwrap_or(0);
                (FnKey::new(name, arity), FnInfo { ty })
            })
            .collect()
    }
}
