//! Fixed names shared with the serializer and the generated runtime.
//!
//! Everything in this module is part of the output contract: the serializer
//! and the runtime headers spell these names the same way, so they must not
//! change independently.

/// Implementation names of the builtin scalar types, keyed by source name.
pub const SCALAR_TYPES: [(&str, &str); 8] = [
    ("Int32", "int32"),
    ("Int64", "int64"),
    ("Uint32", "uint32"),
    ("Uint64", "uint64"),
    ("Float32", "float32"),
    ("Float64", "float64"),
    ("Bool", "bool"),
    ("Void", "void"),
];

/// Name of the typedef every function object exports for its result type.
pub const RESULT_TYPE: &str = "result_type";

/// Name of the call operator synthesized inside each function object.
pub const CALL_OPERATOR: &str = "operator()";

/// Owning container type accepted by the wrapped entry point.
pub const CONTAINER_TYPE: &str = "sp_cuarray_var";

/// Runtime factory that derives a view from a container.
pub const MAKE_SEQUENCE: &str = "make_sequence";

pub const TRANSFORMED_SEQUENCE: &str = "transformed_sequence";

pub const INDEX_SEQUENCE: &str = "index_sequence";

pub const TUPLE_TEMPLATE: &str = "thrust::tuple";

/// Largest `mapN` arity the runtime provides.
pub const MAX_MAP_ARITY: usize = 10;

pub fn scalar_ctype_name(source: &str) -> Option<&'static str> {
    SCALAR_TYPES
        .iter()
        .find(|(src, _)| *src == source)
        .map(|(_, imp)| *imp)
}

/// Name of the function-object type generated for procedure `id`.
///
/// Procedure identifiers coming from the front end never start with `fn_`,
/// which keeps generated names disjoint from user names.
pub fn fnize_id(id: &str) -> String {
    format!("fn_{}", id)
}

/// Internal name given to a compiler-demoted procedure.
pub fn mark_generated_id(id: &str) -> String {
    format!("_{}", id)
}

/// Type parameter name standing for the element type of sequence `id`.
pub fn typify(id: &str) -> String {
    format!("T{}", id)
}

/// Name of the view derived from container argument `id`.
pub fn view_id(id: &str) -> String {
    format!("view_{}", id)
}

/// Closure tag for a closure capturing `arity` values.
pub fn closure_tag(arity: usize) -> String {
    format!("closure{}", arity)
}

/// Arity encoded in a `mapN` callee name, if it is one the runtime supports.
pub fn map_arity(callee: &str) -> Option<usize> {
    let digits = callee.strip_prefix("map")?;
    (1..=MAX_MAP_ARITY).find(|n| digits == n.to_string())
}
