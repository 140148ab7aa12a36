/// Type alias for sets, we use this to hide which type of set we are actually
/// using. The learner relies on insertion order being preserved, which is
/// exactly what an [`indexmap::IndexSet`] provides.
pub type Set<S> = indexmap::IndexSet<S>;

/// Type alias for maps, we use this to hide which type of map we are actually
/// using. Iteration follows insertion order.
pub type Map<K, V> = indexmap::IndexMap<K, V>;
