//! Small shared aliases. Namespaces and type field-maps both need an
//! insertion-ordered map (`spec.md` §3: "ordered mapping of label →
//! Variable"; "fields-map"); we pin [`indexmap::IndexMap`] to the `ahash`
//! hasher the way the grounding repo's hot interned-string maps do, rather
//! than the slower default `SipHash` std map.

pub type OrderedMap<K, V> = indexmap::IndexMap<K, V, ahash::RandomState>;
