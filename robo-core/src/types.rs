/// Identifier for a node in a [`crate::figure::Figure`].
///
/// This is an index into `Figure::nodes`, and is only meaningful within
/// the lifetime of a given `Figure` instance. The root is always `0`.
pub type NodeId = usize;

/// Identifier of the root node of every generated figure.
pub const ROOT: NodeId = 0;
