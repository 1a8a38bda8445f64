/// BlackwoodError enumerates over all possible errors that this package
/// shall return.
#[derive(Debug, PartialEq)]
pub enum BlackwoodError {
    /// Returned by insert() when no key was supplied.
    InvalidKey,
    /// Fatal case, the root of a non-empty tree is red.
    RedRoot,
    /// Fatal case, a red node has a red child.
    ConsecutiveReds,
    /// Fatal case, two sibling subtrees disagree on their black count.
    /// The String component of this variant can be used for debugging.
    UnbalancedBlacks(String),
    /// Fatal case, tree entries are not in sort-order.
    SortError,
}
