pub(crate) enum RemoveResult<T> {
    /// The key wasn't found so nothing was removed.
    NotFound,
    /// The Node returning this matched the key and has no children. Its parent must detach it
    /// and take its key.
    RemoveSelf,
    /// A node below (or at) the one returning this was removed, yielding its key `T`.
    Removed(T),
}
