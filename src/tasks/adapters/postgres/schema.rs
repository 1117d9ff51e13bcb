//! Diesel schema for durable task storage.

diesel::table! {
    /// Task records mirrored from the remote source.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        title -> Text,
        /// Task description.
        description -> Text,
        /// Completion flag.
        completed -> Bool,
    }
}
