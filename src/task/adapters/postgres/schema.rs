//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Title, unique across all tasks.
        #[max_length = 255]
        title -> Varchar,
        /// Free-form description.
        description -> Text,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Durable queue of lifecycle events awaiting notification.
    task_events (id) {
        /// Monotonic sequence number.
        id -> Int8,
        /// Serialized lifecycle event.
        payload -> Jsonb,
        /// Earliest time the event may be claimed.
        available_at -> Timestamptz,
        /// Enqueue timestamp.
        created_at -> Timestamptz,
    }
}
