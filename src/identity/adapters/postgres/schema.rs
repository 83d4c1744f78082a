//! Diesel schema for identity persistence.

diesel::table! {
    /// Registered user accounts.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Lower-cased login email.
        #[max_length = 255]
        email -> Varchar,
        /// Salted password digest.
        #[max_length = 255]
        password_hash -> Varchar,
        /// Role name; NULL means a standard user.
        #[max_length = 50]
        role -> Nullable<Varchar>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Digests of issued bearer tokens.
    access_tokens (digest) {
        /// Hex SHA-256 digest of the plaintext token.
        #[max_length = 64]
        digest -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// Issue timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(access_tokens -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(users, access_tokens);
