//! Esquema Diesel. Reemplazable con `diesel print-schema`.

diesel::table! {
    flow_sessions (session_id) {
        session_id -> Text,
        experiment_group -> Text,
        state -> Jsonb,
        updated_at -> Timestamptz,
    }
}
