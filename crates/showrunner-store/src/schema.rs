//! Session store database schema.

/// Notification channel the session trigger publishes on.
pub const SESSION_CHANNEL: &str = "presentation_session_changes";

/// SQL to create the session table, seed its single row, and install the
/// change-notification trigger.
pub const CREATE_SESSION_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS presentation_session (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    current_beat    BIGINT NOT NULL DEFAULT -1,
    elapsed_seconds DOUBLE PRECISION,
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

INSERT INTO presentation_session (current_beat)
SELECT -1
WHERE NOT EXISTS (SELECT 1 FROM presentation_session);

CREATE OR REPLACE FUNCTION notify_presentation_session() RETURNS trigger AS $$
BEGIN
    PERFORM pg_notify('presentation_session_changes', row_to_json(NEW)::text);
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

DROP TRIGGER IF EXISTS presentation_session_notify ON presentation_session;
CREATE TRIGGER presentation_session_notify
    AFTER UPDATE ON presentation_session
    FOR EACH ROW EXECUTE FUNCTION notify_presentation_session();
";
