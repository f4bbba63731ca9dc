pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    role TEXT NOT NULL CHECK (role IN ('manager', 'employee')),
    manager_id INTEGER REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    manager_id INTEGER NOT NULL REFERENCES users(id),
    employee_id INTEGER NOT NULL REFERENCES users(id),
    strengths TEXT NOT NULL,
    areas_to_improve TEXT NOT NULL,
    sentiment TEXT NOT NULL CHECK (sentiment IN ('positive', 'neutral', 'negative')),
    acknowledged INTEGER NOT NULL DEFAULT 0,
    tags JSON NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Replies are removed by walking parent_id explicitly, so the self-reference
-- carries no ON DELETE action.
CREATE TABLE IF NOT EXISTS feedback_comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    feedback_id INTEGER NOT NULL REFERENCES feedback(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id),
    comment_text TEXT NOT NULL,
    parent_id INTEGER REFERENCES feedback_comments(id),
    likes INTEGER NOT NULL DEFAULT 0 CHECK (likes >= 0),
    liked_by JSON NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feedback_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_id INTEGER NOT NULL REFERENCES users(id),
    manager_id INTEGER NOT NULL REFERENCES users(id),
    message TEXT,
    status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'completed', 'declined')),
    created_at TEXT NOT NULL,
    completed_at TEXT,
    CHECK ((status = 'completed') = (completed_at IS NOT NULL))
);

CREATE INDEX IF NOT EXISTS idx_users_manager ON users(manager_id);
CREATE INDEX IF NOT EXISTS idx_feedback_manager ON feedback(manager_id);
CREATE INDEX IF NOT EXISTS idx_feedback_employee ON feedback(employee_id);
CREATE INDEX IF NOT EXISTS idx_comments_feedback ON feedback_comments(feedback_id);
CREATE INDEX IF NOT EXISTS idx_comments_parent ON feedback_comments(parent_id);
CREATE INDEX IF NOT EXISTS idx_requests_employee ON feedback_requests(employee_id);
CREATE INDEX IF NOT EXISTS idx_requests_manager ON feedback_requests(manager_id);
"#;
