//! Database schema migrations for schedauth.
//!
//! Each entry is applied once, in order, inside its own transaction. The
//! applied version is recorded in the `schema_version` table.

/// Ordered list of schema migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and roles
    r#"
CREATE TABLE users (
    user_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username         TEXT NOT NULL,
    email            TEXT NOT NULL,
    fname            TEXT NOT NULL DEFAULT '',
    lname            TEXT NOT NULL DEFAULT '',
    timezone         TEXT NOT NULL DEFAULT 'UTC',
    homepage_id      INTEGER NOT NULL DEFAULT 1,
    password         TEXT,
    legacy_password  TEXT,
    salt             TEXT NOT NULL,
    last_login       TEXT,
    created_at       TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE UNIQUE INDEX idx_users_username_nocase ON users(username COLLATE NOCASE);
CREATE UNIQUE INDEX idx_users_email_nocase ON users(email COLLATE NOCASE);

CREATE TABLE roles (
    role_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    role_level  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE user_roles (
    user_id  INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    role_id  INTEGER NOT NULL REFERENCES roles(role_id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, role_id)
);
"#,
    // v2: resources, groups and custom attribute values
    r#"
CREATE TABLE resources (
    resource_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL,
    schedule_id       INTEGER NOT NULL,
    resource_type_id  INTEGER,
    max_participants  INTEGER,
    sort_order        INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_resources_schedule ON resources(schedule_id);

CREATE TABLE resource_groups (
    resource_group_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    name               TEXT NOT NULL,
    parent_id          INTEGER REFERENCES resource_groups(resource_group_id) ON DELETE CASCADE
);

CREATE TABLE resource_group_assignment (
    resource_group_id  INTEGER NOT NULL REFERENCES resource_groups(resource_group_id) ON DELETE CASCADE,
    resource_id        INTEGER NOT NULL REFERENCES resources(resource_id) ON DELETE CASCADE,
    PRIMARY KEY (resource_group_id, resource_id)
);

CREATE TABLE custom_attribute_values (
    custom_attribute_id  INTEGER NOT NULL,
    attribute_category   INTEGER NOT NULL,
    entity_id            INTEGER NOT NULL,
    attribute_value      TEXT NOT NULL,
    PRIMARY KEY (custom_attribute_id, attribute_category, entity_id)
);

CREATE INDEX idx_custom_attribute_values_entity
    ON custom_attribute_values(attribute_category, entity_id);
"#,
];
