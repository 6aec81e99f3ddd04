//! Database schema initialization

use rusqlite::params;

use super::{Store, SCHEMA_VERSION};
use crate::core::error::Result;

impl Store {
    /// Initialize database schema
    pub(super) fn init_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Tenancy: homes and memberships
            CREATE TABLE IF NOT EXISTS homes (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS memberships (
                home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                identity_id TEXT NOT NULL,
                role TEXT NOT NULL,
                joined_at TEXT NOT NULL,
                PRIMARY KEY (home_id, identity_id)
            );
            CREATE INDEX IF NOT EXISTS idx_memberships_identity ON memberships(identity_id);

            -- Location tree (self-referential; subtree removal cascades)
            CREATE TABLE IF NOT EXISTS locations (
                id TEXT PRIMARY KEY,
                home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                kind TEXT NOT NULL,
                parent_id TEXT REFERENCES locations(id) ON DELETE CASCADE,
                name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_locations_home ON locations(home_id);
            CREATE INDEX IF NOT EXISTS idx_locations_parent ON locations(parent_id);

            -- Categories: name unique per home after Unicode lowercasing
            CREATE TABLE IF NOT EXISTS categories (
                id TEXT PRIMARY KEY,
                home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                name_norm TEXT NOT NULL,
                UNIQUE (home_id, name_norm)
            );
            CREATE INDEX IF NOT EXISTS idx_categories_home ON categories(home_id);

            -- Boxes: scan_token unique across ALL homes (scanned without
            -- tenant context)
            CREATE TABLE IF NOT EXISTS boxes (
                id TEXT PRIMARY KEY,
                home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                location_id TEXT REFERENCES locations(id) ON DELETE SET NULL,
                label TEXT NOT NULL,
                scan_token TEXT NOT NULL UNIQUE,
                notes TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_boxes_home ON boxes(home_id);
            CREATE INDEX IF NOT EXISTS idx_boxes_location ON boxes(location_id);

            -- Items: name unique per home after Unicode lowercasing
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                name_norm TEXT NOT NULL,
                category_id TEXT REFERENCES categories(id) ON DELETE SET NULL,
                UNIQUE (home_id, name_norm)
            );
            CREATE INDEX IF NOT EXISTS idx_items_home ON items(home_id);
            CREATE INDEX IF NOT EXISTS idx_items_category ON items(category_id);

            -- Instances: deliberately NO home column; the home derives
            -- through box_id
            CREATE TABLE IF NOT EXISTS instances (
                id TEXT PRIMARY KEY,
                item_id TEXT NOT NULL REFERENCES items(id) ON DELETE CASCADE,
                box_id TEXT NOT NULL REFERENCES boxes(id) ON DELETE CASCADE,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                status TEXT NOT NULL,
                sale_price REAL,
                notes TEXT,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_instances_item ON instances(item_id);
            CREATE INDEX IF NOT EXISTS idx_instances_box ON instances(box_id);

            -- Photos: polymorphic owner (kind + id, no foreign key)
            CREATE TABLE IF NOT EXISTS photos (
                id TEXT PRIMARY KEY,
                home_id TEXT NOT NULL REFERENCES homes(id) ON DELETE CASCADE,
                owner_type TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                locator TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_photos_home ON photos(home_id);
            CREATE INDEX IF NOT EXISTS idx_photos_owner ON photos(owner_type, owner_id);

            -- Audit trail: append-only, and intentionally no foreign key to
            -- homes so records survive tenant removal
            CREATE TABLE IF NOT EXISTS audit_log (
                id TEXT PRIMARY KEY,
                home_id TEXT,
                actor TEXT,
                action TEXT NOT NULL,
                entity_kind TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                before_image TEXT,
                after_image TEXT,
                recorded_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_audit_home ON audit_log(home_id);
            CREATE INDEX IF NOT EXISTS idx_audit_entity ON audit_log(entity_kind, entity_id);
            "#,
        )?;

        self.conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
