// SQL query constants for repositories
// Single source of truth for the event projection shared by reads and writes

/// SQL query fragments and statements for the events table
pub mod event_queries {
    use lazy_static::lazy_static;

    /// Event read model over `<source> evt LEFT JOIN publishers pub`
    ///
    /// Column names and order match `EventRow`. The stored geography is cast
    /// to geometry so that Y (latitude) and X (longitude) come back as two
    /// floats.
    pub const SELECT_COLUMNS: &str = r#"evt.id,
        ST_Y(evt.location::geometry) AS latitude,
        ST_X(evt.location::geometry) AS longitude,
        evt.address,
        evt.locale,
        evt.title,
        evt.description,
        evt.slug,
        evt.tags,
        evt.publisher_id,
        pub.display_name AS publisher_display_name,
        pub.display_image AS publisher_display_image,
        evt.created_at,
        evt.updated_at"#;

    /// Optional publisher projection
    pub const PUBLISHER_JOIN: &str = "LEFT JOIN publishers pub ON (evt.publisher_id = pub.id)";

    /// WGS-84 geography point from `(longitude, latitude)` bound at `$1`, `$2`
    pub const POINT_FROM_LNG_LAT: &str =
        "ST_SetSRID(ST_MakePoint($1::float8, $2::float8), 4326)::geography";

    pub const DELETE_BY_ID: &str = "DELETE FROM events WHERE id = $1";

    lazy_static! {
        /// Binds: `$1` longitude, `$2` latitude, `$3` radius (m), `$4` limit, `$5` offset
        pub static ref SEARCH_NEARBY: String = format!(
            r#"SELECT {SELECT_COLUMNS}
            FROM events evt
            {PUBLISHER_JOIN}
            WHERE ST_Distance(evt.location, {POINT_FROM_LNG_LAT}) < $3::float8
            ORDER BY evt.created_at, evt.id
            LIMIT $4::bigint OFFSET $5::bigint"#
        );

        /// Insert and read back through the search projection in one statement
        ///
        /// Binds: `$1` longitude, `$2` latitude, `$3` id, `$4` address,
        /// `$5` locale, `$6` title, `$7` description, `$8` slug, `$9` tags,
        /// `$10` publisher_id, `$11` created_at, `$12` updated_at
        pub static ref INSERT_RETURNING: String = format!(
            r#"WITH evt AS (
                INSERT INTO events (
                    id, location, address, locale, title, description,
                    slug, tags, publisher_id, created_at, updated_at
                )
                VALUES ($3, {POINT_FROM_LNG_LAT}, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                RETURNING *
            )
            SELECT {SELECT_COLUMNS}
            FROM evt
            {PUBLISHER_JOIN}"#
        );
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_projection_matches_row_fields() {
            let expected = [
                "id",
                "latitude",
                "longitude",
                "address",
                "locale",
                "title",
                "description",
                "slug",
                "tags",
                "publisher_id",
                "publisher_display_name",
                "publisher_display_image",
                "created_at",
                "updated_at",
            ];
            let columns: Vec<String> = SELECT_COLUMNS
                .split(',')
                .map(|col| {
                    let col = col.trim();
                    let name = col.rsplit(" AS ").next().unwrap_or(col);
                    name.trim_start_matches("evt.").to_string()
                })
                .collect();
            assert_eq!(columns, expected);
        }

        #[test]
        fn test_search_binds_longitude_before_latitude() {
            assert!(SEARCH_NEARBY.contains("ST_MakePoint($1::float8, $2::float8)"));
            assert!(SEARCH_NEARBY.contains("< $3::float8"));
            assert!(SEARCH_NEARBY.contains("LIMIT $4::bigint OFFSET $5::bigint"));
        }

        #[test]
        fn test_insert_uses_shared_projection() {
            assert!(INSERT_RETURNING.contains(SELECT_COLUMNS));
            assert!(INSERT_RETURNING.contains(PUBLISHER_JOIN));
            assert!(INSERT_RETURNING.contains("$12"));
        }
    }
}
