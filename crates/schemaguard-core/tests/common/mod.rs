use schemaguard_core::Schema;

/// The incident-tracking schema the pipeline scenarios run against.
pub const INCIDENT_SCHEMA: &str = r#"{
    "tables": [
        {
            "table_name": "users",
            "description": "People who can report incidents",
            "columns": {
                "user_id": "Primary key",
                "name": "Full name"
            }
        },
        {
            "table_name": "incidents",
            "description": "Reported incidents",
            "columns": {
                "incident_id": "Primary key",
                "user_id": "Reporting user",
                "status": "open or closed"
            }
        }
    ]
}"#;

pub fn incident_schema() -> Schema {
    Schema::from_json_str(INCIDENT_SCHEMA).expect("fixture schema is valid")
}
