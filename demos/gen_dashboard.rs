//! Generate a dashboard snapshot for validation testing

fn main() {
    let habits = r#"[
        { "id": 1, "name": "Read", "description": "20 pages", "current_streak": 4, "created_at": "2024-01-01T08:00:00Z" },
        { "id": 2, "name": "Run", "description": "", "current_streak": 0, "created_at": "2024-01-03T08:00:00Z" },
        { "id": 3, "name": "Meditate", "current_streak": 12, "created_at": "2023-12-20T08:00:00Z" }
    ]"#;

    let checkins = r#"[
        { "id": 101, "habit": 1, "date": "2024-01-17", "created_at": "2024-01-17T07:10:00Z" },
        { "id": 102, "habit": 3, "date": "2024-01-17", "created_at": "2024-01-17T06:30:00Z" },
        { "id": 103, "habit": 1, "date": "2024-01-16", "created_at": "2024-01-16T07:05:00Z" },
        { "id": 104, "habit": 2, "date": "2024-01-10", "created_at": "2024-01-10T18:45:00Z" },
        { "id": 105, "habit": 3, "date": "2023-11-02", "created_at": "2023-11-02T06:20:00Z" }
    ]"#;

    match habit_heat::habits_to_dashboard(habits.to_string(), checkins.to_string(), "2024-01-17".to_string()) {
        Ok(snapshot) => print!("{snapshot}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
