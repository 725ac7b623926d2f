use chrono::{NaiveDate, Utc};
use sea_orm::*;

use crate::models::building::CreateBuildingRequest;
use crate::models::floor::CreateFloorRequest;
use crate::models::room::CreateRoomRequest;
use crate::models::student::CreateStudentRequest;
use crate::models::{building, live};

/// One building, two floors, a handful of rooms and students.
/// Does nothing when any building already exists.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if live::<building::Entity>().count(db).await? > 0 {
        tracing::info!("Database already has buildings, skipping demo data");
        return Ok(());
    }

    let now = Utc::now();
    let txn = db.begin().await?;

    let building = CreateBuildingRequest {
        name: "Building A".to_owned(),
        address: "1 Campus Road, District 1".to_owned(),
        total_floors: 2,
        description: Some("Demo dormitory building".to_owned()),
    }
    .into_active_model(now)
    .insert(&txn)
    .await?;

    // (room number, capacity, rent, type, air conditioning)
    let layout: [(i32, &[(&str, i32, f64, &str, bool)]); 2] = [
        (
            1,
            &[
                ("101", 1, 1_500_000.0, "Single", false),
                ("102", 2, 2_000_000.0, "Double", true),
                ("103", 4, 3_200_000.0, "Quad", false),
            ],
        ),
        (
            2,
            &[
                ("201", 2, 2_200_000.0, "Double", true),
                ("202", 3, 2_700_000.0, "Triple", true),
            ],
        ),
    ];

    for (floor_number, rooms) in layout {
        let floor = CreateFloorRequest {
            floor_number,
            building_id: building.id,
            description: Some(format!("Floor {}", floor_number)),
        }
        .into_active_model(now)
        .insert(&txn)
        .await?;

        for (room_number, capacity, rent_price, room_type, air) in rooms.iter().copied() {
            CreateRoomRequest {
                room_number: room_number.to_owned(),
                floor_id: floor.id,
                capacity,
                rent_price,
                room_type: Some(room_type.to_owned()),
                has_air_conditioner: air,
                has_water_heater: true,
            }
            .into_active_model(now)
            .insert(&txn)
            .await?;
        }
    }

    let students = [
        ("SV001", "Nguyen Van An", "an.nguyen@example.edu", (2003, 4, 12)),
        ("SV002", "Tran Thi Binh", "binh.tran@example.edu", (2004, 9, 2)),
        ("SV003", "Le Hoang Cuong", "cuong.le@example.edu", (2002, 12, 30)),
    ];
    for (code, name, email, (y, m, d)) in students {
        CreateStudentRequest {
            student_code: code.to_owned(),
            full_name: name.to_owned(),
            email: email.to_owned(),
            phone_number: None,
            date_of_birth: NaiveDate::from_ymd_opt(y, m, d),
            id_card_number: None,
            address: None,
            guardian: None,
            guardian_phone: None,
            profile_image: None,
        }
        .into_active_model(now)
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    tracing::info!("Demo data seeded: 1 building, 2 floors, 5 rooms, 3 students");
    Ok(())
}
