#![allow(dead_code)]

use hostelbyte::store::memory::InMemoryStore;
use hostelbyte_core::CredentialHasher;
use hostelbyte_models::{CreateStudentDto, Room};

/// Low bcrypt cost keeps hashing out of the test wall time.
pub fn test_hasher() -> CredentialHasher {
    CredentialHasher::with_cost(4)
}

pub fn store_with_rooms(rooms: &[(&str, i32)]) -> InMemoryStore {
    let store = InMemoryStore::new();
    for (number, capacity) in rooms {
        store.seed_room(number, *capacity).unwrap();
    }
    store
}

pub fn student_dto(roll_no: &str, room_no: &str) -> CreateStudentDto {
    CreateStudentDto {
        name: format!("Student {}", roll_no),
        roll_no: roll_no.to_string(),
        email: format!("{}@college.test", roll_no.to_lowercase()),
        room_no: room_no.to_string(),
        phone: None,
        gender: None,
        dob: None,
        address: None,
        guardian_name: None,
        guardian_phone: None,
        department: Some("Computer Science".to_string()),
        year: Some(1),
    }
}

pub fn occupancy(store: &InMemoryStore, room_number: &str) -> i32 {
    store
        .room(room_number)
        .map(|room| room.current_occupancy)
        .unwrap_or_else(|| panic!("room {} missing", room_number))
}

/// Every room's counter equals the students assigned to it and stays within capacity.
pub fn assert_occupancy_consistent(store: &InMemoryStore) {
    for Room {
        room_number,
        capacity,
        current_occupancy,
        ..
    } in store.rooms()
    {
        assert_eq!(
            current_occupancy,
            store.count_in_room(&room_number),
            "occupancy drift in room {}",
            room_number
        );
        assert!(current_occupancy >= 0 && current_occupancy <= capacity);
    }
}

pub fn csv(lines: &[&str]) -> Vec<u8> {
    let mut out = String::from("name,roll_no,email,room_no,department,year\n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.into_bytes()
}
