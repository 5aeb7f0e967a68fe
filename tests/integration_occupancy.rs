mod common;

use common::{
    assert_occupancy_consistent, csv, occupancy, store_with_rooms, student_dto, test_hasher,
};
use hostelbyte::error::{ErrorKind, HostelError};
use hostelbyte::modules::rooms::service::RoomService;
use hostelbyte::modules::students::import::import_students;
use hostelbyte::modules::students::service::StudentService;
use hostelbyte::utils::email::EmailService;
use hostelbyte::utils::notifier::{FailingNotifier, RecordingNotifier};
use hostelbyte_config::EmailConfig;
use hostelbyte_models::UpdateStudentDto;

fn smtp_disabled() -> EmailConfig {
    EmailConfig {
        enabled: false,
        smtp_host: "localhost".to_string(),
        smtp_port: 1025,
        smtp_username: String::new(),
        smtp_password: String::new(),
        from_email: "noreply@hostelbyte.local".to_string(),
        from_name: "Hostel Administration".to_string(),
    }
}

#[tokio::test]
async fn test_second_enrollment_into_full_room_is_rejected() {
    let store = store_with_rooms(&[("A-1", 1)]);
    let notifier = RecordingNotifier::new();

    StudentService::enroll(&store, &test_hasher(), &notifier, student_dto("CS-1", "A-1"))
        .await
        .unwrap();
    assert_eq!(occupancy(&store, "A-1"), 1);

    let err = StudentService::enroll(&store, &test_hasher(), &notifier, student_dto("CS-2", "A-1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.to_string(), "Room \"A-1\" is full.");
    assert_eq!(occupancy(&store, "A-1"), 1);
    assert!(store.student_by_roll("CS-2").is_none());
    assert_eq!(notifier.sent().len(), 1);
    assert_occupancy_consistent(&store);
}

#[tokio::test]
async fn test_batch_overflowing_empty_room_reports_row_and_persists_nothing() {
    let store = store_with_rooms(&[("B-2", 1)]);
    let notifier = RecordingNotifier::new();
    let file = csv(&[
        "Asha,CS-1,asha@college.test,B-2,CSE,1",
        "Bilal,CS-2,bilal@college.test,B-2,CSE,1",
    ]);

    let err = import_students(&store, &test_hasher(), Some(&notifier), &file)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Row 3: Room \"B-2\" is full.");
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(occupancy(&store, "B-2"), 0);
    assert!(store.students().is_empty());
    assert_occupancy_consistent(&store);
}

#[tokio::test]
async fn test_batch_fills_rooms_and_reports_allocations() {
    let store = store_with_rooms(&[("A-1", 2), ("A-2", 1)]);
    let notifier = RecordingNotifier::new();
    let file = csv(&[
        "Asha,CS-1,asha@college.test,A-1,CSE,1",
        "Bilal,CS-2,bilal@college.test,A-2,CSE,2",
        "Chen,CS-3,chen@college.test,A-1,ECE,3",
    ]);

    let summary = import_students(&store, &test_hasher(), Some(&notifier), &file)
        .await
        .unwrap();

    assert_eq!(summary.imported, 3);
    let allocations: Vec<(String, i32)> = summary
        .rooms
        .iter()
        .map(|a| (a.room_number.clone(), a.added))
        .collect();
    assert_eq!(
        allocations,
        vec![("A-1".to_string(), 2), ("A-2".to_string(), 1)]
    );
    assert_eq!(occupancy(&store, "A-1"), 2);
    assert_eq!(occupancy(&store, "A-2"), 1);
    assert_eq!(notifier.sent().len(), 3);
    assert_occupancy_consistent(&store);
}

#[tokio::test]
async fn test_batch_respects_existing_occupancy() {
    let store = store_with_rooms(&[("A-1", 2)]);
    StudentService::enroll(
        &store,
        &test_hasher(),
        &RecordingNotifier::new(),
        student_dto("CS-0", "A-1"),
    )
    .await
    .unwrap();

    let file = csv(&[
        "Asha,CS-1,asha@college.test,A-1,CSE,1",
        "Bilal,CS-2,bilal@college.test,A-1,CSE,1",
    ]);
    let err = import_students(&store, &test_hasher(), None, &file)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Row 3: Room \"A-1\" is full.");
    assert_eq!(occupancy(&store, "A-1"), 1);
    assert_eq!(store.students().len(), 1);
}

#[tokio::test]
async fn test_batch_unknown_room_and_duplicate_roll_abort() {
    let store = store_with_rooms(&[("A-1", 5)]);

    let unknown = csv(&["Asha,CS-1,asha@college.test,Z-9,CSE,1"]);
    let err = import_students(&store, &test_hasher(), None, &unknown)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Row 2: Room \"Z-9\" not found.");
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let duplicate = csv(&[
        "Asha,CS-1,asha@college.test,A-1,CSE,1",
        "Asha Again,CS-1,asha2@college.test,A-1,CSE,1",
    ]);
    let err = import_students(&store, &test_hasher(), None, &duplicate)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HostelError::Row { row: 3, ref source } if matches!(**source, HostelError::DuplicateStudent)
    ));
    assert!(store.students().is_empty());
    assert_eq!(occupancy(&store, "A-1"), 0);
}

#[tokio::test]
async fn test_batch_rejects_missing_fields_and_empty_file() {
    let store = store_with_rooms(&[("A-1", 5)]);

    let missing = csv(&["Asha,CS-1,,A-1,CSE,1"]);
    let err = import_students(&store, &test_hasher(), None, &missing)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Row 2: Missing required fields (name, roll_no, email, room_no)."
    );
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = import_students(&store, &test_hasher(), None, &csv(&[]))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "CSV file is empty or invalid.");
}

#[tokio::test]
async fn test_batch_rejects_malformed_email_row() {
    let store = store_with_rooms(&[("A-1", 5)]);
    let file = csv(&[
        "Asha,CS-1,asha@college.test,A-1,CSE,1",
        "Bilal,CS-2,not-an-email,A-1,CSE,1",
    ]);

    let err = import_students(&store, &test_hasher(), None, &file)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Row 3: A valid email is required");
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(store.students().is_empty());
    assert_eq!(occupancy(&store, "A-1"), 0);
}

#[tokio::test]
async fn test_batch_delivery_failure_rolls_back_earlier_rows() {
    let store = store_with_rooms(&[("A-1", 3)]);
    let notifier = FailingNotifier::after(1);
    let file = csv(&[
        "Asha,CS-1,asha@college.test,A-1,CSE,1",
        "Bilal,CS-2,bilal@college.test,A-1,CSE,1",
    ]);

    let err = import_students(&store, &test_hasher(), Some(&notifier), &file)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(err.to_string().starts_with("Row 3: "));
    assert!(store.students().is_empty());
    assert_eq!(occupancy(&store, "A-1"), 0);
}

#[tokio::test]
async fn test_move_transfers_one_seat_atomically() {
    let store = store_with_rooms(&[("A-1", 2), ("A-2", 2)]);
    let student = StudentService::enroll(
        &store,
        &test_hasher(),
        &RecordingNotifier::new(),
        student_dto("CS-1", "A-1"),
    )
    .await
    .unwrap();

    let moved = StudentService::update(
        &store,
        &test_hasher(),
        student.id,
        UpdateStudentDto {
            room_no: Some("A-2".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.room_no.as_deref(), Some("A-2"));
    assert_eq!(occupancy(&store, "A-1"), 0);
    assert_eq!(occupancy(&store, "A-2"), 1);
    assert_occupancy_consistent(&store);
}

#[tokio::test]
async fn test_move_to_unknown_room_changes_nothing() {
    let store = store_with_rooms(&[("A-1", 2)]);
    let student = StudentService::enroll(
        &store,
        &test_hasher(),
        &RecordingNotifier::new(),
        student_dto("CS-1", "A-1"),
    )
    .await
    .unwrap();

    let err = StudentService::update(
        &store,
        &test_hasher(),
        student.id,
        UpdateStudentDto {
            room_no: Some("Z-9".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(occupancy(&store, "A-1"), 1);
    let unchanged = StudentService::get(&store, student.id).await.unwrap();
    assert_eq!(unchanged.room_no.as_deref(), Some("A-1"));
}

#[tokio::test]
async fn test_deleting_last_student_frees_room_for_deletion() {
    let store = store_with_rooms(&[("A-1", 1)]);
    let student = StudentService::enroll(
        &store,
        &test_hasher(),
        &RecordingNotifier::new(),
        student_dto("CS-1", "A-1"),
    )
    .await
    .unwrap();
    let room_id = store.room("A-1").unwrap().id;

    let err = RoomService::delete(&store, room_id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete room. It is currently occupied by 1 student(s)."
    );

    StudentService::delete(&store, student.id).await.unwrap();
    assert_eq!(occupancy(&store, "A-1"), 0);

    RoomService::delete(&store, room_id).await.unwrap();
    assert!(store.room("A-1").is_none());
}

#[tokio::test]
async fn test_notification_failure_leaves_no_student() {
    let store = store_with_rooms(&[("A-1", 1)]);

    let err = StudentService::enroll(
        &store,
        &test_hasher(),
        &FailingNotifier::new(),
        student_dto("CS-1", "A-1"),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(store.student_by_roll("CS-1").is_none());
    assert_eq!(occupancy(&store, "A-1"), 0);
}

#[tokio::test]
async fn test_enrollment_with_smtp_disabled_rolls_back() {
    let store = store_with_rooms(&[("A-1", 1)]);
    let mailer = EmailService::new(smtp_disabled());

    let err = StudentService::enroll(&store, &test_hasher(), &mailer, student_dto("CS-1", "A-1"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(store.student_by_roll("CS-1").is_none());
    assert_eq!(occupancy(&store, "A-1"), 0);
}

#[tokio::test]
async fn test_batch_with_smtp_disabled_imports_only_without_notification() {
    let store = store_with_rooms(&[("A-1", 2)]);
    let mailer = EmailService::new(smtp_disabled());
    let file = csv(&["Asha,CS-1,asha@college.test,A-1,CSE,1"]);

    let err = import_students(&store, &test_hasher(), Some(&mailer), &file)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeliveryFailed);
    assert!(store.students().is_empty());
    assert_eq!(occupancy(&store, "A-1"), 0);

    import_students(&store, &test_hasher(), None, &file)
        .await
        .unwrap();
    assert_eq!(occupancy(&store, "A-1"), 1);
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_occupancy() {
    let store = store_with_rooms(&[("A-1", 3)]);
    let notifier = RecordingNotifier::new();
    for roll in ["CS-1", "CS-2"] {
        StudentService::enroll(&store, &test_hasher(), &notifier, student_dto(roll, "A-1"))
            .await
            .unwrap();
    }
    let room_id = store.room("A-1").unwrap().id;

    let err = RoomService::update_capacity(&store, room_id, 1)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot set capacity to 1. This room already has 2 students."
    );

    let room = RoomService::update_capacity(&store, room_id, 2).await.unwrap();
    assert_eq!(room.capacity, 2);
    assert_occupancy_consistent(&store);
}

#[tokio::test]
async fn test_mixed_workflows_keep_counters_consistent() {
    let store = store_with_rooms(&[("A-1", 2), ("A-2", 2), ("A-3", 1)]);
    let notifier = RecordingNotifier::new();
    let hasher = test_hasher();

    let x = StudentService::enroll(&store, &hasher, &notifier, student_dto("CS-1", "A-1"))
        .await
        .unwrap();
    let file = csv(&[
        "Bilal,CS-2,bilal@college.test,A-2,CSE,1",
        "Chen,CS-3,chen@college.test,A-1,CSE,1",
    ]);
    import_students(&store, &hasher, Some(&notifier), &file)
        .await
        .unwrap();

    StudentService::update(
        &store,
        &hasher,
        x.id,
        UpdateStudentDto {
            room_no: Some("A-3".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let y = store.student_by_roll("CS-3").unwrap();
    StudentService::delete(&store, y.id).await.unwrap();

    // A-3 is full now; this one must fail without side effects
    StudentService::enroll(&store, &hasher, &notifier, student_dto("CS-4", "A-3"))
        .await
        .unwrap_err();

    assert_eq!(occupancy(&store, "A-1"), 0);
    assert_eq!(occupancy(&store, "A-2"), 1);
    assert_eq!(occupancy(&store, "A-3"), 1);
    assert_occupancy_consistent(&store);
}
