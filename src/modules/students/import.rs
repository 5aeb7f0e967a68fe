//! All-or-nothing CSV import of students.
//!
//! The whole file runs in one transaction. Each row is checked against the
//! persisted occupancy plus the seats claimed by earlier rows of the same
//! file (the [`OccupancyLedger`]). Occupancy counters are only written once
//! every row has been inserted; the first failing row rolls everything back.

use std::collections::HashMap;

use chrono::NaiveDate;
use hostelbyte_core::{CredentialHasher, generate_temporary_password};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::HostelError;
use crate::metrics::track_student_import;
use crate::modules::students::model::{CreateStudentDto, NewStudent, StudentImportSummary};
use crate::modules::students::service::{hash_credential, student_write_error};
use crate::occupancy::{OccupancyLedger, RoomCapacityGuard};
use crate::store::{HostelStore, StoreTx, finish};
use crate::utils::csv::{decode_csv, field};
use crate::utils::notifier::Notifier;
use crate::validator::validation_message;

type CsvRow = HashMap<String, String>;

/// Line number of a data row in the source file, counting the header.
fn line_number(index: usize) -> usize {
    index + 2
}

/// Imports every student in `bytes` or none of them.
///
/// When `notifier` is `None` no welcome emails are sent; otherwise a failed
/// delivery aborts the batch like any other row error.
#[instrument(skip(store, hasher, notifier, bytes), fields(bytes = bytes.len()))]
pub async fn import_students<S: HostelStore>(
    store: &S,
    hasher: &CredentialHasher,
    notifier: Option<&dyn Notifier>,
    bytes: &[u8],
) -> Result<StudentImportSummary, HostelError> {
    let rows = decode_csv(bytes).map_err(|e| {
        warn!(error = %e, "Rejected malformed student CSV");
        HostelError::validation("CSV file is empty or invalid.")
    })?;
    if rows.is_empty() {
        return Err(HostelError::validation("CSV file is empty or invalid."));
    }

    let mut tx = store.begin().await?;
    let result = import_rows(&mut tx, hasher, notifier, &rows).await;
    let outcome = finish(tx, result).await;
    track_student_import(outcome.is_ok());

    let summary = outcome?;
    info!(imported = summary.imported, rooms = summary.rooms.len(), "Student import committed");
    Ok(summary)
}

async fn import_rows<T: StoreTx>(
    tx: &mut T,
    hasher: &CredentialHasher,
    notifier: Option<&dyn Notifier>,
    rows: &[CsvRow],
) -> Result<StudentImportSummary, HostelError> {
    let mut ledger = OccupancyLedger::new();

    for (index, row) in rows.iter().enumerate() {
        let line = line_number(index);
        import_row(tx, hasher, notifier, &mut ledger, row)
            .await
            .map_err(|e| e.at_row(line))?;
    }

    for (room_number, added) in ledger.entries() {
        tx.adjust_occupancy(room_number, added).await?;
    }

    Ok(StudentImportSummary {
        imported: rows.len(),
        rooms: ledger.into_allocations(),
    })
}

async fn import_row<T: StoreTx>(
    tx: &mut T,
    hasher: &CredentialHasher,
    notifier: Option<&dyn Notifier>,
    ledger: &mut OccupancyLedger,
    row: &CsvRow,
) -> Result<(), HostelError> {
    let student = parse_row(row)?;
    RoomCapacityGuard::check(tx, &student.room_no, ledger).await?;

    let temp_password = generate_temporary_password();
    let new_student = NewStudent {
        password_hash: hash_credential(hasher, &temp_password)?,
        ..student
    };

    let inserted = tx
        .insert_student(&new_student)
        .await
        .map_err(student_write_error)?;
    ledger.reserve(&new_student.room_no);

    if let Some(notifier) = notifier {
        notifier
            .send_welcome(&inserted.email, &inserted.name, &inserted.roll_no, &temp_password)
            .await?;
    }
    Ok(())
}

/// Builds a student from a CSV row under the same rules as the single
/// enrollment endpoint. The password hash is left empty.
fn parse_row(row: &CsvRow) -> Result<NewStudent, HostelError> {
    let text = |name: &str| field(row, name).map(str::to_string);
    let (Some(name), Some(roll_no), Some(email), Some(room_no)) =
        (text("name"), text("roll_no"), text("email"), text("room_no"))
    else {
        return Err(HostelError::validation(
            "Missing required fields (name, roll_no, email, room_no).",
        ));
    };

    let dob = field(row, "dob")
        .map(|v| NaiveDate::parse_from_str(v, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| HostelError::validation("Invalid dob, expected YYYY-MM-DD."))?;
    let year = field(row, "year")
        .map(str::parse::<i32>)
        .transpose()
        .map_err(|_| HostelError::validation("Invalid year, expected a number."))?;

    let dto = CreateStudentDto {
        name,
        roll_no,
        email,
        phone: text("phone"),
        gender: text("gender"),
        dob,
        address: text("address"),
        guardian_name: text("guardian_name"),
        guardian_phone: text("guardian_phone"),
        room_no,
        department: text("department"),
        year,
    };
    dto.validate()
        .map_err(|errors| HostelError::validation(validation_message(&errors)))?;

    Ok(NewStudent::from_dto(dto, String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_line_number_accounts_for_header() {
        assert_eq!(line_number(0), 2);
        assert_eq!(line_number(1), 3);
    }

    #[test]
    fn test_parse_row_requires_core_fields() {
        let err = parse_row(&row(&[("name", "Asha"), ("roll_no", "CS-1"), ("email", "")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required fields (name, roll_no, email, room_no)."
        );
    }

    #[test]
    fn test_parse_row_optional_fields() {
        let student = parse_row(&row(&[
            ("name", "Asha"),
            ("roll_no", "CS-1"),
            ("email", "asha@college.test"),
            ("room_no", "A-1"),
            ("dob", "2004-02-29"),
            ("year", "2"),
            ("phone", ""),
        ]))
        .unwrap();

        assert_eq!(student.dob, NaiveDate::from_ymd_opt(2004, 2, 29));
        assert_eq!(student.year, Some(2));
        assert_eq!(student.phone, None);
    }

    #[test]
    fn test_parse_row_applies_enrollment_rules() {
        let base = [
            ("name", "Asha"),
            ("roll_no", "CS-1"),
            ("room_no", "A-1"),
        ];

        let mut bad_email = base.to_vec();
        bad_email.push(("email", "not-an-email"));
        let err = parse_row(&row(&bad_email)).unwrap_err();
        assert_eq!(err.to_string(), "A valid email is required");

        let mut year_out_of_range = base.to_vec();
        year_out_of_range.extend([("email", "asha@college.test"), ("year", "99")]);
        let err = parse_row(&row(&year_out_of_range)).unwrap_err();
        assert_eq!(err.to_string(), "year is invalid");
    }

    #[test]
    fn test_parse_row_rejects_bad_year() {
        let err = parse_row(&row(&[
            ("name", "Asha"),
            ("roll_no", "CS-1"),
            ("email", "asha@college.test"),
            ("room_no", "A-1"),
            ("year", "second"),
        ]))
        .unwrap_err();
        assert!(matches!(err, HostelError::Validation(_)));
    }
}
