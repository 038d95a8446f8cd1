use chrono::NaiveDate;
use tracing::debug;

use crate::calc::status::classify_punch;
use crate::config::PayrollRules;
use crate::error::{ServiceError, ServiceResult};
use crate::model::attendance::AttendanceRecord;
use crate::model::timecard::TimePunch;
use crate::state::AppState;

/// Classifies every punch; does not touch storage.
pub fn classify_range(punches: &[TimePunch], rules: &PayrollRules) -> Vec<AttendanceRecord> {
    punches.iter().map(|p| classify_punch(p, rules)).collect()
}

/// Stores the records keyed by (employee_id, date). Writing the same
/// records twice leaves one row per day.
pub async fn persist_snapshot(state: &AppState, records: &[AttendanceRecord]) -> ServiceResult<()> {
    if records.is_empty() {
        return Ok(());
    }
    state.stores.attendance.upsert(records).await?;
    Ok(())
}

/// Reads the punches of `[from, to]`, classifies them and materializes the
/// resulting attendance records.
pub async fn snapshot(
    state: &AppState,
    employee_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> ServiceResult<Vec<AttendanceRecord>> {
    if from > to {
        return Err(ServiceError::validation("from must not be after to"));
    }

    let punches = state.stores.timecards.range(employee_id, from, to).await?;
    let records = classify_range(&punches, &state.rules);
    persist_snapshot(state, &records).await?;

    debug!(employee_id, %from, %to, days = records.len(), "Attendance snapshot stored");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WriteGuard;
    use crate::model::attendance::AttendanceStatus;
    use crate::services::test_support::state;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn punch(d: u32, log_in: &str, log_out: &str) -> TimePunch {
        TimePunch {
            employee_id: "EMP-001".into(),
            date: day(d),
            log_in: log_in.into(),
            log_out: log_out.into(),
            ..TimePunch::default()
        }
    }

    #[test]
    fn classify_range_maps_each_punch() {
        let records = classify_range(
            &[punch(2, "09:00", "17:30"), punch(3, "09:00", "14:00"), punch(4, "09:00", "")],
            &PayrollRules::default(),
        );
        let statuses: Vec<_> = records.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![AttendanceStatus::Present, AttendanceStatus::HalfDay, AttendanceStatus::InOffice]
        );
        assert_eq!(records[0].overtime_hours, 0.5);
    }

    #[actix_web::test]
    async fn snapshot_materializes_and_is_idempotent() {
        let state = state(WriteGuard::Serialized);
        for p in [
            punch(2, "09:00", "17:00"),
            punch(3, "22:00", "06:00"),
            punch(10, "09:00", "10:00"),
        ] {
            state.stores.timecards.insert(&p).await.unwrap();
        }

        let first = snapshot(&state, "EMP-001", day(1), day(5)).await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].total_hours, 8.0);

        let again = snapshot(&state, "EMP-001", day(1), day(5)).await.unwrap();
        assert_eq!(first, again);

        let stored = state.stores.attendance.range("EMP-001", day(1), day(28)).await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[actix_web::test]
    async fn snapshot_rejects_inverted_range() {
        let state = state(WriteGuard::Serialized);
        let err = snapshot(&state, "EMP-001", day(5), day(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
