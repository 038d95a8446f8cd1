use crate::calc::time::{hours_worked, lunch_minutes, to_hours};
use crate::config::PayrollRules;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::timecard::TimePunch;

/// Status of one employee-day.
///
/// An employee who has not clocked out is always `InOffice`; otherwise
/// permission counts towards the day up to the configured cap.
pub fn classify(
    hours_worked: f64,
    permission_hours: f64,
    has_logout: bool,
    rules: &PayrollRules,
) -> AttendanceStatus {
    if !has_logout {
        return AttendanceStatus::InOffice;
    }

    let effective = hours_worked + permission_credit(permission_hours, rules);

    if effective >= rules.standard_day_hours {
        AttendanceStatus::Present
    } else if effective >= rules.half_day_hours {
        AttendanceStatus::HalfDay
    } else {
        AttendanceStatus::Absent
    }
}

fn permission_credit(permission_hours: f64, rules: &PayrollRules) -> f64 {
    permission_hours.max(0.0).min(rules.permission_cap_hours)
}

pub fn overtime_hours(hours_worked: f64, rules: &PayrollRules) -> f64 {
    (hours_worked - rules.standard_day_hours).max(0.0)
}

/// Derives the attendance record of a single punch.
pub fn classify_punch(punch: &TimePunch, rules: &PayrollRules) -> AttendanceRecord {
    let hours = hours_worked(punch, rules.break_minutes);
    let permission = to_hours(&punch.permission);
    let status = classify(hours, permission, punch.has_logout(), rules);

    AttendanceRecord {
        employee_id: punch.employee_id.clone(),
        date: punch.date,
        status,
        total_hours: hours,
        permission_hours: permission_credit(permission, rules),
        log_in: punch.log_in.clone(),
        log_out: punch.log_out.clone(),
        lunch_minutes: lunch_minutes(punch),
        overtime_hours: overtime_hours(hours, rules),
        remarks: punch.reason.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rules() -> PayrollRules {
        PayrollRules::default()
    }

    #[test]
    fn classifies_by_effective_hours() {
        let r = rules();
        assert_eq!(classify(8.0, 0.0, true, &r), AttendanceStatus::Present);
        assert_eq!(classify(3.9, 0.0, true, &r), AttendanceStatus::Absent);
        assert_eq!(classify(5.0, 0.0, true, &r), AttendanceStatus::HalfDay);
    }

    #[test]
    fn permission_credit_is_capped() {
        let r = rules();
        assert_eq!(classify(6.0, 2.5, true, &r), AttendanceStatus::Present);
        assert_eq!(classify(5.0, 4.0, true, &r), AttendanceStatus::HalfDay);
        assert_eq!(classify(2.0, 2.0, true, &r), AttendanceStatus::HalfDay);
    }

    #[test]
    fn boundaries() {
        let r = rules();
        assert_eq!(classify(3.999, 0.0, true, &r), AttendanceStatus::Absent);
        assert_eq!(classify(4.0, 0.0, true, &r), AttendanceStatus::HalfDay);
        assert_eq!(classify(7.999, 0.0, true, &r), AttendanceStatus::HalfDay);
        assert_eq!(classify(8.0, 0.0, true, &r), AttendanceStatus::Present);
    }

    #[test]
    fn open_punch_is_in_office_regardless_of_hours() {
        let r = rules();
        assert_eq!(classify(0.0, 0.0, false, &r), AttendanceStatus::InOffice);
        assert_eq!(classify(12.0, 2.0, false, &r), AttendanceStatus::InOffice);
    }

    #[test]
    fn thresholds_follow_configuration() {
        let r = PayrollRules {
            standard_day_hours: 9.0,
            half_day_hours: 5.0,
            ..rules()
        };
        assert_eq!(classify(8.0, 0.0, true, &r), AttendanceStatus::HalfDay);
        assert_eq!(classify(4.5, 0.0, true, &r), AttendanceStatus::Absent);
    }

    #[test]
    fn builds_record_from_punch() {
        let punch = TimePunch {
            employee_id: "EMP-001".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            log_in: "09:00".into(),
            log_out: "19:00".into(),
            lunch_out: "13:00".into(),
            lunch_in: "13:30".into(),
            permission: "".into(),
            reason: "release day".into(),
        };

        let record = classify_punch(&punch, &rules());
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.total_hours, 9.5);
        assert_eq!(record.overtime_hours, 1.5);
        assert_eq!(record.lunch_minutes, 30);
        assert_eq!(record.remarks, "release day");
    }

    #[test]
    fn permission_consumed_is_capped_in_record() {
        let punch = TimePunch {
            employee_id: "EMP-001".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            log_in: "09:00".into(),
            log_out: "18:00".into(),
            permission: "03:00".into(),
            ..TimePunch::default()
        };

        let record = classify_punch(&punch, &rules());
        assert_eq!(record.permission_hours, 2.0);
        // 9h span minus 3h permission = 6h worked, +2h credit
        assert_eq!(record.total_hours, 6.0);
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.overtime_hours, 0.0);
    }
}
