//! End-to-end tests: application services wired to real SQLite stores
//!
//! Exercises the whole expansion path (create origin -> generate dates ->
//! materialize occurrences -> delete origin) and the event feed on top of
//! the persisted records.

use std::sync::Arc;

use application::{
    ports::{
        AppointmentStorePort, HolidayStorePort, ParticipantNoteStorePort, ReminderQuery,
        ReminderStorePort,
    },
    services::{
        EventFeedQuery, EventFeedService, EventType, ExpansionConfig, ExpansionOutcome,
        ExpansionService, NewReminder, WorkingDayPolicy, WorkingDayService,
    },
};
use chrono::{NaiveDate, NaiveTime, Utc};
use domain::entities::{Appointment, Holiday, ParticipantNote};
use domain::value_objects::RepeatFrequency;
use infrastructure::{
    SqliteAppointmentStore, SqliteHolidayStore, SqliteParticipantNoteStore, SqliteReminderStore,
    config::DatabaseConfig, create_pool,
};

struct Fixture {
    reminders: Arc<SqliteReminderStore>,
    holidays: Arc<SqliteHolidayStore>,
    appointments: Arc<SqliteAppointmentStore>,
    notes: Arc<SqliteParticipantNoteStore>,
}

impl Fixture {
    fn new() -> Self {
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            max_connections: 1,
            run_migrations: true,
        };
        let pool = Arc::new(create_pool(&config).unwrap());
        Self {
            reminders: Arc::new(SqliteReminderStore::new(Arc::clone(&pool))),
            holidays: Arc::new(SqliteHolidayStore::new(Arc::clone(&pool))),
            appointments: Arc::new(SqliteAppointmentStore::new(Arc::clone(&pool))),
            notes: Arc::new(SqliteParticipantNoteStore::new(pool)),
        }
    }

    fn expansion_service(
        &self,
        config: ExpansionConfig,
    ) -> ExpansionService<SqliteReminderStore, SqliteHolidayStore> {
        let working_days = WorkingDayService::new(
            Arc::clone(&self.holidays),
            WorkingDayPolicy::default(),
        );
        ExpansionService::new(Arc::clone(&self.reminders), working_days, config)
    }

    fn feed_service(
        &self,
    ) -> EventFeedService<SqliteReminderStore, SqliteAppointmentStore, SqliteParticipantNoteStore>
    {
        EventFeedService::new(
            Arc::clone(&self.reminders),
            Arc::clone(&self.appointments),
            Arc::clone(&self.notes),
        )
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn monthly_reminder() -> NewReminder {
    NewReminder {
        title: "Draw bloods".to_string(),
        note: Some("Fasting sample".to_string()),
        // 2024-04-01 and 2024-07-01 are Mondays; 2024-06-01 is a Saturday.
        start_date: date(2024, 4, 1),
        end_date: date(2024, 7, 1),
        reminder_time: time(8, 30),
        color: Some("red".to_string()),
        repeat: RepeatFrequency::Monthly,
    }
}

#[tokio::test]
async fn create_expands_monthly_series_and_deletes_origin() {
    let fixture = Fixture::new();
    let svc = fixture.expansion_service(ExpansionConfig::default());

    let (origin, outcome) = svc.create(monthly_reminder()).await.unwrap();
    assert_eq!(outcome, ExpansionOutcome::Expanded { occurrences: 3 });

    // The origin is gone; only the three occurrences remain.
    assert!(fixture.reminders.get(&origin.id).await.unwrap().is_none());
    let all = fixture
        .reminders
        .query(&ReminderQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 3);

    let dates: Vec<NaiveDate> = all.iter().map(|r| r.occurrence_date()).collect();
    // June 1st is a Saturday and shifts to Monday June 3rd.
    assert_eq!(
        dates,
        vec![date(2024, 4, 1), date(2024, 5, 1), date(2024, 6, 3)]
    );

    for occurrence in &all {
        assert!(!occurrence.is_origin);
        assert_eq!(occurrence.series_id, origin.series_id);
        assert_eq!(occurrence.title, "Draw bloods");
        assert_eq!(occurrence.note.as_deref(), Some("Fasting sample"));
        assert_eq!(occurrence.color, "red");
        assert_eq!(occurrence.repeat, RepeatFrequency::Monthly);
        assert_eq!(occurrence.occurrence_at.time(), time(8, 30));
    }
}

#[tokio::test]
async fn duplicate_expansion_leaves_series_untouched() {
    let fixture = Fixture::new();
    let svc = fixture.expansion_service(ExpansionConfig::default());

    let (origin, _) = svc.create(monthly_reminder()).await.unwrap();
    let count_after_first = fixture
        .reminders
        .count_occurrences(&origin.series_id)
        .await
        .unwrap();

    // A duplicate creation notification for the same origin record.
    let outcome = svc.expand(&origin).await.unwrap();
    assert_eq!(outcome, ExpansionOutcome::AlreadyExpanded);

    let count_after_second = fixture
        .reminders
        .count_occurrences(&origin.series_id)
        .await
        .unwrap();
    assert_eq!(count_after_first, count_after_second);
    assert_eq!(count_after_second, 3);
}

#[tokio::test]
async fn holiday_shifts_occurrence_to_next_working_day() {
    let fixture = Fixture::new();
    // Wednesday May 1st is a holiday; the occurrence lands on Thursday.
    fixture
        .holidays
        .save(&Holiday::new(date(2024, 5, 1), "Workers' Day"))
        .await
        .unwrap();

    let svc = fixture.expansion_service(ExpansionConfig::default());
    svc.create(monthly_reminder()).await.unwrap();

    let all = fixture
        .reminders
        .query(&ReminderQuery::default())
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|r| r.occurrence_date()).collect();
    assert_eq!(
        dates,
        vec![date(2024, 4, 1), date(2024, 5, 2), date(2024, 6, 3)]
    );
}

#[tokio::test]
async fn disabled_shift_keeps_weekend_dates() {
    let fixture = Fixture::new();
    let config = ExpansionConfig {
        shift_to_working_day: false,
        study_start: None,
    };
    let svc = fixture.expansion_service(config);
    svc.create(monthly_reminder()).await.unwrap();

    let all = fixture
        .reminders
        .query(&ReminderQuery::default())
        .await
        .unwrap();
    let dates: Vec<NaiveDate> = all.iter().map(|r| r.occurrence_date()).collect();
    assert_eq!(
        dates,
        vec![date(2024, 4, 1), date(2024, 5, 1), date(2024, 6, 1)]
    );
}

#[tokio::test]
async fn working_day_service_reads_persisted_holidays() {
    let fixture = Fixture::new();
    let working_days = WorkingDayService::new(
        Arc::clone(&fixture.holidays),
        WorkingDayPolicy::default(),
    );

    // Empty store baseline: a Wednesday is a working day.
    assert!(working_days
        .is_valid_working_day(date(2024, 6, 5))
        .await
        .unwrap());

    fixture
        .holidays
        .save(&Holiday::new(date(2024, 6, 5), "Mid-study break"))
        .await
        .unwrap();
    assert!(working_days.is_holiday(date(2024, 6, 5)).await.unwrap());
    assert!(!working_days
        .is_valid_working_day(date(2024, 6, 5))
        .await
        .unwrap());
}

#[tokio::test]
async fn event_feed_merges_persisted_events() {
    let fixture = Fixture::new();
    let svc = fixture.expansion_service(ExpansionConfig::default());
    svc.create(monthly_reminder()).await.unwrap();

    fixture
        .appointments
        .save(&Appointment::new(
            "S-042",
            "2001",
            "child_b_sq_schedule1",
            date(2024, 4, 15).and_time(time(10, 0)).and_utc(),
        ))
        .await
        .unwrap();
    fixture
        .notes
        .save(
            &ParticipantNote::new("S-042", "Reschedule reason", date(2024, 5, 20))
                .with_description("Participant travelling"),
        )
        .await
        .unwrap();

    let feed = fixture.feed_service();
    let from = date(2024, 1, 1).and_time(NaiveTime::MIN).and_utc();
    let records = feed.collect(&EventFeedQuery::upcoming(from)).await.unwrap();

    // 3 reminder occurrences + 1 appointment + 1 note, chronological.
    assert_eq!(records.len(), 5);
    assert!(records.windows(2).all(|w| w[0].datetime <= w[1].datetime));

    let types: Vec<EventType> = records.iter().map(|r| r.event_type).collect();
    assert_eq!(
        types,
        vec![
            EventType::Reminder,
            EventType::Appointment,
            EventType::Reminder,
            EventType::ParticipantNote,
            EventType::Reminder,
        ]
    );

    let appointment = &records[1];
    assert_eq!(appointment.cohort.as_deref(), Some("child_b_sq"));
    assert_eq!(appointment.visit_code.as_deref(), Some("2001"));

    let note = &records[3];
    assert_eq!(
        note.details,
        "Reschedule reason: Participant travelling"
    );
}

#[tokio::test]
async fn unexpanded_origin_stays_queryable() {
    let fixture = Fixture::new();

    // An origin whose expansion never ran (e.g. the process died in
    // between) is still a single queryable event for the feed.
    let origin = domain::entities::Reminder::new(
        "Orphaned origin",
        date(2024, 4, 1),
        date(2024, 7, 1),
        time(9, 0),
        RepeatFrequency::Monthly,
    );
    fixture.reminders.save(&origin).await.unwrap();

    let feed = fixture.feed_service();
    let from = date(2024, 1, 1).and_time(NaiveTime::MIN).and_utc();
    let records = feed.collect(&EventFeedQuery::upcoming(from)).await.unwrap();

    // occurrence_at defaulted to creation time, which is "now" and after
    // `from`, so the origin shows up as one reminder event.
    let reminders: Vec<_> = records
        .iter()
        .filter(|r| r.event_type == EventType::Reminder)
        .collect();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].details, "Orphaned origin");
}

#[tokio::test]
async fn study_start_floor_rejects_early_windows_end_to_end() {
    let fixture = Fixture::new();
    let config = ExpansionConfig {
        shift_to_working_day: true,
        study_start: Some(date(2024, 5, 1)),
    };
    let svc = fixture.expansion_service(config);

    let result = svc.create(monthly_reminder()).await;
    assert!(result.is_err());

    // Nothing was persisted.
    let all = fixture
        .reminders
        .query(&ReminderQuery::default())
        .await
        .unwrap();
    assert!(all.is_empty());
}
