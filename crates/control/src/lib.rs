//! GITADORA skill tracker persistence
//!
//! SQLite-backed storage for users, sessions, the song catalog and skill
//! data.
//!
//! # Usage
//!
//! ```ignore
//! use gitadora_control::Database;
//!
//! // File-based (production)
//! let db = Database::open("data/gitadora.db", 5).await?;
//!
//! // In-memory (testing)
//! let db = Database::in_memory().await?;
//!
//! // Access repositories
//! let songs = db.songs().list(&SongFilter::default()).await?;
//! ```
//!
//! Repositories borrow the pool; they are cheap to create per call.

pub mod db;
pub mod error;
pub mod models;
pub mod repos;

// Re-exports
pub use db::Database;
pub use error::{ControlError, Result};
pub use models::{
    Artist, Event, EventInput, GameVersion, NewSkillRecord, NewUser, RecordFilter, Session, Song,
    SongFilter, SongInput, Tag, User,
};
pub use repos::{
    AdminGuarded, ArtistRepo, EventRepo, SkillRepo, SongRepo, TagRepo, UserRepo, VersionRepo,
};

impl Database {
    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(self.pool())
    }

    pub fn artists(&self) -> ArtistRepo<'_> {
        ArtistRepo::new(self.pool())
    }

    pub fn versions(&self) -> VersionRepo<'_> {
        VersionRepo::new(self.pool())
    }

    pub fn tags(&self) -> TagRepo<'_> {
        TagRepo::new(self.pool())
    }

    pub fn songs(&self) -> SongRepo<'_> {
        SongRepo::new(self.pool())
    }

    pub fn events(&self) -> EventRepo<'_> {
        EventRepo::new(self.pool())
    }

    pub fn skills(&self) -> SkillRepo<'_> {
        SkillRepo::new(self.pool())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use gitadora_skill::{Difficulty, InstrumentType, SkillAggregator, SkillSnapshot};

    async fn user(db: &Database, email: &str) -> User {
        db.users()
            .create(&NewUser {
                email: email.to_string(),
                display_name: email.split('@').next().unwrap().to_string(),
                password_hash: "hash".to_string(),
                role: "user".to_string(),
            })
            .await
            .unwrap()
    }

    fn play(title: &str, rate: f64, skill: f64, hot: bool, minute: i64) -> NewSkillRecord {
        NewSkillRecord {
            song_title: title.to_string(),
            instrument_type: InstrumentType::Guitar,
            difficulty: Difficulty::Master,
            achievement_rate: rate,
            skill_score: skill,
            is_hot: hot,
            version: Some("GALAXY WAVE".to_string()),
            played_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute),
        }
    }

    #[tokio::test]
    async fn test_user_crud() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();

        let alice = user(&db, "alice@example.com").await;
        assert!(alice.id > 0);
        assert_eq!(repo.count().await.unwrap(), 1);

        // Duplicate email
        let dup = repo
            .create(&NewUser {
                email: "alice@example.com".into(),
                display_name: "Other".into(),
                password_hash: "hash".into(),
                role: "user".into(),
            })
            .await;
        assert!(matches!(dup, Err(ControlError::AlreadyExists { .. })));

        let fetched = repo.get_by_email("alice@example.com").await.unwrap().unwrap();
        assert_eq!(fetched.id, alice.id);
        assert_eq!(fetched.display_name, "alice");

        assert!(repo.update_role(alice.id, "admin").await.unwrap());
        assert_eq!(repo.count_with_role("admin").await.unwrap(), 1);
        assert!(!repo.update_role(999, "admin").await.unwrap());

        repo.touch_last_login(alice.id).await.unwrap();
        let fetched = repo.get_by_id(alice.id).await.unwrap().unwrap();
        assert!(fetched.last_login.is_some());

        assert!(repo.delete(alice.id).await.unwrap());
        assert!(repo.get_by_id(alice.id).await.unwrap().is_none());
        assert!(!repo.delete(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_first_only_on_empty_table() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();
        let first = NewUser {
            email: "root@example.com".into(),
            display_name: "root".into(),
            password_hash: "hash".into(),
            role: "admin".into(),
        };

        let created = repo.create_first(&first).await.unwrap().unwrap();
        assert_eq!(created.role, "admin");

        let second = NewUser {
            email: "other@example.com".into(),
            ..first
        };
        assert!(repo.create_first(&second).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_admin_guarded_writes() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.users();
        let alice = user(&db, "alice@example.com").await;
        let bob = user(&db, "bob@example.com").await;
        repo.update_role(alice.id, "admin").await.unwrap();

        // Only admin
        assert_eq!(
            repo.update_role_keeping_admin(alice.id, "user").await.unwrap(),
            AdminGuarded::LastAdmin
        );
        assert_eq!(
            repo.delete_keeping_admin(alice.id).await.unwrap(),
            AdminGuarded::LastAdmin
        );
        assert_eq!(
            repo.update_role_keeping_admin(alice.id, "admin").await.unwrap(),
            AdminGuarded::Applied
        );

        // Promoting a second admin releases the first
        assert_eq!(
            repo.update_role_keeping_admin(bob.id, "admin").await.unwrap(),
            AdminGuarded::Applied
        );
        assert_eq!(
            repo.update_role_keeping_admin(alice.id, "user").await.unwrap(),
            AdminGuarded::Applied
        );
        assert_eq!(
            repo.delete_keeping_admin(alice.id).await.unwrap(),
            AdminGuarded::Applied
        );
        assert_eq!(
            repo.delete_keeping_admin(bob.id).await.unwrap(),
            AdminGuarded::LastAdmin
        );
        assert_eq!(
            repo.delete_keeping_admin(999).await.unwrap(),
            AdminGuarded::NotFound
        );
        assert_eq!(
            repo.update_role_keeping_admin(999, "user").await.unwrap(),
            AdminGuarded::NotFound
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admin_removal_keeps_one_admin() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("gitadora.db"), 5).await.unwrap();

        let mut ids = Vec::new();
        for email in ["a@example.com", "b@example.com", "c@example.com"] {
            let u = user(&db, email).await;
            db.users().update_role(u.id, "admin").await.unwrap();
            ids.push(u.id);
        }

        let mut handles = Vec::new();
        for (i, id) in ids.into_iter().enumerate() {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    db.users().delete_keeping_admin(id).await.unwrap()
                } else {
                    db.users().update_role_keeping_admin(id, "user").await.unwrap()
                }
            }));
        }

        let mut applied = 0;
        for handle in handles {
            if handle.await.unwrap() == AdminGuarded::Applied {
                applied += 1;
            }
        }

        assert_eq!(applied, 2);
        assert_eq!(db.users().count_with_role("admin").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let db = Database::in_memory().await.unwrap();
        let alice = user(&db, "alice@example.com").await;
        let repo = db.users();

        let live = Session::new(alice.id, "tok-live", Duration::hours(1))
            .with_client(Some("127.0.0.1".into()), None);
        let dead = Session::new(alice.id, "tok-dead", Duration::hours(-1));
        repo.create_session(&live).await.unwrap();
        repo.create_session(&dead).await.unwrap();

        let fetched = repo.get_session_by_token("tok-live").await.unwrap().unwrap();
        assert_eq!(fetched.user_id, alice.id);
        assert_eq!(fetched.ip_address.as_deref(), Some("127.0.0.1"));

        assert_eq!(repo.cleanup_expired_sessions().await.unwrap(), 1);
        assert!(repo.get_session_by_token("tok-dead").await.unwrap().is_none());

        assert!(repo.delete_session("tok-live").await.unwrap());
        assert!(repo.get_session_by_token("tok-live").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleting_user_cascades() {
        let db = Database::in_memory().await.unwrap();
        let alice = user(&db, "alice@example.com").await;

        db.users()
            .create_session(&Session::new(alice.id, "tok", Duration::hours(1)))
            .await
            .unwrap();
        db.skills()
            .insert_records(alice.id, &[play("A", 90.0, 100.0, true, 0)])
            .await
            .unwrap();

        db.users().delete(alice.id).await.unwrap();

        assert!(db.users().get_session_by_token("tok").await.unwrap().is_none());
        let records = db
            .skills()
            .list_records(&RecordFilter::new(alice.id, InstrumentType::Guitar))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_crud() {
        let db = Database::in_memory().await.unwrap();

        let artist = db.artists().create("  Tatsh ").await.unwrap();
        assert_eq!(artist.name, "Tatsh");
        assert!(matches!(
            db.artists().create("Tatsh").await,
            Err(ControlError::AlreadyExists { .. })
        ));
        assert!(matches!(
            db.artists().create("").await,
            Err(ControlError::Invalid { .. })
        ));

        let renamed = db.artists().update(artist.id, "TAG").await.unwrap();
        assert_eq!(renamed.name, "TAG");
        assert!(matches!(
            db.artists().update(999, "x").await,
            Err(ControlError::NotFound { .. })
        ));

        let old = db
            .versions()
            .create("FUZZ-UP", NaiveDate::from_ymd_opt(2022, 11, 1))
            .await
            .unwrap();
        let new = db
            .versions()
            .create("GALAXY WAVE", NaiveDate::from_ymd_opt(2024, 3, 1))
            .await
            .unwrap();
        let undated = db.versions().create("Unreleased", None).await.unwrap();
        let versions: Vec<i64> = db.versions().list().await.unwrap().iter().map(|v| v.id).collect();
        assert_eq!(versions, vec![new.id, old.id, undated.id]);

        let tag = db.tags().create("long").await.unwrap();
        assert_eq!(db.tags().list().await.unwrap().len(), 1);
        assert!(db.tags().delete(tag.id).await.unwrap());
        assert!(db.tags().get_by_id(tag.id).await.unwrap().is_none());

        // Deleting an artist detaches its songs
        let song = db
            .songs()
            .create(&SongInput {
                artist_id: Some(renamed.id),
                ..SongInput::new("Song A")
            })
            .await
            .unwrap();
        db.artists().delete(renamed.id).await.unwrap();
        let song = db.songs().get_by_id(song.id).await.unwrap().unwrap();
        assert_eq!(song.artist_id, None);
    }

    #[tokio::test]
    async fn test_song_filters_and_tags() {
        let db = Database::in_memory().await.unwrap();
        let version = db.versions().create("GALAXY WAVE", None).await.unwrap();
        let long = db.tags().create("long").await.unwrap();
        let fast = db.tags().create("fast").await.unwrap();

        let a = db
            .songs()
            .create(&SongInput {
                version_id: Some(version.id),
                is_hot: true,
                bpm: Some("180".into()),
                ..SongInput::new("A")
            })
            .await
            .unwrap();
        let b = db.songs().create(&SongInput::new("B")).await.unwrap();

        let tagged = db.songs().set_tags(a.id, &[fast.id, long.id, fast.id]).await.unwrap();
        let mut expected = vec![long.id, fast.id];
        expected.sort();
        assert_eq!(tagged.tag_ids, expected);

        let hot = db
            .songs()
            .list(&SongFilter {
                is_hot: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].id, a.id);
        assert_eq!(hot[0].tag_ids, expected);

        let by_version = db
            .songs()
            .list(&SongFilter {
                version_id: Some(version.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_version.len(), 1);

        let by_tag = db
            .songs()
            .list(&SongFilter {
                tag_id: Some(long.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_tag.len(), 1);

        let not_hot = db
            .songs()
            .list(&SongFilter {
                is_hot: Some(false),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(not_hot.len(), 1);
        assert_eq!(not_hot[0].id, b.id);

        // Unknown tag rejects the whole set
        let err = db.songs().set_tags(a.id, &[long.id, 999]).await.unwrap_err();
        assert!(matches!(err, ControlError::Invalid { field: "tag_ids", .. }));
        assert_eq!(db.songs().get_by_id(a.id).await.unwrap().unwrap().tag_ids, expected);

        assert!(matches!(
            db.songs().set_tags(999, &[]).await,
            Err(ControlError::NotFound { .. })
        ));

        // Unknown artist
        let err = db
            .songs()
            .create(&SongInput {
                artist_id: Some(42),
                ..SongInput::new("C")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ControlError::Invalid { .. }));

        // Tag removal detaches
        db.tags().delete(long.id).await.unwrap();
        assert_eq!(db.songs().get_by_id(a.id).await.unwrap().unwrap().tag_ids, vec![fast.id]);
    }

    #[tokio::test]
    async fn test_event_crud() {
        let db = Database::in_memory().await.unwrap();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        let input = EventInput {
            title: "Spring event".into(),
            description: Some("  ".into()),
            version_id: None,
            starts_at: start,
            ends_at: start + Duration::days(14),
        };
        let event = db.events().create(&input).await.unwrap();
        assert_eq!(event.description, None);

        let active = db.events().list_active(start + Duration::days(3)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(db.events().list_active(start - Duration::days(1)).await.unwrap().is_empty());

        let bad = EventInput {
            ends_at: start - Duration::days(1),
            ..input.clone()
        };
        assert!(matches!(
            db.events().update(event.id, &bad).await,
            Err(ControlError::Invalid { .. })
        ));

        let updated = db
            .events()
            .update(
                event.id,
                &EventInput {
                    title: "Renamed".into(),
                    ..input
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.starts_at, start);

        assert!(db.events().delete(event.id).await.unwrap());
        assert!(db.events().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_filters() {
        let db = Database::in_memory().await.unwrap();
        let alice = user(&db, "alice@example.com").await;
        let bob = user(&db, "bob@example.com").await;

        let mut old_version = play("C", 70.0, 60.0, false, 30);
        old_version.version = Some("FUZZ-UP".into());
        let mut drum = play("D", 70.0, 60.0, false, 40);
        drum.instrument_type = InstrumentType::Drum;

        db.skills()
            .insert_records(
                alice.id,
                &[
                    play("A", 80.0, 150.0, true, 0),
                    play("A", 95.0, 170.0, true, 10),
                    play("B", 90.0, 50.0, false, 20),
                    old_version,
                    drum,
                ],
            )
            .await
            .unwrap();
        db.skills()
            .insert_records(bob.id, &[play("A", 99.0, 180.0, true, 0)])
            .await
            .unwrap();

        let all = db
            .skills()
            .list_records(&RecordFilter::new(alice.id, InstrumentType::Guitar))
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
        assert!(all.windows(2).all(|w| w[0].played_at >= w[1].played_at));

        let by_version = db
            .skills()
            .list_records(
                &RecordFilter::new(alice.id, InstrumentType::Guitar)
                    .version(Some("FUZZ-UP".into())),
            )
            .await
            .unwrap();
        assert_eq!(by_version.len(), 1);
        assert_eq!(by_version[0].song_title, "C");

        let cutoff = Utc.with_ymd_and_hms(2024, 3, 1, 12, 10, 0).unwrap();
        let before = db
            .skills()
            .list_records(&RecordFilter::new(alice.id, InstrumentType::Guitar).cutoff(Some(cutoff)))
            .await
            .unwrap();
        assert_eq!(before.len(), 2);

        let summary = SkillAggregator::new().aggregate(all, None);
        assert_eq!(summary.hot_skill, 170.0);
        assert_eq!(summary.other_skill, 110.0);
    }

    #[tokio::test]
    async fn test_invalid_batch_writes_nothing() {
        let db = Database::in_memory().await.unwrap();
        let alice = user(&db, "alice@example.com").await;

        let result = db
            .skills()
            .insert_records(alice.id, &[play("A", 90.0, 100.0, true, 0), play("B", 120.0, 1.0, true, 1)])
            .await;
        assert!(matches!(result, Err(ControlError::Invalid { .. })));

        let records = db
            .skills()
            .list_records(&RecordFilter::new(alice.id, InstrumentType::Guitar))
            .await
            .unwrap();
        assert!(records.is_empty());

        let unknown_player = db.skills().insert_records(999, &[play("A", 90.0, 100.0, true, 0)]).await;
        assert!(matches!(unknown_player, Err(ControlError::Invalid { field: "player_id", .. })));
    }

    #[tokio::test]
    async fn test_snapshots() {
        let db = Database::in_memory().await.unwrap();
        let alice = user(&db, "alice@example.com").await;
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let summary = SkillAggregator::new().aggregate(Vec::new(), None);
        let first = db
            .skills()
            .insert_snapshot(&SkillSnapshot::from_summary(alice.id, InstrumentType::Guitar, &summary, t0))
            .await
            .unwrap();
        let mut later = first.clone();
        later.total_skill = 1234.5;
        later.hot_skill = 1234.5;
        later.recorded_at = t0 + Duration::days(1);
        let second = db.skills().insert_snapshot(&later).await.unwrap();
        assert_ne!(first.id, second.id);

        let history = db
            .skills()
            .list_snapshots(alice.id, InstrumentType::Guitar)
            .await
            .unwrap();
        assert_eq!(history.iter().map(|s| s.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(history[0].total_skill, 1234.5);

        assert!(db.skills().list_snapshots(alice.id, InstrumentType::Drum).await.unwrap().is_empty());
        assert_eq!(db.skills().get_snapshot(first.id).await.unwrap().unwrap().recorded_at, t0);
        assert_eq!(
            db.skills()
                .list_snapshots_for_instrument(InstrumentType::Guitar)
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[tokio::test]
    async fn test_take_snapshot() {
        let db = Database::in_memory().await.unwrap();
        let alice = user(&db, "alice@example.com").await;
        db.skills()
            .insert_records(
                alice.id,
                &[play("A", 95.0, 170.0, true, 0), play("B", 90.0, 50.0, false, 5)],
            )
            .await
            .unwrap();

        let at = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let snapshot = db
            .skills()
            .take_snapshot(alice.id, InstrumentType::Guitar, &SkillAggregator::new(), at)
            .await
            .unwrap();

        assert!(snapshot.id > 0);
        assert_eq!(snapshot.total_skill, 220.0);
        assert_eq!(snapshot.hot_skill, 170.0);
        assert_eq!(snapshot.recorded_at, at);

        // A play dated after the snapshot time is not counted
        let mut late = play("C", 99.0, 300.0, true, 0);
        late.played_at = at + Duration::days(1);
        db.skills().insert_records(alice.id, &[late]).await.unwrap();

        let again = db
            .skills()
            .take_snapshot(alice.id, InstrumentType::Guitar, &SkillAggregator::new(), at)
            .await
            .unwrap();
        assert_eq!(again.total_skill, 220.0);

        let empty = db
            .skills()
            .take_snapshot(alice.id, InstrumentType::Bass, &SkillAggregator::new(), at)
            .await
            .unwrap();
        assert_eq!(empty.total_skill, 0.0);
    }
}
