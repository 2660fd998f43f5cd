use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::analytics::AnalyticsEventRow;

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_views: i64,
    pub countries_count: i64,
    pub desktop_views: i64,
    pub mobile_views: i64,
}

#[derive(Debug, Serialize)]
pub struct TimelinePoint {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CountryStat {
    pub name: String,
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct DeviceStat {
    pub name: String,
    pub count: i64,
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsDetails {
    pub countries: Vec<CountryStat>,
    pub devices: Vec<DeviceStat>,
    pub recent: Vec<AnalyticsEventRow>,
}

const EVENT_COLUMNS: &str = "id, username, resume_kind, profile_name, version_number, \
    country, city, device, browser, referrer, user_agent, viewed_at";

pub async fn summary(pool: &PgPool, username: &str) -> Result<AnalyticsSummary, AppError> {
    let total_views: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events WHERE username = $1")
            .bind(username)
            .fetch_one(pool)
            .await?;

    let countries_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT country) FROM analytics_events WHERE username = $1",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;

    let desktop_views: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM analytics_events WHERE username = $1 AND device = 'Desktop'",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;

    let mobile_views: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM analytics_events \
         WHERE username = $1 AND device IN ('Mobile', 'Tablet')",
    )
    .bind(username)
    .fetch_one(pool)
    .await?;

    Ok(AnalyticsSummary {
        total_views,
        countries_count,
        desktop_views,
        mobile_views,
    })
}

/// Views per day over the last seven days, zero-filled.
pub async fn timeline(pool: &PgPool, username: &str) -> Result<Vec<TimelinePoint>, AppError> {
    let since = Utc::now() - Duration::days(7);
    let views: Vec<DateTime<Utc>> = sqlx::query_scalar(
        "SELECT viewed_at FROM analytics_events WHERE username = $1 AND viewed_at >= $2",
    )
    .bind(username)
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(build_timeline(Utc::now().date_naive(), &views))
}

pub fn build_timeline(today: NaiveDate, views: &[DateTime<Utc>]) -> Vec<TimelinePoint> {
    (0..7)
        .rev()
        .map(|days_ago| {
            let day = today - Duration::days(days_ago);
            let count = views.iter().filter(|v| v.date_naive() == day).count() as i64;
            TimelinePoint {
                date: day.format("%a").to_string(),
                count,
            }
        })
        .collect()
}

pub async fn details(pool: &PgPool, username: &str) -> Result<AnalyticsDetails, AppError> {
    let total_views: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events WHERE username = $1")
            .bind(username)
            .fetch_one(pool)
            .await?;

    let country_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT country, COUNT(*) FROM analytics_events WHERE username = $1 \
         GROUP BY country ORDER BY COUNT(*) DESC LIMIT 5",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    let device_counts: Vec<(String, i64)> = sqlx::query_as(
        "SELECT device, COUNT(*) FROM analytics_events WHERE username = $1 \
         GROUP BY device ORDER BY COUNT(*) DESC",
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    let recent: Vec<AnalyticsEventRow> = sqlx::query_as(&format!(
        "SELECT {EVENT_COLUMNS} FROM analytics_events WHERE username = $1 \
         ORDER BY viewed_at DESC LIMIT 10"
    ))
    .bind(username)
    .fetch_all(pool)
    .await?;

    let countries = country_counts
        .into_iter()
        .map(|(name, count)| CountryStat {
            name,
            count,
            percentage: percentage(count, total_views),
        })
        .collect();

    let devices = device_counts
        .into_iter()
        .map(|(name, count)| DeviceStat {
            name,
            count,
            percentage: percentage(count, total_views),
        })
        .collect();

    Ok(AnalyticsDetails {
        countries,
        devices,
        recent,
    })
}

pub fn percentage(count: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_percentage_of_zero_total() {
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_timeline_zero_fills_seven_days() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let timeline = build_timeline(today, &[]);
        assert_eq!(timeline.len(), 7);
        assert!(timeline.iter().all(|p| p.count == 0));
        // Oldest day first, today last.
        assert_eq!(timeline[6].date, today.format("%a").to_string());
    }

    #[test]
    fn test_timeline_counts_views_per_day() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let views = vec![
            Utc.with_ymd_and_hms(2026, 8, 28, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 28, 17, 30, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).unwrap(),
            // Outside the window; must not be counted.
            Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
        ];
        let timeline = build_timeline(today, &views);
        assert_eq!(timeline[6].count, 2);
        assert_eq!(timeline[4].count, 1);
        assert_eq!(timeline.iter().map(|p| p.count).sum::<i64>(), 3);
    }
}
