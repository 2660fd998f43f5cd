use axum::http::HeaderMap;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Normalized device classes. Anything unrecognized counts as Desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Desktop,
    Mobile,
    Tablet,
}

impl Device {
    pub const fn as_str(self) -> &'static str {
        match self {
            Device::Desktop => "Desktop",
            Device::Mobile => "Mobile",
            Device::Tablet => "Tablet",
        }
    }
}

/// Maps a raw user-agent to a device class, applied once at write time.
pub fn normalize_device(user_agent: Option<&str>) -> Device {
    let Some(ua) = user_agent else {
        return Device::Desktop;
    };
    if ua.contains("iPad") || ua.contains("Tablet") {
        Device::Tablet
    } else if ua.contains("Mobi") || ua.contains("iPhone") || ua.contains("Android") {
        Device::Mobile
    } else {
        Device::Desktop
    }
}

/// Coarse browser family from the user-agent. Order matters: Edge and Opera
/// carry "Chrome", Chrome carries "Safari".
pub fn browser_name(user_agent: Option<&str>) -> &'static str {
    let Some(ua) = user_agent else {
        return "Unknown";
    };
    if ua.contains("Edg") {
        "Edge"
    } else if ua.contains("OPR") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox") {
        "Firefox"
    } else if ua.contains("Chrome") {
        "Chrome"
    } else if ua.contains("Safari") {
        "Safari"
    } else {
        "Unknown"
    }
}

/// Which ledger kind a public view hit.
#[derive(Debug, Clone, Copy)]
pub enum ResumeKind {
    Master,
    Locked,
}

impl ResumeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResumeKind::Master => "master",
            ResumeKind::Locked => "locked",
        }
    }
}

/// Opaque request metadata attached to a view. Geo fields come from edge
/// headers when present; no IP lookup happens here.
#[derive(Debug, Clone)]
pub struct ViewMeta {
    pub country: String,
    pub city: String,
    pub device: Device,
    pub browser: &'static str,
    pub referrer: String,
    pub user_agent: Option<String>,
}

impl ViewMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let country = header("x-vercel-ip-country")
            .or_else(|| header("cf-ipcountry"))
            .or_else(|| header("cloudfront-viewer-country"))
            .unwrap_or_else(|| "Unknown".to_string());
        let city = header("x-vercel-ip-city")
            .or_else(|| header("cf-ipcity"))
            .unwrap_or_else(|| "Unknown".to_string());
        let user_agent = header("user-agent");
        let referrer = header("referer").unwrap_or_else(|| "Direct".to_string());

        ViewMeta {
            country,
            city,
            device: normalize_device(user_agent.as_deref()),
            browser: browser_name(user_agent.as_deref()),
            referrer,
            user_agent,
        }
    }
}

/// One resolved public view, ready to persist.
#[derive(Debug, Clone)]
pub struct ViewEvent {
    pub username: String,
    pub kind: ResumeKind,
    pub profile_name: Option<String>,
    pub version_number: Option<i32>,
    pub meta: ViewMeta,
}

pub async fn record_view(pool: &PgPool, event: ViewEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO analytics_events \
            (id, username, resume_kind, profile_name, version_number, \
             country, city, device, browser, referrer, user_agent) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(Uuid::new_v4())
    .bind(&event.username)
    .bind(event.kind.as_str())
    .bind(&event.profile_name)
    .bind(event.version_number)
    .bind(&event.meta.country)
    .bind(&event.meta.city)
    .bind(event.meta.device.as_str())
    .bind(event.meta.browser)
    .bind(&event.meta.referrer)
    .bind(&event.meta.user_agent)
    .execute(pool)
    .await?;
    Ok(())
}

/// Best-effort write. Failures are logged and dropped; the view itself has
/// already been served.
pub fn spawn_record(pool: PgPool, event: ViewEvent) {
    tokio::spawn(async move {
        if let Err(e) = record_view(&pool, event).await {
            warn!("Failed to record view event: {e}");
        }
    });
}
